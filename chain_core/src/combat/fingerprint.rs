//! Result fingerprint - content hash of a fight record

use super::{FightConfig, FightResult, FightSummary, Outcome, TerminationReason, TickSample};
use crate::chain::NodeLog;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Every field of a [`FightResult`] except the fingerprint itself
#[derive(Serialize)]
struct Fingerprinted<'a> {
    outcome: Outcome,
    elapsed_time: f64,
    reason: TerminationReason,
    samples: &'a [TickSample],
    node_log: &'a [NodeLog],
    config: &'a FightConfig,
    summary: &'a FightSummary,
}

/// Hex SHA-256 over the JSON encoding of the record
///
/// Field order is fixed by the struct and every map in the record is a
/// BTreeMap, so identical fights hash identically.
pub fn fingerprint(result: &FightResult) -> String {
    let view = Fingerprinted {
        outcome: result.outcome,
        elapsed_time: result.elapsed_time,
        reason: result.reason,
        samples: &result.samples,
        node_log: &result.node_log,
        config: &result.config,
        summary: &result.summary,
    };

    // Map keys are all strings and non-finite floats encode as null, so
    // this view always serializes
    let bytes = serde_json::to_vec(&view).unwrap_or_default();
    hex::encode(Sha256::digest(&bytes))
}

/// Recompute and compare against the stored fingerprint
pub fn verify(result: &FightResult) -> bool {
    fingerprint(result) == result.fingerprint
}
