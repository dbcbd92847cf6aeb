//! A/B comparison - two scenarios fought side by side

use super::{FightResult, Outcome};
use crate::config::{BuildError, ContentCatalog, Scenario};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildComparison {
    pub a: FightResult,
    pub b: FightResult,
    /// `b.average_dps − a.average_dps`
    pub dps_delta: f64,
    /// Better side, `None` on a tie
    pub preferred: Option<Side>,
}

/// Fight both scenarios against the same catalog, in parallel
///
/// The catalog is only read; each side owns its stats and fight state.
pub fn compare_builds(
    catalog: &ContentCatalog,
    a: &Scenario,
    b: &Scenario,
) -> Result<BuildComparison, BuildError> {
    let (a, b) = rayon::join(|| a.run(catalog), || b.run(catalog));
    let (a, b) = (a?, b?);

    let dps_delta = b.summary.average_dps - a.summary.average_dps;
    let preferred = match rank(&a).partial_cmp(&rank(&b)) {
        Some(Ordering::Greater) => Some(Side::A),
        Some(Ordering::Less) => Some(Side::B),
        _ => None,
    };

    Ok(BuildComparison {
        a,
        b,
        dps_delta,
        preferred,
    })
}

/// Higher is better: outcome first, then how well the fight went
fn rank(result: &FightResult) -> (u8, f64) {
    match result.outcome {
        // Faster kill is better
        Outcome::Win => (2, -result.elapsed_time),
        Outcome::Timeout => (1, result.summary.average_dps),
        // Surviving longer is better
        Outcome::Lose => (0, result.elapsed_time),
    }
}
