//! Damage type conversion - moving damage between types before scaling

use crate::stat_block::StatTable;
use crate::types::DamageType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const STAT_PREFIX: &str = "convert_";

/// Move `fraction` of `from` damage to `to` (0.5 = half)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageConversion {
    pub from: DamageType,
    pub to: DamageType,
    pub fraction: f64,
}

impl DamageConversion {
    pub fn new(from: DamageType, to: DamageType, fraction: f64) -> Self {
        DamageConversion { from, to, fraction }
    }

    /// Parse a `convert_<from>_to_<to>` stat key
    pub fn from_stat(stat: &str, fraction: f64) -> Option<Self> {
        let rest = stat.strip_prefix(STAT_PREFIX)?;
        let (from, to) = rest.split_once("_to_")?;
        Some(DamageConversion {
            from: from.parse().ok()?,
            to: to.parse().ok()?,
            fraction,
        })
    }
}

/// All conversions granted by stats (`convert_physical_to_fire = 0.5`)
pub fn conversions_from_stats(stats: &StatTable) -> Vec<DamageConversion> {
    stats
        .iter()
        .filter(|(stat, _)| stat.starts_with(STAT_PREFIX))
        .filter_map(|(stat, value)| DamageConversion::from_stat(stat, value))
        .collect()
}

/// Apply conversions to per-type amounts
///
/// Sources are processed in conversion order (physical → lightning → cold →
/// fire → chaos), so damage converted into a later type can convert again.
/// When one source's fractions sum past 1.0 they are scaled down to convert
/// exactly all of it. Converted damage belongs to its destination type.
pub fn apply_conversions(
    damages: &BTreeMap<DamageType, f64>,
    conversions: &[DamageConversion],
) -> BTreeMap<DamageType, f64> {
    let mut result = damages.clone();
    if conversions.is_empty() {
        return result;
    }

    for source in DamageType::all() {
        let amount = result.get(source).copied().unwrap_or(0.0);
        if amount <= 0.0 {
            continue;
        }

        let outgoing: Vec<&DamageConversion> = conversions
            .iter()
            .filter(|c| c.from == *source && c.to != *source && c.fraction > 0.0)
            .collect();
        let total: f64 = outgoing.iter().map(|c| c.fraction).sum();
        if total <= 0.0 {
            continue;
        }
        let scale = if total > 1.0 { 1.0 / total } else { 1.0 };

        for conversion in outgoing {
            let moved = amount * conversion.fraction * scale;
            *result.entry(*source).or_insert(0.0) -= moved;
            *result.entry(conversion.to).or_insert(0.0) += moved;
        }
    }

    result.retain(|_, v| *v > 0.0);
    result
}
