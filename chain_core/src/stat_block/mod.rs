//! Stat model - resolved stat tables built from base attributes and modifiers

mod aggregator;
mod dynamic;

pub use aggregator::StatAccumulator;
pub use dynamic::{DynamicContext, DynamicStat, DynamicStatError};

use crate::config::{AttributeConversion, Rules};
use crate::source::{CharacterModel, Modifier, StatSource, Talent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Stats whose name ends with this suffix combine by multiplication
pub const MULTIPLICATIVE_SUFFIX: &str = "_mult";

/// Whether a stat combines multiplicatively
pub fn is_multiplicative(stat: &str) -> bool {
    stat.ends_with(MULTIPLICATIVE_SUFFIX)
}

/// Value of an absent stat: "no effect" in its merge context
pub fn neutral_value(stat: &str) -> f64 {
    if is_multiplicative(stat) {
        1.0
    } else {
        0.0
    }
}

/// Resolved stat name → value mapping
///
/// Lookups never fail: an absent stat reads as 0.0, or 1.0 for
/// multiplicative stats. Ordered so that serialized tables are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatTable {
    values: BTreeMap<String, f64>,
}

impl StatTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_map(values: BTreeMap<String, f64>) -> Self {
        StatTable { values }
    }

    /// Value of a stat, neutral when absent
    pub fn get(&self, stat: &str) -> f64 {
        self.values
            .get(stat)
            .copied()
            .unwrap_or_else(|| neutral_value(stat))
    }

    /// Value of a stat, `default` when absent
    pub fn get_or(&self, stat: &str, default: f64) -> f64 {
        self.values.get(stat).copied().unwrap_or(default)
    }

    pub fn contains(&self, stat: &str) -> bool {
        self.values.contains_key(stat)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate stats in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, f64)> for StatTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        StatTable {
            values: iter.into_iter().collect(),
        }
    }
}

/// Resolve a stat table from raw parts
///
/// Merge order: base attributes, talent deltas (strictly additive), then
/// modifier deltas (suffix rule) and their dynamic stats at full health.
pub fn resolve(
    base_attributes: &StatTable,
    talent_deltas: &StatTable,
    modifiers: &[Modifier],
) -> StatTable {
    let mut acc = StatAccumulator::from_table(base_attributes);
    for (stat, value) in talent_deltas.iter() {
        acc.add_flat(stat, value);
    }
    StatModel::from_base(acc.finish(), Vec::new()).resolve(modifiers, 1.0)
}

/// Immutable hero stats that per-node tables are resolved from
///
/// Holds rule defaults, the character model and the talent. Node-scoped
/// modifiers are layered on top by [`StatModel::resolve`], which always
/// returns a fresh table.
#[derive(Debug, Clone)]
pub struct StatModel {
    base: StatTable,
    conversions: Vec<AttributeConversion>,
    hero_max_health: f64,
}

impl StatModel {
    /// Build the hero from catalog content
    pub fn new(rules: &Rules, model: &CharacterModel, talent: Option<&Talent>) -> Self {
        let mut sources: Vec<&dyn StatSource> = vec![rules as &dyn StatSource, model];
        if let Some(talent) = talent {
            sources.push(talent);
        }
        Self::from_sources(&sources, rules.attribute_conversions.clone())
    }

    /// Build from arbitrary sources, applied in priority order
    pub fn from_sources(
        sources: &[&dyn StatSource],
        conversions: Vec<AttributeConversion>,
    ) -> Self {
        let mut sorted: Vec<&dyn StatSource> = sources.to_vec();
        sorted.sort_by_key(|s| s.priority());

        let mut acc = StatAccumulator::new();
        for source in sorted {
            source.apply(&mut acc);
        }
        Self::from_base(acc.finish(), conversions)
    }

    /// Build from an already-merged base table
    pub fn from_base(base: StatTable, conversions: Vec<AttributeConversion>) -> Self {
        let mut model = StatModel {
            base,
            conversions,
            hero_max_health: 0.0,
        };
        model.hero_max_health = model.static_stats(&[]).get("max_hp");
        model
    }

    /// Base table before node modifiers and attribute conversions
    pub fn base(&self) -> &StatTable {
        &self.base
    }

    /// Hero max health: base stats plus attribute conversions
    pub fn hero_max_health(&self) -> f64 {
        self.hero_max_health
    }

    /// Resolve the table a node evaluates with
    pub fn resolve(&self, modifiers: &[Modifier], health_fraction: f64) -> StatTable {
        let mut acc = self.static_stats(modifiers);

        // Every dynamic stat reads the same snapshot, so their order is irrelevant
        let snapshot = acc.snapshot();
        let ctx = DynamicContext {
            stats: &snapshot,
            hero_max_health: self.hero_max_health,
            health_fraction,
        };

        for modifier in modifiers {
            for dynamic in &modifier.dynamic {
                match dynamic.evaluate(&ctx) {
                    Ok(delta) => acc.add_flat(dynamic.target(), delta),
                    Err(err) => warn!(
                        modifier = %modifier.id,
                        stat = dynamic.target(),
                        error = %err,
                        "dynamic stat skipped"
                    ),
                }
            }
        }

        acc.finish()
    }

    fn static_stats(&self, modifiers: &[Modifier]) -> StatAccumulator {
        let mut acc = StatAccumulator::from_table(&self.base);
        for modifier in modifiers {
            modifier.apply(&mut acc);
        }

        let deltas: Vec<(&str, f64)> = self
            .conversions
            .iter()
            .map(|c| (c.to.as_str(), acc.get(&c.from) * c.per_point))
            .collect();
        for (stat, delta) in deltas {
            acc.add_flat(stat, delta);
        }

        acc
    }
}
