//! Modifier - Node-scoped stat deltas

use crate::source::StatSource;
use crate::stat_block::{DynamicStat, StatAccumulator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A stat package attached to one skill node
///
/// Static `stats` merge by the suffix rule. `dynamic` formulas are
/// evaluated by the StatModel after static deltas and attribute conversions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Modifier {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub stats: BTreeMap<String, f64>,
    #[serde(default)]
    pub dynamic: Vec<DynamicStat>,
}

impl Modifier {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Modifier {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a static stat delta
    pub fn with_stat(mut self, stat: &str, value: f64) -> Self {
        self.stats.insert(stat.to_string(), value);
        self
    }

    /// Add a formula-bound stat
    pub fn with_dynamic(mut self, dynamic: DynamicStat) -> Self {
        self.dynamic.push(dynamic);
        self
    }
}

impl StatSource for Modifier {
    fn id(&self) -> &str {
        &self.id
    }

    fn priority(&self) -> i32 {
        200
    }

    fn apply(&self, stats: &mut StatAccumulator) {
        for (stat, value) in &self.stats {
            stats.apply_delta(stat, *value);
        }
    }
}
