//! Talent - Build-wide stat deltas chosen alongside the character model

use crate::source::StatSource;
use crate::stat_block::StatAccumulator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A talent's deltas always add, even on multiplicative stats
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Talent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub dynamic_stats: BTreeMap<String, f64>,
}

impl Talent {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Talent {
            id: id.into(),
            name: name.into(),
            dynamic_stats: BTreeMap::new(),
        }
    }

    pub fn with_stat(mut self, stat: &str, value: f64) -> Self {
        self.dynamic_stats.insert(stat.to_string(), value);
        self
    }
}

impl StatSource for Talent {
    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&self, stats: &mut StatAccumulator) {
        for (stat, value) in &self.dynamic_stats {
            stats.add_flat(stat, *value);
        }
    }
}
