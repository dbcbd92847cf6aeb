//! CharacterModel - Base attributes of a playable character

use crate::source::StatSource;
use crate::stat_block::StatAccumulator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A character archetype from the content catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterModel {
    pub id: String,
    pub name: String,
    /// Derived stats (max_hp, base_atk, crit_rate, ...)
    #[serde(default)]
    pub base_stats: BTreeMap<String, f64>,
    /// Primary attributes (str, agi, int, ...); applied after base_stats
    #[serde(default)]
    pub attributes: BTreeMap<String, f64>,
}

impl CharacterModel {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        CharacterModel {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set a base stat
    pub fn with_stat(mut self, stat: &str, value: f64) -> Self {
        self.base_stats.insert(stat.to_string(), value);
        self
    }

    /// Set a primary attribute
    pub fn with_attribute(mut self, attribute: &str, value: f64) -> Self {
        self.attributes.insert(attribute.to_string(), value);
        self
    }
}

impl StatSource for CharacterModel {
    fn id(&self) -> &str {
        &self.id
    }

    fn priority(&self) -> i32 {
        -100
    }

    fn apply(&self, stats: &mut StatAccumulator) {
        for (stat, value) in self.base_stats.iter().chain(self.attributes.iter()) {
            stats.set_base(stat, *value);
        }
    }
}
