//! StatAccumulator - Collects stat deltas before freezing them into a StatTable

use super::{is_multiplicative, neutral_value, StatTable};
use std::collections::BTreeMap;

/// Accumulates stat contributions from sources in application order
///
/// Sources write into the accumulator; [`StatAccumulator::finish`] freezes
/// the result. A resolved [`StatTable`] is never written to again.
#[derive(Debug, Clone, Default)]
pub struct StatAccumulator {
    values: BTreeMap<String, f64>,
}

impl StatAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-resolved table
    pub fn from_table(table: &StatTable) -> Self {
        StatAccumulator {
            values: table
                .iter()
                .map(|(stat, value)| (stat.to_string(), value))
                .collect(),
        }
    }

    /// Current value of a stat, or its neutral value when unset
    pub fn get(&self, stat: &str) -> f64 {
        self.values
            .get(stat)
            .copied()
            .unwrap_or_else(|| neutral_value(stat))
    }

    /// Overwrite a stat (base attributes and rule defaults)
    pub fn set_base(&mut self, stat: &str, value: f64) {
        self.values.insert(stat.to_string(), value);
    }

    /// Add to a stat regardless of its suffix (talent and dynamic deltas)
    pub fn add_flat(&mut self, stat: &str, value: f64) {
        let current = self.get(stat);
        self.values.insert(stat.to_string(), current + value);
    }

    /// Merge a modifier delta: multiplicative stats multiply, the rest add
    pub fn apply_delta(&mut self, stat: &str, value: f64) {
        let current = self.get(stat);
        let merged = if is_multiplicative(stat) {
            current * value
        } else {
            current + value
        };
        self.values.insert(stat.to_string(), merged);
    }

    /// Read-only copy of the current state
    pub fn snapshot(&self) -> StatTable {
        StatTable::from_map(self.values.clone())
    }

    /// Freeze into a table
    pub fn finish(self) -> StatTable {
        StatTable::from_map(self.values)
    }
}
