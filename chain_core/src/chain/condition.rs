//! Trigger conditions - how a parent's firing rate becomes a child's proc rate

use serde::{Deserialize, Serialize};
use std::fmt;

/// Condition on a trigger edge, parsed from its content tag
///
/// Unrecognized tags are kept verbatim and never proc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TriggerCondition {
    /// `on_hit`
    OnHit,
    /// `on_crit`
    OnCrit,
    /// `fixed_chance_<pct>` or `chance_<pct>`, stored as percent
    FixedChance(f64),
    /// `hp_lt_<pct>`: hero health fraction strictly below the threshold
    HealthBelow(f64),
    /// `hp_gt_<pct>`: hero health fraction strictly above the threshold
    HealthAbove(f64),
    Unknown(String),
}

impl TriggerCondition {
    /// Parse a content tag. Never fails; see [`TriggerCondition::Unknown`]
    pub fn parse(tag: &str) -> Self {
        match tag {
            "on_hit" => return TriggerCondition::OnHit,
            "on_crit" => return TriggerCondition::OnCrit,
            _ => {}
        }

        let parsed = if let Some(pct) = tag
            .strip_prefix("fixed_chance_")
            .or_else(|| tag.strip_prefix("chance_"))
        {
            parse_percent(pct).map(TriggerCondition::FixedChance)
        } else if let Some(pct) = tag.strip_prefix("hp_lt_") {
            parse_percent(pct).map(TriggerCondition::HealthBelow)
        } else if let Some(pct) = tag.strip_prefix("hp_gt_") {
            parse_percent(pct).map(TriggerCondition::HealthAbove)
        } else {
            None
        };

        parsed.unwrap_or_else(|| TriggerCondition::Unknown(tag.to_string()))
    }

    /// Canonical tag for this condition
    pub fn tag(&self) -> String {
        match self {
            TriggerCondition::OnHit => "on_hit".to_string(),
            TriggerCondition::OnCrit => "on_crit".to_string(),
            TriggerCondition::FixedChance(pct) => format!("fixed_chance_{}", pct),
            TriggerCondition::HealthBelow(pct) => format!("hp_lt_{}", pct),
            TriggerCondition::HealthAbove(pct) => format!("hp_gt_{}", pct),
            TriggerCondition::Unknown(tag) => tag.clone(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TriggerCondition::Unknown(_))
    }

    /// Expected activations per second of the child
    ///
    /// - on_hit: parent rate
    /// - on_crit: parent rate × parent crit rate
    /// - fixed chance: parent rate × fraction
    /// - health threshold: parent rate when satisfied, else 0
    /// - unknown: 0
    pub fn proc_rate(&self, parent_rate: f64, parent_crit_rate: f64, health_fraction: f64) -> f64 {
        if !(parent_rate.is_finite() && parent_rate > 0.0) {
            return 0.0;
        }

        match self {
            TriggerCondition::OnHit => parent_rate,
            TriggerCondition::OnCrit => {
                let crit = if parent_crit_rate.is_finite() {
                    parent_crit_rate.clamp(0.0, 1.0)
                } else {
                    0.0
                };
                parent_rate * crit
            }
            TriggerCondition::FixedChance(pct) => parent_rate * pct / 100.0,
            TriggerCondition::HealthBelow(pct) => {
                if health_fraction < pct / 100.0 {
                    parent_rate
                } else {
                    0.0
                }
            }
            TriggerCondition::HealthAbove(pct) => {
                if health_fraction > pct / 100.0 {
                    parent_rate
                } else {
                    0.0
                }
            }
            TriggerCondition::Unknown(_) => 0.0,
        }
    }
}

/// Percent in [0, 100]
fn parse_percent(raw: &str) -> Option<f64> {
    let value: f64 = raw.parse().ok()?;
    (value.is_finite() && (0.0..=100.0).contains(&value)).then_some(value)
}

impl From<String> for TriggerCondition {
    fn from(tag: String) -> Self {
        TriggerCondition::parse(&tag)
    }
}

impl From<&str> for TriggerCondition {
    fn from(tag: &str) -> Self {
        TriggerCondition::parse(tag)
    }
}

impl From<TriggerCondition> for String {
    fn from(condition: TriggerCondition) -> Self {
        condition.tag()
    }
}

impl fmt::Display for TriggerCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
