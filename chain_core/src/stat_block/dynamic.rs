//! Formula-bound stats evaluated against a read-only snapshot

use super::StatTable;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stat derived from other figures at resolution time
///
/// The set is closed: content picks a variant, it never supplies an expression.
/// The computed amount is always added to `stat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DynamicStat {
    /// `stat += stats[source] × ratio` (e.g. strength → max_hp)
    Proportional {
        stat: String,
        source: String,
        ratio: f64,
    },
    /// `stat += (1 − health fraction) × ratio`
    MissingHealth { stat: String, ratio: f64 },
    /// `stat += health fraction × ratio`
    HealthFraction { stat: String, ratio: f64 },
    /// `stat += hero max health × ratio`
    MaxHealth { stat: String, ratio: f64 },
}

/// What a dynamic stat is allowed to read
#[derive(Debug, Clone, Copy)]
pub struct DynamicContext<'a> {
    pub stats: &'a StatTable,
    pub hero_max_health: f64,
    pub health_fraction: f64,
}

/// Why a dynamic stat produced no delta
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DynamicStatError {
    #[error("dynamic stat has an empty target name")]
    EmptyTarget,
    #[error("dynamic stat '{0}' reads itself")]
    SelfReference(String),
    #[error("dynamic stat '{stat}' evaluated to non-finite value {value}")]
    NonFinite { stat: String, value: f64 },
}

impl DynamicStat {
    /// Stat this formula writes to
    pub fn target(&self) -> &str {
        match self {
            DynamicStat::Proportional { stat, .. }
            | DynamicStat::MissingHealth { stat, .. }
            | DynamicStat::HealthFraction { stat, .. }
            | DynamicStat::MaxHealth { stat, .. } => stat,
        }
    }

    /// Compute the delta for `target()`
    pub fn evaluate(&self, ctx: &DynamicContext<'_>) -> Result<f64, DynamicStatError> {
        let stat = self.target();
        if stat.is_empty() {
            return Err(DynamicStatError::EmptyTarget);
        }

        let value = match self {
            DynamicStat::Proportional { source, ratio, .. } => {
                if source == stat {
                    return Err(DynamicStatError::SelfReference(stat.to_string()));
                }
                ctx.stats.get(source) * ratio
            }
            DynamicStat::MissingHealth { ratio, .. } => {
                (1.0 - ctx.health_fraction.clamp(0.0, 1.0)) * ratio
            }
            DynamicStat::HealthFraction { ratio, .. } => {
                ctx.health_fraction.clamp(0.0, 1.0) * ratio
            }
            DynamicStat::MaxHealth { ratio, .. } => ctx.hero_max_health * ratio,
        };

        if !value.is_finite() {
            return Err(DynamicStatError::NonFinite {
                stat: stat.to_string(),
                value,
            });
        }
        Ok(value)
    }
}
