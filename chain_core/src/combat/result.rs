//! FightResult - Outcome of a timed fight

use super::FightConfig;
use crate::chain::NodeLog;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Win,
    Lose,
    Timeout,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Win => "WIN",
            Outcome::Lose => "LOSE",
            Outcome::Timeout => "TIMEOUT",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    EnemyDead,
    HeroDead,
    /// Max time reached with both sides standing
    DamageInsufficient,
}

impl TerminationReason {
    pub fn outcome(&self) -> Outcome {
        match self {
            TerminationReason::EnemyDead => Outcome::Win,
            TerminationReason::HeroDead => Outcome::Lose,
            TerminationReason::DamageInsufficient => Outcome::Timeout,
        }
    }
}

/// State at the end of one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSample {
    pub time: f64,
    pub hero_health: f64,
    pub enemy_health: f64,
    /// Whether this tick carried an enemy burst
    pub burst: bool,
    pub dps: f64,
    pub heal_per_second: f64,
    /// Incoming damage multiplier after mitigation and clamping
    pub damage_taken_mult: f64,
}

/// Aggregates over the whole fight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FightSummary {
    pub hero_max_health: f64,
    pub hero_health_left: f64,
    pub enemy_health_left: f64,
    /// Damage dealt / elapsed time
    pub average_dps: f64,
    pub total_damage: f64,
    pub total_healing: f64,
    pub total_incoming: f64,
    pub bursts: u32,
}

/// Complete record of one fight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FightResult {
    pub outcome: Outcome,
    pub elapsed_time: f64,
    pub reason: TerminationReason,
    pub samples: Vec<TickSample>,
    /// Node log of the last tick's chain evaluation
    pub node_log: Vec<NodeLog>,
    pub config: FightConfig,
    pub summary: FightSummary,
    /// Hex SHA-256 of every other field
    pub fingerprint: String,
}

impl FightResult {
    pub fn is_win(&self) -> bool {
        self.outcome == Outcome::Win
    }

    pub fn final_sample(&self) -> Option<&TickSample> {
        self.samples.last()
    }
}
