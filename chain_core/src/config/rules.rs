//! Rules table - global defaults and attribute conversions

use crate::chain::ChainLimits;
use crate::combat::EnemyProfile;
use crate::source::StatSource;
use crate::stat_block::StatAccumulator;
use serde::{Deserialize, Serialize};

/// Tunable rules shared by every build in a catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rules {
    /// Attribute → derived stat conversions (e.g. str → max_hp)
    #[serde(default = "default_attribute_conversions")]
    pub attribute_conversions: Vec<AttributeConversion>,
    /// Attacks per second when a model sets no `atk_spd`
    #[serde(default = "default_attack_rate")]
    pub default_attack_rate: f64,
    #[serde(default = "default_base_crit_rate")]
    pub base_crit_rate: f64,
    #[serde(default = "default_base_crit_damage")]
    pub base_crit_damage: f64,
    /// Hero max health when a model sets no `max_hp`
    #[serde(default = "default_max_health")]
    pub default_max_health: f64,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default)]
    pub max_triggers: Option<usize>,
    #[serde(default)]
    pub enemy_presets: Vec<EnemyPreset>,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            attribute_conversions: default_attribute_conversions(),
            default_attack_rate: default_attack_rate(),
            base_crit_rate: default_base_crit_rate(),
            base_crit_damage: default_base_crit_damage(),
            default_max_health: default_max_health(),
            max_depth: default_max_depth(),
            max_triggers: None,
            enemy_presets: Vec::new(),
        }
    }
}

fn default_attribute_conversions() -> Vec<AttributeConversion> {
    vec![AttributeConversion::new("str", "max_hp", 5.0)]
}
fn default_attack_rate() -> f64 {
    1.0
}
fn default_base_crit_rate() -> f64 {
    0.05
}
fn default_base_crit_damage() -> f64 {
    1.5
}
fn default_max_health() -> f64 {
    500.0
}
fn default_max_depth() -> usize {
    3
}

impl Rules {
    /// Trigger recursion limits for builds under these rules
    pub fn limits(&self) -> ChainLimits {
        ChainLimits {
            max_depth: self.max_depth,
            max_triggers: self.max_triggers,
        }
    }

    pub fn enemy_preset(&self, id: &str) -> Option<&EnemyPreset> {
        self.enemy_presets.iter().find(|p| p.id == id)
    }
}

/// Rules are the lowest layer: every stat they seed is overwritten by the model
impl StatSource for Rules {
    fn id(&self) -> &str {
        "rules"
    }

    fn priority(&self) -> i32 {
        -200
    }

    fn apply(&self, stats: &mut StatAccumulator) {
        stats.set_base("atk_spd", self.default_attack_rate);
        stats.set_base("crit_rate", self.base_crit_rate);
        stats.set_base("crit_dmg", self.base_crit_damage);
        stats.set_base("max_hp", self.default_max_health);
    }
}

/// `to += from × per_point`, applied after node modifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeConversion {
    pub from: String,
    pub to: String,
    pub per_point: f64,
}

impl AttributeConversion {
    pub fn new(from: &str, to: &str, per_point: f64) -> Self {
        AttributeConversion {
            from: from.to_string(),
            to: to.to_string(),
            per_point,
        }
    }
}

/// A named enemy with its fight length
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyPreset {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub enemy: EnemyProfile,
    #[serde(default)]
    pub max_time: Option<f64>,
}
