//! Skill - Damage and effect configuration for one skill

use super::DamageConversion;
use crate::types::DamageType;
use serde::{Deserialize, Serialize};

/// Describes how a skill deals damage and what side effects it carries
/// Loaded from TOML content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Skill {
    /// Unique skill identifier
    pub id: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,

    /// Tags matched against `inc_tag_<tag>` stats
    #[serde(default)]
    pub tags: Vec<String>,

    /// Only the first component feeds the damage pipeline
    #[serde(default)]
    pub damage_components: Vec<DamageComponent>,

    /// Skill-intrinsic damage conversions, applied before scaling
    #[serde(default)]
    pub conversions: Vec<DamageConversion>,

    #[serde(default)]
    pub effects: Option<SkillEffects>,
}

impl Skill {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Skill {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_component(mut self, component: DamageComponent) -> Self {
        self.damage_components.push(component);
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    pub fn with_conversion(mut self, conversion: DamageConversion) -> Self {
        self.conversions.push(conversion);
        self
    }

    pub fn with_effects(mut self, effects: SkillEffects) -> Self {
        self.effects = Some(effects);
        self
    }
}

/// One damage line of a skill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageComponent {
    #[serde(rename = "type")]
    pub damage_type: DamageType,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
    /// Stat added to the base hit, times `scaling_coef`
    #[serde(default = "default_scaling_source")]
    pub scaling_source: String,
    #[serde(default = "default_scaling_coef")]
    pub scaling_coef: f64,
}

fn default_scaling_source() -> String {
    "base_atk".to_string()
}

fn default_scaling_coef() -> f64 {
    1.0
}

impl DamageComponent {
    /// Component that scales with `base_atk` at 100%
    pub fn new(damage_type: DamageType, min: f64, max: f64) -> Self {
        DamageComponent {
            damage_type,
            min,
            max,
            scaling_source: default_scaling_source(),
            scaling_coef: default_scaling_coef(),
        }
    }

    pub fn scaling(mut self, source: &str, coef: f64) -> Self {
        self.scaling_source = source.to_string();
        self.scaling_coef = coef;
        self
    }

    /// Average of the min/max range
    pub fn average(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Survival side effects of a skill, modeled as expected rates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillEffects {
    /// Heal per activation as a fraction of hero max health
    #[serde(default)]
    pub heal_percent_max_hp: f64,
    /// Damage-taken multiplier while active (< 1.0 mitigates)
    #[serde(default)]
    pub damage_taken_mult: Option<f64>,
    /// Seconds the damage-taken multiplier stays active
    #[serde(default)]
    pub duration: Option<f64>,
    /// Internal cooldown in seconds
    #[serde(default)]
    pub icd: Option<f64>,
}

impl SkillEffects {
    pub fn heal(fraction: f64) -> Self {
        SkillEffects {
            heal_percent_max_hp: fraction,
            ..Default::default()
        }
    }

    pub fn mitigation(multiplier: f64, duration: f64) -> Self {
        SkillEffects {
            damage_taken_mult: Some(multiplier),
            duration: Some(duration),
            ..Default::default()
        }
    }

    pub fn with_icd(mut self, seconds: f64) -> Self {
        self.icd = Some(seconds);
        self
    }

    /// Activation rate after the internal cooldown cap
    pub fn capped_rate(&self, rate: f64) -> f64 {
        match self.icd {
            Some(icd) if icd > 0.0 && icd.is_finite() => rate.min(1.0 / icd),
            _ => rate,
        }
    }
}
