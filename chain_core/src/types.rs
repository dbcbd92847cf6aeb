//! Core types shared across the evaluator

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Damage type carried by a skill's damage component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    Physical,
    Fire,
    Cold,
    Lightning,
    Chaos,
}

impl DamageType {
    /// Get all damage types, in conversion order
    pub fn all() -> &'static [DamageType] {
        &[
            DamageType::Physical,
            DamageType::Lightning,
            DamageType::Cold,
            DamageType::Fire,
            DamageType::Chaos,
        ]
    }

    /// Stat-key spelling of this type (`flat_fire`, `inc_fire`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            DamageType::Physical => "physical",
            DamageType::Fire => "fire",
            DamageType::Cold => "cold",
            DamageType::Lightning => "lightning",
            DamageType::Chaos => "chaos",
        }
    }

    /// Fire, cold and lightning also scale with elemental bonuses
    pub fn is_elemental(&self) -> bool {
        matches!(
            self,
            DamageType::Fire | DamageType::Cold | DamageType::Lightning
        )
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DamageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "physical" => Ok(DamageType::Physical),
            "fire" => Ok(DamageType::Fire),
            "cold" => Ok(DamageType::Cold),
            "lightning" => Ok(DamageType::Lightning),
            "chaos" => Ok(DamageType::Chaos),
            other => Err(format!("unknown damage type '{}'", other)),
        }
    }
}

/// Index of a node inside a [`crate::chain::SkillTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
