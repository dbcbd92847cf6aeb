//! Damage calculation - turning a skill + resolved stats into expected damage

use super::conversion::{apply_conversions, conversions_from_stats};
use super::Skill;
use crate::stat_block::StatTable;
use crate::types::DamageType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attack rate used when the resolved rate is zero, negative or not a number
pub const FALLBACK_ATTACK_RATE: f64 = 1.0;

/// Expected output of one skill at its native attack rate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillEvaluation {
    /// Expected damage per hit, crits included
    pub average_hit: f64,
    /// `average_hit × attack_rate`
    pub dps: f64,
    /// Crit rate after clamping to [0, 1]
    pub crit_rate: f64,
    /// Hits per second
    pub attack_rate: f64,
    /// Type of the first damage component; `None` for idle skills
    pub damage_type: Option<DamageType>,
    /// Non-crit hit per damage type after conversion and scaling
    pub hit_by_type: BTreeMap<DamageType, f64>,
}

/// Evaluate a single skill, no trigger recursion
///
/// 1. base = component average + scaling stat × coef + `flat_<type>`
/// 2. conversions (skill list + `convert_<from>_to_<to>` stats)
/// 3. per type: × (1 + inc_all + inc_<type> [+ inc_elemental] + Σ inc_tag_<tag>)
/// 4. per type: × (1 + more_damage) × (1 + more_<type>) [× (1 + more_elemental)]
/// 5. crit expectation: hit × (1 + crit_rate × (crit_dmg − 1))
/// 6. dps = average_hit × atk_spd
pub fn evaluate(skill: &Skill, stats: &StatTable) -> SkillEvaluation {
    let attack_rate = attack_rate(stats);
    let crit_rate = crit_rate(stats);

    let Some(component) = skill.damage_components.first() else {
        return SkillEvaluation {
            attack_rate,
            crit_rate,
            ..Default::default()
        };
    };

    // Step 1: base hit of the primary type
    let base = component.average()
        + stats.get(&component.scaling_source) * component.scaling_coef
        + stats.get(&format!("flat_{}", component.damage_type));

    // Step 2: conversion, before any percentage bonus
    let mut conversions = skill.conversions.clone();
    conversions.extend(conversions_from_stats(stats));
    let mut base_damages = BTreeMap::new();
    base_damages.insert(component.damage_type, base);
    let converted = apply_conversions(&base_damages, &conversions);

    // Steps 3 + 4: each type scales with its own buckets
    let tag_increased: f64 = skill
        .tags
        .iter()
        .map(|tag| stats.get(&format!("inc_tag_{}", tag)))
        .sum();

    let mut hit_by_type = BTreeMap::new();
    for (damage_type, amount) in converted {
        let increased = increased_multiplier(stats, damage_type) + tag_increased;
        let more = more_multiplier(stats, damage_type);
        hit_by_type.insert(damage_type, amount * increased * more);
    }
    let hit: f64 = hit_by_type.values().sum();

    // Step 5: crit expectation
    let crit_damage = stats.get_or("crit_dmg", 1.0);
    let average_hit = expected_hit(hit, crit_rate, crit_damage);

    // Step 6: rate conversion
    SkillEvaluation {
        average_hit,
        dps: average_hit * attack_rate,
        crit_rate,
        attack_rate,
        damage_type: Some(component.damage_type),
        hit_by_type,
    }
}

/// `hit × (1 + c × (m − 1))` with `c` clamped to [0, 1]
pub fn expected_hit(hit: f64, crit_rate: f64, crit_multiplier: f64) -> f64 {
    let c = if crit_rate.is_finite() {
        crit_rate.clamp(0.0, 1.0)
    } else {
        0.0
    };
    hit * (1.0 + c * (crit_multiplier - 1.0))
}

/// `1 + inc_all + inc_<type>` plus `inc_elemental` for elemental types
fn increased_multiplier(stats: &StatTable, damage_type: DamageType) -> f64 {
    let mut increased = 1.0 + stats.get("inc_all") + stats.get(&format!("inc_{}", damage_type));
    if damage_type.is_elemental() {
        increased += stats.get("inc_elemental");
    }
    increased
}

/// Each "more" bucket is its own factor
fn more_multiplier(stats: &StatTable, damage_type: DamageType) -> f64 {
    let mut more = (1.0 + stats.get("more_damage"))
        * (1.0 + stats.get(&format!("more_{}", damage_type)));
    if damage_type.is_elemental() {
        more *= 1.0 + stats.get("more_elemental");
    }
    more
}

fn attack_rate(stats: &StatTable) -> f64 {
    let rate = stats.get("atk_spd");
    if rate > 0.0 && rate.is_finite() {
        rate
    } else {
        FALLBACK_ATTACK_RATE
    }
}

fn crit_rate(stats: &StatTable) -> f64 {
    let rate = stats.get("crit_rate");
    if rate.is_finite() {
        rate.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
