//! Side-effect profile - expected healing and mitigation of a chain

use crate::damage::SkillEffects;
use serde::{Deserialize, Serialize};

/// Lower clamp of the expected damage-taken multiplier
pub const MIN_DAMAGE_TAKEN_MULT: f64 = 0.05;
/// Upper clamp of the expected damage-taken multiplier
pub const MAX_DAMAGE_TAKEN_MULT: f64 = 5.0;

/// Survival effects accumulated over every visited node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideEffectProfile {
    /// Expected healing per second (absolute health)
    pub heal_per_second: f64,
    /// Expected damage-taken multiplier (< 1.0 mitigates)
    pub damage_taken_mult: f64,
}

impl Default for SideEffectProfile {
    fn default() -> Self {
        SideEffectProfile {
            heal_per_second: 0.0,
            damage_taken_mult: 1.0,
        }
    }
}

impl SideEffectProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the effects of a node firing at `rate` per second
    ///
    /// The rate is capped by the effect's ICD first. Heals stack additively,
    /// mitigation multipliers compose by product after uptime blending.
    pub fn record(&mut self, effects: &SkillEffects, rate: f64, hero_max_health: f64) {
        let rate = effects.capped_rate(rate);
        if rate.is_nan() || rate <= 0.0 {
            return;
        }

        if effects.heal_percent_max_hp > 0.0 {
            self.heal_per_second += rate * effects.heal_percent_max_hp * hero_max_health;
        }

        if let (Some(mult), Some(duration)) = (effects.damage_taken_mult, effects.duration) {
            if mult > 0.0 && duration > 0.0 {
                self.damage_taken_mult *= blended_multiplier(uptime(rate, duration), mult);
            }
        }
    }

    /// Final guards: heal ≥ 0, multiplier in [0.05, 5.0]
    pub fn clamped(self) -> Self {
        let heal = if self.heal_per_second.is_finite() {
            self.heal_per_second.max(0.0)
        } else {
            0.0
        };
        let mult = if self.damage_taken_mult.is_nan() {
            1.0
        } else {
            self.damage_taken_mult
                .clamp(MIN_DAMAGE_TAKEN_MULT, MAX_DAMAGE_TAKEN_MULT)
        };
        SideEffectProfile {
            heal_per_second: heal,
            damage_taken_mult: mult,
        }
    }
}

/// Fraction of time an effect is active: `min(1, rate × duration)`
pub fn uptime(rate: f64, duration: f64) -> f64 {
    if rate > 0.0 && duration > 0.0 {
        (rate * duration).min(1.0)
    } else {
        0.0
    }
}

/// `uptime × mult + (1 − uptime) × 1`
pub fn blended_multiplier(uptime: f64, mult: f64) -> f64 {
    uptime * mult + (1.0 - uptime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uptime_clamps_at_one() {
        assert_eq!(uptime(2.0, 0.5), 1.0);
        assert_eq!(uptime(4.0, 0.5), 1.0);
        assert!((uptime(0.5, 1.0) - 0.5).abs() < f64::EPSILON);
        assert_eq!(uptime(0.0, 3.0), 0.0);
    }

    #[test]
    fn test_full_uptime_uses_raw_multiplier() {
        let mut profile = SideEffectProfile::new();
        profile.record(&SkillEffects::mitigation(0.6, 0.5), 2.0, 500.0);
        assert!((profile.damage_taken_mult - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_partial_uptime_blends() {
        let mut profile = SideEffectProfile::new();
        profile.record(&SkillEffects::mitigation(0.5, 1.0), 0.5, 500.0);
        // 0.5 × 0.5 + 0.5 × 1
        assert!((profile.damage_taken_mult - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_mitigations_compose() {
        let mut profile = SideEffectProfile::new();
        profile.record(&SkillEffects::mitigation(0.5, 10.0), 1.0, 500.0);
        profile.record(&SkillEffects::mitigation(0.8, 10.0), 1.0, 500.0);
        assert!((profile.damage_taken_mult - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_heals_stack() {
        let mut profile = SideEffectProfile::new();
        profile.record(&SkillEffects::heal(0.02), 1.5, 500.0);
        profile.record(&SkillEffects::heal(0.01), 2.0, 500.0);
        // 1.5 × 0.02 × 500 + 2 × 0.01 × 500
        assert!((profile.heal_per_second - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_icd_caps_effect_rate() {
        let mut profile = SideEffectProfile::new();
        profile.record(&SkillEffects::heal(0.1).with_icd(4.0), 3.0, 400.0);
        // rate capped to 0.25/s
        assert!((profile.heal_per_second - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_mitigation_needs_duration() {
        let mut profile = SideEffectProfile::new();
        let effects = SkillEffects {
            damage_taken_mult: Some(0.2),
            ..Default::default()
        };
        profile.record(&effects, 5.0, 500.0);
        assert_eq!(profile.damage_taken_mult, 1.0);
    }

    #[test]
    fn test_clamped() {
        let profile = SideEffectProfile {
            heal_per_second: -3.0,
            damage_taken_mult: 0.001,
        }
        .clamped();
        assert_eq!(profile.heal_per_second, 0.0);
        assert_eq!(profile.damage_taken_mult, MIN_DAMAGE_TAKEN_MULT);

        let high = SideEffectProfile {
            heal_per_second: 1.0,
            damage_taken_mult: 9.0,
        }
        .clamped();
        assert_eq!(high.damage_taken_mult, MAX_DAMAGE_TAKEN_MULT);
    }
}
