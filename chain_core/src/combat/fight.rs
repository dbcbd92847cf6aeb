//! Fight simulation - fixed-step hero vs enemy loop

use super::fingerprint::fingerprint;
use super::{FightResult, FightSummary, TerminationReason, TickSample};
use crate::chain::{propagate, ChainLimits, EvalContext, EvalError, NodeLog, SkillTree};
use crate::stat_block::StatModel;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Bounds of the per-tick incoming damage multiplier
pub const MIN_INCOMING_MULT: f64 = 0.05;
pub const MAX_INCOMING_MULT: f64 = 10.0;
/// Floor of the hero's own damage-taken multiplier
pub const MIN_BASE_MITIGATION: f64 = 0.05;

const TIME_EPSILON: f64 = 1e-9;

/// Periodic enemy damage spike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstConfig {
    /// Seconds between bursts
    pub interval: f64,
    /// Incoming damage multiplier on a burst tick
    pub multiplier: f64,
}

/// Enemy with a constant damage rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyProfile {
    #[serde(default = "default_enemy_health")]
    pub max_health: f64,
    #[serde(default = "default_enemy_dps")]
    pub dps: f64,
    #[serde(default)]
    pub burst: Option<BurstConfig>,
}

impl Default for EnemyProfile {
    fn default() -> Self {
        EnemyProfile {
            max_health: default_enemy_health(),
            dps: default_enemy_dps(),
            burst: None,
        }
    }
}

fn default_enemy_health() -> f64 {
    3000.0
}
fn default_enemy_dps() -> f64 {
    30.0
}

impl EnemyProfile {
    pub fn new(max_health: f64, dps: f64) -> Self {
        EnemyProfile {
            max_health,
            dps,
            burst: None,
        }
    }

    pub fn with_burst(mut self, interval: f64, multiplier: f64) -> Self {
        self.burst = Some(BurstConfig {
            interval,
            multiplier,
        });
        self
    }
}

/// Everything a fight needs besides the build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FightConfig {
    #[serde(default)]
    pub enemy: EnemyProfile,
    /// Seconds per tick
    #[serde(default = "default_time_step")]
    pub time_step: f64,
    #[serde(default = "default_max_time")]
    pub max_time: f64,
    /// Recorded for reproducibility; the simulation draws no randomness
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub limits: ChainLimits,
}

impl Default for FightConfig {
    fn default() -> Self {
        FightConfig {
            enemy: EnemyProfile::default(),
            time_step: default_time_step(),
            max_time: default_max_time(),
            seed: 0,
            limits: ChainLimits::default(),
        }
    }
}

fn default_time_step() -> f64 {
    0.1
}
fn default_max_time() -> f64 {
    20.0
}

impl FightConfig {
    pub fn new(enemy: EnemyProfile) -> Self {
        FightConfig {
            enemy,
            ..Default::default()
        }
    }

    pub fn with_time(mut self, time_step: f64, max_time: f64) -> Self {
        self.time_step = time_step;
        self.max_time = max_time;
        self
    }

    pub fn with_limits(mut self, limits: ChainLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Replace unusable timing with the defaults
    fn sanitized(mut self) -> Self {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            warn!(time_step = self.time_step, "invalid time step, using default");
            self.time_step = default_time_step();
        }
        if !(self.max_time.is_finite() && self.max_time > 0.0) {
            warn!(max_time = self.max_time, "invalid max time, using default");
            self.max_time = default_max_time();
        }
        if !(self.enemy.dps.is_finite() && self.enemy.dps >= 0.0) {
            warn!(dps = self.enemy.dps, "invalid enemy dps, using 0");
            self.enemy.dps = 0.0;
        }
        if let Some(burst) = &mut self.enemy.burst {
            if !(burst.multiplier.is_finite() && burst.multiplier >= 0.0) {
                warn!(multiplier = burst.multiplier, "invalid burst multiplier, using 1");
                burst.multiplier = 1.0;
            }
        }
        self
    }
}

/// Mutable state of one fight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FightState {
    pub hero_health: f64,
    pub hero_max_health: f64,
    pub enemy_health: f64,
    pub enemy_max_health: f64,
    pub elapsed: f64,
    pub ticks: u64,
    pub last_burst: f64,
    pub samples: Vec<TickSample>,
    pub total_damage: f64,
    pub total_healing: f64,
    pub total_incoming: f64,
    pub bursts: u32,
}

impl FightState {
    fn new(hero_max_health: f64, enemy_max_health: f64) -> Self {
        FightState {
            hero_health: hero_max_health,
            hero_max_health,
            enemy_health: enemy_max_health,
            enemy_max_health,
            elapsed: 0.0,
            ticks: 0,
            last_burst: 0.0,
            samples: Vec::new(),
            total_damage: 0.0,
            total_healing: 0.0,
            total_incoming: 0.0,
            bursts: 0,
        }
    }

    pub fn health_fraction(&self) -> f64 {
        if self.hero_max_health > 0.0 {
            self.hero_health / self.hero_max_health
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FightStatus {
    Running,
    Finished(TerminationReason),
}

/// A fight in progress
///
/// Drive it with [`Fight::step`], or run it to completion with [`Fight::run`].
/// Stopping between steps is always safe.
#[derive(Debug)]
pub struct Fight<'a> {
    tree: &'a SkillTree,
    model: &'a StatModel,
    config: FightConfig,
    state: FightState,
    base_mitigation: f64,
    last_log: Vec<NodeLog>,
    status: FightStatus,
}

impl<'a> Fight<'a> {
    pub fn new(
        tree: &'a SkillTree,
        model: &'a StatModel,
        config: FightConfig,
    ) -> Result<Self, EvalError> {
        tree.checked_root()?;
        let hero_max_health = model.hero_max_health();
        if !(hero_max_health.is_finite() && hero_max_health > 0.0) {
            return Err(EvalError::NonPositiveMaxHealth(hero_max_health));
        }

        let config = config.sanitized();
        let state = FightState::new(hero_max_health, config.enemy.max_health);
        let base_mitigation = base_mitigation(model);
        debug!(
            hero_max_health,
            enemy_health = config.enemy.max_health,
            enemy_dps = config.enemy.dps,
            base_mitigation,
            "fight started"
        );

        Ok(Fight {
            tree,
            model,
            config,
            state,
            base_mitigation,
            last_log: Vec::new(),
            status: FightStatus::Running,
        })
    }

    pub fn state(&self) -> &FightState {
        &self.state
    }

    pub fn config(&self) -> &FightConfig {
        &self.config
    }

    pub fn status(&self) -> FightStatus {
        self.status
    }

    /// Advance one tick. A finished fight stays finished
    pub fn step(&mut self) -> Result<FightStatus, EvalError> {
        if let FightStatus::Finished(_) = self.status {
            return Ok(self.status);
        }

        let max_time = self.config.max_time;

        // 1-2: fresh context, fresh chain
        let ctx = EvalContext::at_health(self.state.health_fraction());
        let chain = propagate(self.tree, self.model, &ctx, &self.config.limits)?;

        let state = &mut self.state;
        let previous = state.elapsed;
        state.ticks += 1;
        // The last tick is cut short so the clock stops exactly at max_time
        let mut now = state.ticks as f64 * self.config.time_step;
        if now + TIME_EPSILON >= max_time {
            now = max_time;
        }
        state.elapsed = now;
        let dt = now - previous;

        // 3: outgoing damage
        let dealt = chain.total_dps * dt;
        state.enemy_health -= dealt;
        state.total_damage += dealt;

        // 4: incoming damage
        let mut incoming = self.config.enemy.dps * dt;
        let mut burst = false;
        if let Some(cfg) = &self.config.enemy.burst {
            if cfg.interval > 0.0 && state.elapsed - state.last_burst + TIME_EPSILON >= cfg.interval {
                incoming *= cfg.multiplier;
                state.last_burst = state.elapsed;
                state.bursts += 1;
                burst = true;
            }
        }
        let incoming_mult = (self.base_mitigation * chain.profile.damage_taken_mult)
            .clamp(MIN_INCOMING_MULT, MAX_INCOMING_MULT);
        incoming = (incoming * incoming_mult).max(0.0);
        state.hero_health -= incoming;
        state.total_incoming += incoming;

        // 5: healing, capped at max health
        let heal = (chain.profile.heal_per_second * dt).max(0.0);
        let healed = (state.hero_health + heal).min(state.hero_max_health);
        state.total_healing += (healed - state.hero_health).max(0.0);
        state.hero_health = healed;

        // 6: sample
        state.samples.push(TickSample {
            time: state.elapsed,
            hero_health: state.hero_health.max(0.0),
            enemy_health: state.enemy_health.max(0.0),
            burst,
            dps: chain.total_dps,
            heal_per_second: chain.profile.heal_per_second,
            damage_taken_mult: incoming_mult,
        });
        trace!(
            time = state.elapsed,
            hero = state.hero_health,
            enemy = state.enemy_health,
            burst,
            "tick"
        );
        self.last_log = chain.node_log;

        // 7: termination
        let reason = if state.enemy_health <= 0.0 {
            Some(TerminationReason::EnemyDead)
        } else if state.hero_health <= 0.0 {
            Some(TerminationReason::HeroDead)
        } else if state.elapsed >= max_time {
            Some(TerminationReason::DamageInsufficient)
        } else {
            None
        };

        if let Some(reason) = reason {
            debug!(outcome = %reason.outcome(), elapsed = state.elapsed, "fight finished");
            self.status = FightStatus::Finished(reason);
        }
        Ok(self.status)
    }

    /// Step until a terminal state and build the result record
    pub fn run(mut self) -> Result<FightResult, EvalError> {
        loop {
            if let FightStatus::Finished(reason) = self.step()? {
                return Ok(self.into_result(reason));
            }
        }
    }

    fn into_result(self, reason: TerminationReason) -> FightResult {
        let state = self.state;
        let elapsed = state.elapsed;
        let summary = FightSummary {
            hero_max_health: state.hero_max_health,
            hero_health_left: state.hero_health.max(0.0),
            enemy_health_left: state.enemy_health.max(0.0),
            average_dps: if elapsed > 0.0 {
                state.total_damage / elapsed
            } else {
                0.0
            },
            total_damage: state.total_damage,
            total_healing: state.total_healing,
            total_incoming: state.total_incoming,
            bursts: state.bursts,
        };

        let mut result = FightResult {
            outcome: reason.outcome(),
            elapsed_time: elapsed,
            reason,
            samples: state.samples,
            node_log: self.last_log,
            config: self.config,
            summary,
            fingerprint: String::new(),
        };
        result.fingerprint = fingerprint(&result);
        result
    }
}

/// Hero's own damage-taken multiplier
///
/// `damage_taken_mult` is a multiplier (0.8 = 20% less), `damage_taken` an
/// offset (-0.2 = 20% less). Both may be present.
pub fn base_mitigation(model: &StatModel) -> f64 {
    let stats = model.resolve(&[], 1.0);
    let mult = stats.get("damage_taken_mult") * (1.0 + stats.get("damage_taken"));
    if mult.is_nan() {
        1.0
    } else {
        mult.max(MIN_BASE_MITIGATION)
    }
}

/// Run a fight from start to finish
pub fn simulate_fight(
    tree: &SkillTree,
    model: &StatModel,
    config: FightConfig,
) -> Result<FightResult, EvalError> {
    Fight::new(tree, model, config)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::SkillNode;
    use crate::combat::Outcome;
    use crate::damage::{DamageComponent, Skill, SkillEffects};
    use crate::stat_block::StatTable;
    use crate::types::DamageType;

    fn hero(extra: &[(&str, f64)]) -> StatModel {
        let mut entries = vec![
            ("max_hp".to_string(), 500.0),
            ("atk_spd".to_string(), 1.0),
            ("crit_rate".to_string(), 0.0),
        ];
        entries.extend(extra.iter().map(|(k, v)| (k.to_string(), *v)));
        StatModel::from_base(entries.into_iter().collect::<StatTable>(), Vec::new())
    }

    fn tree_with_dps(dps: f64) -> SkillTree {
        let mut tree = SkillTree::new();
        tree.add_node(SkillNode::new(Skill::new("strike", "Strike").with_component(
            DamageComponent::new(DamageType::Physical, dps, dps).scaling("base_atk", 0.0),
        )));
        tree
    }

    #[test]
    fn test_step_by_step() {
        let tree = tree_with_dps(100.0);
        let model = hero(&[]);
        let mut fight = Fight::new(&tree, &model, FightConfig::new(EnemyProfile::new(1000.0, 10.0))).unwrap();

        assert_eq!(fight.step().unwrap(), FightStatus::Running);
        let state = fight.state();
        assert!((state.elapsed - 0.1).abs() < 1e-12);
        assert!((state.enemy_health - 990.0).abs() < 1e-9);
        assert!((state.hero_health - 499.0).abs() < 1e-9);
        assert_eq!(state.samples.len(), 1);
    }

    #[test]
    fn test_finished_fight_does_not_advance() {
        let tree = tree_with_dps(10_000.0);
        let model = hero(&[]);
        let mut fight = Fight::new(&tree, &model, FightConfig::new(EnemyProfile::new(100.0, 10.0))).unwrap();
        let status = fight.step().unwrap();
        assert_eq!(status, FightStatus::Finished(TerminationReason::EnemyDead));
        assert_eq!(fight.step().unwrap(), status);
        assert_eq!(fight.state().ticks, 1);
    }

    #[test]
    fn test_burst_every_interval() {
        let tree = tree_with_dps(0.0);
        let model = hero(&[]);
        let enemy = EnemyProfile::new(1000.0, 1.0).with_burst(2.0, 5.0);
        let result = simulate_fight(&tree, &model, FightConfig::new(enemy).with_time(0.1, 10.0)).unwrap();

        assert_eq!(result.outcome, Outcome::Timeout);
        assert_eq!(result.summary.bursts, 5);
        let burst_times: Vec<f64> = result.samples.iter().filter(|s| s.burst).map(|s| s.time).collect();
        assert!((burst_times[0] - 2.0).abs() < 1e-9);
        // 100 ticks × 0.1, 5 of them at 5x
        assert!((result.summary.total_incoming - (9.5 + 0.5 * 5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_base_mitigation_forms() {
        assert_eq!(base_mitigation(&hero(&[])), 1.0);
        assert!((base_mitigation(&hero(&[("damage_taken_mult", 0.8)])) - 0.8).abs() < 1e-12);
        assert!((base_mitigation(&hero(&[("damage_taken", -0.2)])) - 0.8).abs() < 1e-12);
        assert_eq!(base_mitigation(&hero(&[("damage_taken", -3.0)])), MIN_BASE_MITIGATION);
    }

    #[test]
    fn test_mitigated_incoming() {
        let tree = tree_with_dps(0.0);
        let model = hero(&[("damage_taken_mult", 0.5)]);
        let mut fight = Fight::new(&tree, &model, FightConfig::new(EnemyProfile::new(1000.0, 100.0))).unwrap();
        fight.step().unwrap();
        assert!((fight.state().hero_health - 495.0).abs() < 1e-9);
    }

    #[test]
    fn test_heal_capped_at_max_health() {
        let mut tree = tree_with_dps(10.0);
        let mend = tree.add_node(SkillNode::new(
            Skill::new("mend", "Mend").with_effects(SkillEffects::heal(0.5)),
        ));
        tree.link(crate::types::NodeId(0), "on_hit", mend).unwrap();
        let model = hero(&[]);
        let result = simulate_fight(
            &tree,
            &model,
            FightConfig::new(EnemyProfile::new(1_000_000.0, 10.0)).with_time(0.1, 1.0),
        )
        .unwrap();
        assert!(result.samples.iter().all(|s| s.hero_health <= 500.0));
        assert!((result.summary.hero_health_left - 500.0).abs() < 1e-9);
        // Healing only counts what was restored
        assert!((result.summary.total_healing - result.summary.total_incoming).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_timing_falls_back() {
        let tree = tree_with_dps(1.0);
        let model = hero(&[]);
        let config = FightConfig::new(EnemyProfile::new(1e9, 0.0)).with_time(0.0, f64::NAN);
        let fight = Fight::new(&tree, &model, config).unwrap();
        assert_eq!(fight.config().time_step, 0.1);
        assert_eq!(fight.config().max_time, 20.0);
    }

    #[test]
    fn test_invalid_enemy_falls_back() {
        let tree = tree_with_dps(1.0);
        let model = hero(&[]);
        let enemy = EnemyProfile::new(1e9, f64::NAN).with_burst(1.0, -50.0);
        let fight = Fight::new(&tree, &model, FightConfig::new(enemy)).unwrap();
        assert_eq!(fight.config().enemy.dps, 0.0);
        assert_eq!(fight.config().enemy.burst.as_ref().map(|b| b.multiplier), Some(1.0));
    }

    #[test]
    fn test_negative_burst_never_heals() {
        let tree = tree_with_dps(1.0);
        let model = hero(&[]);
        let enemy = EnemyProfile::new(1e9, 100.0).with_burst(1.0, -50.0);
        let result = simulate_fight(&tree, &model, FightConfig::new(enemy).with_time(0.1, 20.0)).unwrap();

        assert!(result.summary.total_incoming >= 0.0);
        assert!(result.samples.windows(2).all(|w| w[1].hero_health <= w[0].hero_health));
        assert_eq!(result.outcome, Outcome::Lose);
    }

    #[test]
    fn test_nan_enemy_dps_is_harmless() {
        let tree = tree_with_dps(1.0);
        let model = hero(&[]);
        let config = FightConfig::new(EnemyProfile::new(1e9, f64::NAN)).with_time(0.1, 2.0);
        let result = simulate_fight(&tree, &model, config).unwrap();

        assert_eq!(result.outcome, Outcome::Timeout);
        assert!(result.samples.iter().all(|s| !s.hero_health.is_nan()));
        assert_eq!(result.summary.total_incoming, 0.0);
    }

    #[test]
    fn test_last_tick_stops_at_max_time() {
        let tree = tree_with_dps(1000.0);
        let model = hero(&[]);
        let mut fight = Fight::new(
            &tree,
            &model,
            FightConfig::new(EnemyProfile::new(1_000_000.0, 1.0)).with_time(0.3, 1.0),
        )
        .unwrap();
        for _ in 0..3 {
            assert_eq!(fight.step().unwrap(), FightStatus::Running);
        }
        assert_eq!(
            fight.step().unwrap(),
            FightStatus::Finished(TerminationReason::DamageInsufficient)
        );
        let state = fight.state();
        assert_eq!(state.elapsed, 1.0);
        // 0.9 s of full ticks plus a 0.1 s remainder
        assert!((state.total_damage - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_cannot_start_without_tree() {
        let tree = SkillTree::new();
        let model = hero(&[]);
        assert_eq!(
            Fight::new(&tree, &model, FightConfig::default()).err(),
            Some(EvalError::EmptyTree)
        );
    }

    #[test]
    fn test_config_toml_defaults() {
        let config: FightConfig = toml::from_str("[enemy]\ndps = 45.0\n").unwrap();
        assert_eq!(config.enemy.dps, 45.0);
        assert_eq!(config.enemy.max_health, 3000.0);
        assert_eq!(config.time_step, 0.1);
        assert_eq!(config.max_time, 20.0);
        assert_eq!(config.limits, ChainLimits::default());
    }
}
