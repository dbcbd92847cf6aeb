use chain_core::combat::{compare_builds, fingerprint, verify, Side, TerminationReason};
use chain_core::prelude::*;

fn approx_eq(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "expected {b}, got {a}");
}

/// 500 hp hero, one attack per second, no crits
fn hero() -> StatModel {
    let base: StatTable = [("max_hp", 500.0), ("atk_spd", 1.0), ("crit_rate", 0.0)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    StatModel::from_base(base, Vec::new())
}

fn flat_skill(id: &str, hit: f64) -> Skill {
    Skill::new(id, id).with_component(
        DamageComponent::new(DamageType::Physical, hit, hit).scaling("base_atk", 0.0),
    )
}

fn single_skill(hit: f64) -> SkillTree {
    let mut tree = SkillTree::new();
    tree.add_node(SkillNode::new(flat_skill("strike", hit)));
    tree
}

fn fight(enemy: EnemyProfile) -> FightConfig {
    FightConfig::new(enemy).with_time(0.1, 20.0)
}

#[test]
fn scenario_win_at_fifteen_seconds() {
    let result = simulate_fight(
        &single_skill(200.0),
        &hero(),
        fight(EnemyProfile::new(3000.0, 30.0)),
    )
    .unwrap();

    assert_eq!(result.outcome, Outcome::Win);
    assert_eq!(result.reason, TerminationReason::EnemyDead);
    approx_eq(result.elapsed_time, 15.0, 0.11);
    assert_eq!(result.summary.enemy_health_left, 0.0);
    approx_eq(result.summary.hero_health_left, 500.0 - 30.0 * result.elapsed_time, 1e-6);
    approx_eq(result.summary.average_dps, 200.0, 1.5);
}

#[test]
fn scenario_lose_against_heavy_hitter() {
    let result = simulate_fight(
        &single_skill(200.0),
        &hero(),
        fight(EnemyProfile::new(3000.0, 300.0)),
    )
    .unwrap();

    assert_eq!(result.outcome, Outcome::Lose);
    assert_eq!(result.reason, TerminationReason::HeroDead);
    assert!(result.elapsed_time < 2.0);
    assert!(result.summary.enemy_health_left > 0.0);
    assert_eq!(result.summary.hero_health_left, 0.0);
}

#[test]
fn scenario_timeout_reports_exact_max_time() {
    let result = simulate_fight(
        &single_skill(10.0),
        &hero(),
        fight(EnemyProfile::new(3000.0, 5.0)),
    )
    .unwrap();

    assert_eq!(result.outcome, Outcome::Timeout);
    assert_eq!(result.reason, TerminationReason::DamageInsufficient);
    assert_eq!(result.elapsed_time, 20.0);
    assert_eq!(result.samples.len(), 200);
    assert!(result.summary.enemy_health_left > 0.0);
    assert!(result.summary.hero_health_left > 0.0);
}

#[test]
fn uneven_time_step_never_overruns_max_time() {
    let hero_hits = single_skill(1000.0);

    // Needs 1.1 s of damage, only 1.0 s is allowed
    let timeout = simulate_fight(
        &hero_hits,
        &hero(),
        FightConfig::new(EnemyProfile::new(1100.0, 1.0)).with_time(0.3, 1.0),
    )
    .unwrap();
    assert_eq!(timeout.outcome, Outcome::Timeout);
    assert_eq!(timeout.elapsed_time, 1.0);
    assert_eq!(timeout.samples.len(), 4);
    assert_eq!(timeout.final_sample().unwrap().time, timeout.elapsed_time);

    // Dies inside the shortened last tick
    let win = simulate_fight(
        &hero_hits,
        &hero(),
        FightConfig::new(EnemyProfile::new(950.0, 1.0)).with_time(0.3, 1.0),
    )
    .unwrap();
    assert_eq!(win.outcome, Outcome::Win);
    assert!(win.elapsed_time <= 1.0);
    assert_eq!(win.final_sample().unwrap().time, win.elapsed_time);
}

#[test]
fn samples_are_monotonic_in_time() {
    let result = simulate_fight(
        &single_skill(50.0),
        &hero(),
        fight(EnemyProfile::new(3000.0, 20.0)),
    )
    .unwrap();

    for pair in result.samples.windows(2) {
        assert!(pair[1].time > pair[0].time);
        assert!(pair[1].enemy_health <= pair[0].enemy_health);
    }
}

#[test]
fn identical_fights_share_a_fingerprint() {
    let tree = single_skill(120.0);
    let model = hero();
    let config = fight(EnemyProfile::new(3000.0, 40.0).with_burst(4.0, 2.5));

    let first = simulate_fight(&tree, &model, config.clone()).unwrap();
    let second = simulate_fight(&tree, &model, config.clone()).unwrap();
    assert_eq!(first.fingerprint, second.fingerprint);
    assert_eq!(first.fingerprint.len(), 64);
    assert!(verify(&first));

    let mut reseeded = config;
    reseeded.seed = 7;
    let third = simulate_fight(&tree, &model, reseeded).unwrap();
    assert_ne!(first.fingerprint, third.fingerprint);
}

#[test]
fn tampered_result_fails_verification() {
    let mut result = simulate_fight(
        &single_skill(200.0),
        &hero(),
        fight(EnemyProfile::new(3000.0, 30.0)),
    )
    .unwrap();
    result.summary.total_damage += 1.0;
    assert!(!verify(&result));
    assert_ne!(fingerprint(&result), result.fingerprint);
}

#[test]
fn low_health_trigger_kicks_in_mid_fight() {
    let mut tree = single_skill(10.0);
    let last_stand = tree.add_node(SkillNode::new(flat_skill("last_stand", 100.0)));
    tree.link(NodeId(0), "hp_lt_50", last_stand).unwrap();

    let result = simulate_fight(
        &tree,
        &hero(),
        fight(EnemyProfile::new(1_000_000.0, 40.0)),
    )
    .unwrap();

    approx_eq(result.samples[0].dps, 10.0, 1e-9);
    let last = result.final_sample().unwrap();
    approx_eq(last.dps, 110.0, 1e-9);
    assert_eq!(result.outcome, Outcome::Lose);
}

#[test]
fn mitigation_chain_extends_survival() {
    let enemy = EnemyProfile::new(1_000_000.0, 100.0);
    let bare = simulate_fight(&single_skill(10.0), &hero(), fight(enemy.clone())).unwrap();

    let mut guarded = single_skill(10.0);
    let guard = guarded.add_node(SkillNode::new(
        Skill::new("guard", "Guard").with_effects(SkillEffects::mitigation(0.5, 1.0)),
    ));
    guarded.link(NodeId(0), "on_hit", guard).unwrap();
    let with_guard = simulate_fight(&guarded, &hero(), fight(enemy)).unwrap();

    assert_eq!(bare.outcome, Outcome::Lose);
    approx_eq(with_guard.samples[0].damage_taken_mult, 0.5, 1e-12);
    assert!(with_guard.elapsed_time > bare.elapsed_time * 1.9);
}

#[test]
fn stepping_matches_run() {
    let tree = single_skill(200.0);
    let model = hero();
    let config = fight(EnemyProfile::new(3000.0, 30.0));

    let mut stepped = Fight::new(&tree, &model, config.clone()).unwrap();
    let mut steps = 0;
    while stepped.step().unwrap() == chain_core::combat::FightStatus::Running {
        steps += 1;
    }
    let ran = Fight::new(&tree, &model, config).unwrap().run().unwrap();
    assert_eq!(steps + 1, ran.samples.len());
    assert_eq!(stepped.state().samples, ran.samples);
}

#[test]
fn default_catalog_build_is_additive() {
    let catalog = default_catalog();
    let spec = BuildSpec::new("sorceress", "fireball")
        .with_talent("arcanist")
        .with_modifier("searing")
        .with_trigger(
            TriggerSpec::new("on_crit", "chain_lightning")
                .with_trigger(TriggerSpec::new("on_hit", "vampiric_touch")),
        )
        .with_trigger(TriggerSpec::new("fixed_chance_20", "frost_nova"));
    let build = spec.assemble(&catalog).unwrap();

    let chain = propagate(
        &build.tree,
        &build.stats,
        &EvalContext::default(),
        &catalog.rules.limits(),
    )
    .unwrap();
    let sum: f64 = chain.node_log.iter().map(|l| l.dps).sum();
    assert_eq!(chain.total_dps, sum);
    assert_eq!(chain.node_log.len(), 4);
    assert!(chain.profile.heal_per_second > 0.0);
}

#[test]
fn ab_comparison_prefers_the_faster_kill() {
    let catalog = default_catalog();
    let base = BuildSpec::new("warrior", "heavy_strike").with_talent("brawler");
    let a = Scenario::new(base.clone().with_modifier("brutality")).with_preset("training_dummy");
    let b = Scenario::new(base).with_preset("training_dummy");

    let comparison = compare_builds(&catalog, &a, &b).unwrap();
    assert!(comparison.a.is_win());
    assert_eq!(comparison.preferred, Some(Side::A));
    assert!(comparison.dps_delta < 0.0);
}
