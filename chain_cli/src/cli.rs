use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chain_core::chain::{propagate, ChainEvaluation, EvalContext};
use chain_core::combat::{compare_builds, BuildComparison, FightResult, Side};
use chain_core::config::{default_catalog, load_catalog, load_toml, ContentCatalog, Scenario};
use serde::Serialize;
use tracing::{debug, error};

const USAGE: &str = "usage: chain_cli <fight|chain|compare|catalog> [--catalog <path>] [--json]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Fight,
    Chain,
    Compare,
    Catalog,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("fight") => Some(Command::Fight),
        Some("chain") => Some(Command::Chain),
        Some("compare") => Some(Command::Compare),
        Some("catalog") => Some(Command::Catalog),
        _ => None,
    }
}

/// Flags shared by every subcommand, plus what is left over
#[derive(Debug, Default, PartialEq)]
struct Options {
    catalog: Option<PathBuf>,
    json: bool,
    health: Option<f64>,
    positional: Vec<String>,
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    let mut rest = args.iter().skip(2);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--json" => options.json = true,
            "--catalog" => {
                let path = rest.next().ok_or("--catalog needs a path")?;
                options.catalog = Some(PathBuf::from(path));
            }
            "--health" => {
                let raw = rest.next().ok_or("--health needs a fraction")?;
                let value = raw
                    .parse::<f64>()
                    .map_err(|_| format!("invalid health fraction '{raw}'"))?;
                options.health = Some(value);
            }
            flag if flag.starts_with("--") => return Err(format!("unknown flag '{flag}'")),
            _ => options.positional.push(arg.clone()),
        }
    }
    Ok(options)
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };
    let options = match parse_options(args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{USAGE}");
            return 2;
        }
    };

    match command {
        Command::Fight => handle_fight(&options),
        Command::Chain => handle_chain(&options),
        Command::Compare => handle_compare(&options),
        Command::Catalog => handle_catalog(&options),
    }
}

fn open_catalog(options: &Options) -> Option<ContentCatalog> {
    match &options.catalog {
        Some(path) => match load_catalog(path) {
            Ok(catalog) => {
                debug!(path = %path.display(), "catalog loaded");
                Some(catalog)
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "catalog failed to load");
                None
            }
        },
        None => Some(default_catalog()),
    }
}

fn open_scenario(path: &str) -> Option<Scenario> {
    match load_toml::<Scenario>(Path::new(path)) {
        Ok(scenario) => Some(scenario),
        Err(err) => {
            error!(path, error = %err, "scenario failed to load");
            None
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize result: {err}");
            1
        }
    }
}

fn handle_fight(options: &Options) -> i32 {
    let Some(path) = options.positional.first() else {
        eprintln!("usage: chain_cli fight <scenario.toml>");
        return 2;
    };
    let (Some(catalog), Some(scenario)) = (open_catalog(options), open_scenario(path)) else {
        return 1;
    };

    match scenario.run(&catalog) {
        Ok(result) if options.json => print_json(&result),
        Ok(result) => {
            print!("{}", fight_summary(scenario_name(&scenario, path), &result));
            0
        }
        Err(err) => {
            eprintln!("fight failed: {err}");
            1
        }
    }
}

fn handle_chain(options: &Options) -> i32 {
    let Some(path) = options.positional.first() else {
        eprintln!("usage: chain_cli chain <scenario.toml> [--health <fraction>]");
        return 2;
    };
    let (Some(catalog), Some(scenario)) = (open_catalog(options), open_scenario(path)) else {
        return 1;
    };

    let build = match scenario.build.assemble(&catalog) {
        Ok(build) => build,
        Err(err) => {
            eprintln!("build failed: {err}");
            return 1;
        }
    };
    let limits = scenario.limits.unwrap_or_else(|| catalog.rules.limits());
    let ctx = EvalContext::at_health(options.health.unwrap_or(1.0));

    match propagate(&build.tree, &build.stats, &ctx, &limits) {
        Ok(chain) if options.json => print_json(&chain),
        Ok(chain) => {
            print!("{}", chain_table(&build.name, &chain));
            0
        }
        Err(err) => {
            eprintln!("evaluation failed: {err}");
            1
        }
    }
}

fn handle_compare(options: &Options) -> i32 {
    let [path_a, path_b] = options.positional.as_slice() else {
        eprintln!("usage: chain_cli compare <a.toml> <b.toml>");
        return 2;
    };
    let loaded = (
        open_catalog(options),
        open_scenario(path_a),
        open_scenario(path_b),
    );
    let (Some(catalog), Some(a), Some(b)) = loaded else {
        return 1;
    };

    match compare_builds(&catalog, &a, &b) {
        Ok(comparison) if options.json => print_json(&comparison),
        Ok(comparison) => {
            let names = (scenario_name(&a, path_a), scenario_name(&b, path_b));
            print!("{}", comparison_summary(names, &comparison));
            0
        }
        Err(err) => {
            eprintln!("comparison failed: {err}");
            1
        }
    }
}

fn handle_catalog(options: &Options) -> i32 {
    let Some(catalog) = open_catalog(options) else {
        return 1;
    };
    if options.json {
        return print_json(&catalog);
    }

    let mut out = String::new();
    let presets = catalog.rules.enemy_presets.iter().map(|p| p.id.as_str());
    list(&mut out, "models", catalog.models.iter().map(|m| m.id.as_str()));
    list(&mut out, "talents", catalog.talents.iter().map(|t| t.id.as_str()));
    list(&mut out, "skills", catalog.skills.iter().map(|s| s.id.as_str()));
    list(&mut out, "modifiers", catalog.modifiers.iter().map(|m| m.id.as_str()));
    list(&mut out, "enemy presets", presets);
    print!("{out}");
    0
}

fn list<'a>(out: &mut String, label: &str, ids: impl Iterator<Item = &'a str>) {
    let ids: Vec<&str> = ids.collect();
    let _ = writeln!(out, "{label}: {}", ids.join(", "));
}

fn scenario_name<'a>(scenario: &'a Scenario, path: &'a str) -> &'a str {
    scenario.build.name.as_deref().unwrap_or(path)
}

fn fight_summary(name: &str, result: &FightResult) -> String {
    let summary = &result.summary;
    let mut out = String::new();
    let _ = writeln!(out, "{name}: {} after {:.1}s", result.outcome, result.elapsed_time);
    let _ = writeln!(
        out,
        "  hero {:.0}/{:.0} hp, enemy {:.0} hp left",
        summary.hero_health_left, summary.hero_max_health, summary.enemy_health_left
    );
    let _ = writeln!(
        out,
        "  average dps {:.1}, healed {:.0}, taken {:.0}, bursts {}",
        summary.average_dps, summary.total_healing, summary.total_incoming, summary.bursts
    );
    let _ = writeln!(out, "  fingerprint {}", result.fingerprint);
    out
}

fn chain_table(name: &str, chain: &ChainEvaluation) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{name}: {:.1} dps", chain.total_dps);
    let _ = writeln!(out, "node\tskill\tvia\trate\tavg_hit\tdps");
    for log in &chain.node_log {
        let indent = "  ".repeat(log.depth);
        let via = log
            .via
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "main".to_string());
        let _ = writeln!(
            out,
            "{}\t{indent}{}\t{via}\t{:.3}\t{:.1}\t{:.1}",
            log.node, log.skill_id, log.rate, log.average_hit, log.dps
        );
    }
    let _ = writeln!(
        out,
        "heal {:.1}/s, damage taken x{:.2}",
        chain.profile.heal_per_second, chain.profile.damage_taken_mult
    );
    out
}

fn comparison_summary(names: (&str, &str), comparison: &BuildComparison) -> String {
    let mut out = fight_summary(names.0, &comparison.a);
    out.push_str(&fight_summary(names.1, &comparison.b));
    let preferred = match comparison.preferred {
        Some(Side::A) => names.0,
        Some(Side::B) => names.1,
        None => "tie",
    };
    let _ = writeln!(out, "dps delta (b - a): {:+.1}", comparison.dps_delta);
    let _ = writeln!(out, "preferred: {preferred}");
    out
}
