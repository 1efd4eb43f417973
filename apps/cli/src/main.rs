#![deny(warnings)]

//! Headless CLI: runs a scenario for a number of calendar months, optionally
//! under the autopilot, validates invariants and reports KPIs.

use anyhow::{Context, Result};
use chrono::{Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sim_ai::Autopilot;
use sim_core::*;
use sim_runtime::GameEngine;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

/// Scenario file; every field is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct Scenario {
    start_date: Option<NaiveDate>,
    starting_money: Option<Decimal>,
    difficulty: Difficulty,
    product: Option<String>,
    seed: Option<u64>,
    months: u32,
    /// Real milliseconds per simulated frame.
    frame_ms: f64,
    game_speed: f64,
    autopilot: bool,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            start_date: None,
            starting_money: None,
            difficulty: Difficulty::default(),
            product: None,
            seed: None,
            months: 12,
            frame_ms: 1000.0 / 60.0,
            game_speed: 5.0,
            autopilot: false,
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    config: Option<String>,
    months: Option<u32>,
    seed: Option<u64>,
    product: Option<String>,
    autopilot: bool,
    json: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = it.next(),
            "--months" => args.months = it.next().and_then(|s| s.parse().ok()),
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()),
            "--product" => args.product = it.next(),
            "--autopilot" => args.autopilot = true,
            "--json" => args.json = true,
            _ => {}
        }
    }
    args
}

fn load_scenario(args: &Args) -> Result<Scenario> {
    let mut scenario = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            serde_yaml::from_str(&text).with_context(|| format!("parsing {path}"))?
        }
        None => Scenario::default(),
    };
    if let Some(m) = args.months {
        scenario.months = m;
    }
    if args.seed.is_some() {
        scenario.seed = args.seed;
    }
    if args.product.is_some() {
        scenario.product = args.product.clone();
    }
    scenario.autopilot |= args.autopilot;
    Ok(scenario)
}

fn game_config(scenario: &Scenario) -> GameConfig {
    let start = scenario.start_date.unwrap_or_else(|| Utc::now().date_naive());
    let mut config = GameConfig::new(start);
    config.difficulty = scenario.difficulty;
    config.starting_money = scenario.starting_money;
    config.selected_product_id = scenario.product.clone();
    config.rng_seed = scenario.seed;
    config
}

/// Tick at a fixed frame delta until `months` calendar months have passed or
/// the company goes bankrupt. The autopilot acts once per simulated day.
fn run(engine: &mut GameEngine, scenario: &Scenario) -> Result<u32> {
    let start = engine.state().clock.start_date;
    let end = start
        .checked_add_months(Months::new(scenario.months))
        .context("scenario runs past the calendar range")?;
    let pilot = scenario.autopilot.then(Autopilot::default);
    let mut last_day = -1;
    let mut rejected = 0u32;
    engine.set_paused(false);
    while engine.state().clock.date() < end && !engine.is_game_over() {
        let day = calendar::day_number(engine.state().clock.current_time);
        if let Some(pilot) = &pilot {
            if day != last_day {
                for action in pilot.propose(engine.state()) {
                    if let Err(err) = engine.dispatch(action.clone()) {
                        debug!(?action, %err, "autopilot action rejected");
                        rejected += 1;
                    }
                }
            }
        }
        last_day = day;
        engine.tick(scenario.frame_ms);
    }
    engine.set_paused(true);
    Ok(rejected)
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    let scenario = load_scenario(&args)?;
    info!(version = env!("GIT_SHA"), ?scenario, "starting CLI");

    let mut engine = GameEngine::new(&game_config(&scenario));
    engine.set_game_speed(scenario.game_speed)?;
    let rejected = run(&mut engine, &scenario)?;

    let state = engine.state();
    validate_state(state)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(state)?);
        return Ok(());
    }
    println!(
        "World OK | date: {} | employees: {} | features: {} | offices: {} | rounds: {}",
        state.clock.date(),
        state.team.employees.len(),
        state.product.features.len(),
        state.offices.offices.len(),
        state.funding.rounds.len()
    );
    println!(
        "KPI | days: {:.0} | cash: ${} | revenue: ${}/mo | burn: ${}/mo | customers: {} | progress: {:.1}% | milestone: {} | equity: {}% | valuation: ${}",
        state.clock.current_time,
        state.treasury.money.round(),
        state.treasury.monthly_revenue,
        state.treasury.burn_rate,
        state.customers.total_customers,
        state.product.overall_progress,
        state.product.current_milestone,
        state.funding.total_equity,
        engine.company_valuation().round()
    );
    if let Some(reason) = state.game_over {
        println!("Game over | reason: {reason}");
    }
    if scenario.autopilot {
        println!("Autopilot | rejected actions: {rejected}");
    }

    Ok(())
}
