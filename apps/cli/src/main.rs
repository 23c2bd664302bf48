#![deny(warnings)]

//! Headless control surface for the simulation engine: runs a period
//! preset to completion and prints periodic status plus the final
//! Markdown report, mirroring what an HTTP control surface would expose
//! without requiring one.

use anyhow::{Context, Result};
use persistence::FileSnapshotStore;
use sim_core::SimulationConfig;
use sim_runtime::Simulation;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

struct Args {
    period: String,
    seed: Option<u64>,
    save_dir: Option<String>,
}

fn parse_args() -> Args {
    let mut period = "1_year".to_string();
    let mut seed: Option<u64> = None;
    let mut save_dir: Option<String> = None;
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--period" => period = it.next().unwrap_or(period),
            "--seed" => seed = it.next().and_then(|s| s.parse().ok()),
            "--save-dir" => save_dir = it.next(),
            _ => {}
        }
    }
    Args { period, seed, save_dir }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    info!(
        git_sha = env!("GIT_SHA"),
        build_date = env!("BUILD_DATE"),
        period = %args.period,
        seed = ?args.seed,
        "starting simulation control surface"
    );

    let mut config = SimulationConfig::for_period(&args.period)
        .with_context(|| format!("unknown period preset {:?}", args.period))?;
    config.rng_seed = args.seed;

    let snapshot_store = args
        .save_dir
        .as_ref()
        .map(|dir| -> Result<_> {
            let path = std::path::Path::new(dir).join("snapshots.log");
            let store = FileSnapshotStore::open(&path)
                .with_context(|| format!("opening snapshot store at {}", path.display()))?;
            Ok(Box::new(store) as Box<dyn persistence::SnapshotStore>)
        })
        .transpose()?;

    let mut sim = match snapshot_store {
        Some(store) => Simulation::with_collaborators(
            config,
            Box::new(sim_runtime::NullObserver),
            Box::new(sim_runtime::TracingLogger),
            Box::new(sim_runtime::SystemWallClock),
            Box::new(sim_runtime::NullEventBus),
            Some(store),
        )?,
        None => Simulation::new(config)?,
    };

    let result = sim.run()?;

    let status = sim.status();
    println!(
        "run complete | days simulated: {} | verdict: {}",
        status.current_day,
        result.verdict().label()
    );
    println!(
        "users: {} active | mrr: ${} | uptime: {:.2}%",
        result.final_metrics.users.active,
        result.final_metrics.revenue.mrr,
        result.final_metrics.platform.uptime
    );

    if let Some(report) = sim.render_report() {
        println!("\n{report}");
    }

    Ok(())
}
