//! End-to-end scenarios exercising the full `Simulation::run()` path
//! across crate boundaries, mirroring the concrete scenarios a
//! control-surface smoke test would drive against the engine.

use rust_decimal::Decimal;
use sim_core::{EventPayload, SimulationConfig};
use sim_runtime::Simulation;

fn run(config: SimulationConfig) -> sim_core::SimulationResult {
    Simulation::new(config).unwrap().run().unwrap()
}

#[test]
fn one_month_small_cohort_passes_every_system_test() {
    let mut cfg = SimulationConfig::for_period("1_month").unwrap();
    cfg.initial_users = 100;
    cfg.initial_releases = 50;
    cfg.seed_money = Decimal::new(10_000, 0);
    cfg.snapshot_interval_days = 1;
    cfg.rng_seed = Some(12345);

    let result = run(cfg);

    assert_eq!(result.snapshots.len(), 32, "30 daily snapshots plus initial plus final");
    assert!(
        (300..=1200).contains(&result.final_metrics.users.total),
        "users.total {} outside the trajectory+churn band",
        result.final_metrics.users.total
    );
    assert!(result.final_metrics.revenue.mrr > Decimal::ZERO);
    assert_eq!(result.system_tests.failed, 0);
    assert_eq!(result.verdict(), sim_core::Verdict::AllTestsPassed);
}

#[test]
fn one_year_with_system_failures_logs_incidents_and_stays_mostly_up() {
    let mut cfg = SimulationConfig::for_period("1_year").unwrap();
    cfg.initial_users = 10_000;
    cfg.initial_releases = 200;
    cfg.enable_system_failures = true;
    cfg.rng_seed = Some(12345);

    let result = run(cfg);

    let system_events = result
        .events
        .iter()
        .filter(|e| matches!(e.payload, EventPayload::SystemEvent(_)))
        .count();
    assert!(system_events >= 1, "expected at least one system_* event over a year");
    assert!(result.final_metrics.platform.uptime >= 99.0);
    assert!(result.final_metrics.autonomous.interventions_required >= 1);
}

#[test]
fn three_year_run_lands_near_the_year_two_trajectory_target() {
    let mut cfg = SimulationConfig::for_period("3_years").unwrap();
    cfg.initial_users = 1_000;
    cfg.initial_releases = 100;
    cfg.snapshot_interval_days = 1;
    cfg.rng_seed = Some(12345);

    let result = run(cfg);

    let day_730 = result
        .snapshots
        .iter()
        .find(|s| s.day_number == 730)
        .expect("a snapshot at day 730 since snapshot_interval_days is 1");
    let total = day_730.metrics.users.total;
    assert!(
        (450_000..=550_000).contains(&total),
        "day-730 users.total {total} outside the +-10% band around 500,000"
    );
}

#[test]
fn tier_and_archetype_counts_exactly_match_total_under_default_sample_cap() {
    let mut cfg = SimulationConfig::for_period("1_month").unwrap();
    cfg.initial_users = 800;
    cfg.initial_releases = 50;
    cfg.rng_seed = Some(12345);

    let result = run(cfg);

    let users = &result.final_metrics.users;
    assert_eq!(users.by_tier.sum(), users.total);
    assert_eq!(users.by_archetype.sum(), users.total);
    assert!(result.final_metrics.invariants_hold());
}

#[test]
fn tier_and_archetype_counts_exactly_match_total_once_population_overflows_sample_pool() {
    let mut cfg = SimulationConfig::for_period("1_year").unwrap();
    cfg.initial_users = 10_000;
    cfg.initial_releases = 200;
    cfg.rng_seed = Some(12345);

    let result = run(cfg);

    let users = &result.final_metrics.users;
    assert_eq!(users.by_tier.sum(), users.total);
    assert_eq!(users.by_archetype.sum(), users.total);
    assert!(result.final_metrics.invariants_hold());
}

#[test]
fn six_month_runs_are_reproducible_under_the_same_seed() {
    let config = || {
        let mut cfg = SimulationConfig::for_period("6_months").unwrap();
        cfg.initial_users = 5_000;
        cfg.initial_releases = 300;
        cfg.rng_seed = Some(42);
        cfg
    };

    let a = run(config());
    let b = run(config());

    assert_eq!(a.final_metrics.users.total, b.final_metrics.users.total);
    assert_eq!(a.final_metrics.revenue.mrr, b.final_metrics.revenue.mrr);
    assert_eq!(a.snapshots.len(), b.snapshots.len());
    assert_eq!(a.events.len(), b.events.len());
    for (ea, eb) in a.events.iter().zip(b.events.iter()) {
        assert_eq!(ea.id, eb.id);
    }
}
