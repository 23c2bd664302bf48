use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sim_core::SimulationConfig;
use sim_runtime::Simulation;

fn config(period: &str, initial_users: u64) -> SimulationConfig {
    let mut cfg = SimulationConfig::for_period(period).unwrap();
    cfg.initial_users = initial_users;
    cfg.initial_releases = (initial_users / 20).max(1) as u32;
    cfg.rng_seed = Some(42);
    cfg
}

fn bench_runs(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_run");
    for &(period, users) in &[("1_month", 1_000u64), ("1_year", 10_000u64)] {
        group.bench_with_input(BenchmarkId::from_parameter(period), &users, |b, &users| {
            b.iter(|| {
                let mut sim = Simulation::new(config(period, users)).unwrap();
                sim.run().unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_runs);
criterion_main!(benches);
