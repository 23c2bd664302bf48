use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sim_ai::events::EventGenerator;
use sim_ai::harness::{ad_booster, upgrade};
use sim_ai::ProbabilityTables;
use sim_core::ids::IdAllocator;
use sim_core::{ArchetypeDistribution, DeterministicRng};

fn bench_signup_sampling(c: &mut Criterion) {
    let tables = ProbabilityTables::from_default_yaml().unwrap();
    let gen = EventGenerator::new(tables);
    let dist = ArchetypeDistribution::default();
    let today = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let now = chrono::Utc::now();

    c.bench_function("sample 1000 signups", |b| {
        b.iter(|| {
            let mut rng = DeterministicRng::from_seed(7);
            let mut ids = IdAllocator::new();
            for i in 0..1000u64 {
                let ev = gen.sample_signup(&mut rng, &mut ids, sim_core::ids::UserId(i), today, now, &dist);
                black_box(ev);
            }
        })
    });
}

fn bench_upgrade_harness(c: &mut Criterion) {
    c.bench_function("autonomous-upgrade harness (56 scenarios)", |b| {
        b.iter(|| {
            let mut rng = DeterministicRng::from_seed(12345);
            black_box(upgrade::run(&mut rng));
        })
    });
}

fn bench_ad_booster_harness(c: &mut Criterion) {
    let scenarios = ad_booster::default_scenarios();
    c.bench_function("ad-booster harness (8 scenarios)", |b| {
        b.iter(|| black_box(ad_booster::run(&scenarios)))
    });
}

criterion_group!(benches, bench_signup_sampling, bench_upgrade_harness, bench_ad_booster_harness);
criterion_main!(benches);
