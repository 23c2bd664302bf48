//! Three-phase piecewise-exponential growth trajectory controller (§4.6).
//!
//! Produces the target population for any elapsed-day offset, then derives
//! the number of users the engine must allocate this day to stay on (or
//! catch back up to) that trajectory, plus a minimum growth floor and
//! post-churn replenishment.

use sim_core::rng::DeterministicRng;
use sim_core::{ArchetypeDistribution, TierDistribution, TierPricing};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Day at which phase 1 (50k -> 500k, 10x over two years) ends.
const PHASE1_END_DAY: f64 = 730.0;
/// Day at which phase 2 (500k -> 1.5M, 3x over one year) ends.
const PHASE2_END_DAY: f64 = 1095.0;

const INITIAL_USERS: f64 = 50_000.0;
const PHASE1_TARGET: f64 = 500_000.0;
const PHASE2_TARGET: f64 = 1_500_000.0;
/// Total addressable market the phase-3 saturating curve approaches.
const TAM: f64 = 80_000_000.0;
/// Decay constant of the phase-3 saturation term.
const PHASE3_DECAY: f64 = 0.0006;
/// Slow linear drift added on top of the saturation term in phase 3.
const PHASE3_LINEAR_DRIFT_PER_DAY: f64 = 500.0;

/// Trajectory jitter applied to each day's target (+/- 3%).
const JITTER_FRACTION: f64 = 0.03;

/// Computes the population trajectory and the daily allocation it implies.
/// Carries no mutable state; everything needed is either a pure function of
/// elapsed days or supplied by the caller (current population, RNG).
#[derive(Clone, Debug, Default)]
pub struct GrowthController;

impl GrowthController {
    pub fn new() -> Self {
        Self
    }

    /// Ideal population at `elapsed_days`, before jitter, per the
    /// three-phase piecewise-exponential law.
    pub fn target_users_at(&self, elapsed_days: f64) -> f64 {
        let day = elapsed_days.max(0.0);
        if day <= PHASE1_END_DAY {
            INITIAL_USERS * 10f64.powf(day / PHASE1_END_DAY)
        } else if day <= PHASE2_END_DAY {
            let t = day - PHASE1_END_DAY;
            PHASE1_TARGET * 3f64.powf(t / (PHASE2_END_DAY - PHASE1_END_DAY))
        } else {
            let t = day - PHASE2_END_DAY;
            let saturating = TAM - (TAM - PHASE2_TARGET) * (-PHASE3_DECAY * t).exp();
            (saturating + PHASE3_LINEAR_DRIFT_PER_DAY * t).min(TAM)
        }
    }

    /// `target_users_at` with +/-3% jitter drawn from `rng`.
    pub fn jittered_target_users_at(&self, elapsed_days: f64, rng: &mut DeterministicRng) -> f64 {
        let target = self.target_users_at(elapsed_days);
        let jitter = rng.gen_range_f64(-JITTER_FRACTION, JITTER_FRACTION);
        target * (1.0 + jitter)
    }

    /// Minimum number of new users required this day regardless of
    /// trajectory delta: `24 * max(3, ceil(0.0001 * current_users))`, the
    /// per-hour floor scaled up to a full simulated day.
    pub fn minimum_daily_growth_floor(&self, current_users: u64) -> u64 {
        let per_hour = (3u64).max((0.0001 * current_users as f64).ceil() as u64);
        per_hour * 24
    }

    /// New users to allocate today: the larger of the trajectory gap and
    /// the minimum growth floor, plus immediate replenishment of whoever
    /// churned today so net growth never falls behind the trajectory.
    pub fn users_to_add_today(
        &self,
        current_users: u64,
        elapsed_days: f64,
        churned_today: u64,
        rng: &mut DeterministicRng,
    ) -> u64 {
        let target = self.jittered_target_users_at(elapsed_days, rng);
        let trajectory_gap = (target - current_users as f64).max(0.0) as u64;
        let floor = self.minimum_daily_growth_floor(current_users);
        trajectory_gap.max(floor) + churned_today
    }

    /// Allocate `count` new users into aggregate tier/archetype buckets,
    /// crediting revenue at the tier-weighted average monthly price.
    pub fn allocate(
        &self,
        aggregate: &mut sim_core::AggregateUsers,
        count: u64,
        archetype_dist: &ArchetypeDistribution,
        tier_dist: &TierDistribution,
    ) {
        if count == 0 {
            return;
        }
        let avg_revenue = Decimal::from_f64(TierPricing::weighted_avg_revenue(tier_dist))
            .unwrap_or(Decimal::ZERO);
        aggregate.add_users_aggregate(count, tier_dist, archetype_dist, avg_revenue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::DeterministicRng;

    #[test]
    fn phase_boundaries_match_documented_multiples() {
        let ctrl = GrowthController::new();
        assert!((ctrl.target_users_at(0.0) - INITIAL_USERS).abs() < 1.0);
        assert!((ctrl.target_users_at(PHASE1_END_DAY) - PHASE1_TARGET).abs() < 1.0);
        assert!((ctrl.target_users_at(PHASE2_END_DAY) - PHASE2_TARGET).abs() < 1.0);
    }

    #[test]
    fn trajectory_is_monotonically_increasing() {
        let ctrl = GrowthController::new();
        let mut prev = ctrl.target_users_at(0.0);
        for day in (1..20_000).step_by(17) {
            let cur = ctrl.target_users_at(day as f64);
            assert!(cur >= prev, "day {day}: {cur} < {prev}");
            prev = cur;
        }
    }

    #[test]
    fn phase3_never_exceeds_tam() {
        let ctrl = GrowthController::new();
        assert!(ctrl.target_users_at(50.0 * 365.0) <= TAM);
    }

    #[test]
    fn jitter_stays_within_three_percent() {
        let ctrl = GrowthController::new();
        let mut rng = DeterministicRng::from_seed(7);
        let target = ctrl.target_users_at(1000.0);
        for _ in 0..500 {
            let jittered = ctrl.jittered_target_users_at(1000.0, &mut rng);
            let ratio = (jittered - target).abs() / target;
            assert!(ratio <= JITTER_FRACTION + 1e-9);
        }
    }

    #[test]
    fn minimum_growth_floor_scales_with_population() {
        let ctrl = GrowthController::new();
        assert_eq!(ctrl.minimum_daily_growth_floor(0), 72);
        assert!(ctrl.minimum_daily_growth_floor(10_000_000) > 72);
    }

    #[test]
    fn churn_replenishment_is_additive() {
        let ctrl = GrowthController::new();
        let mut rng_a = DeterministicRng::from_seed(1);
        let mut rng_b = DeterministicRng::from_seed(1);
        let without_churn = ctrl.users_to_add_today(500_000, 800.0, 0, &mut rng_a);
        let with_churn = ctrl.users_to_add_today(500_000, 800.0, 250, &mut rng_b);
        assert_eq!(with_churn, without_churn + 250);
    }

    #[test]
    fn allocate_credits_revenue_and_counts() {
        let ctrl = GrowthController::new();
        let mut agg = sim_core::AggregateUsers::default();
        ctrl.allocate(
            &mut agg,
            1_000,
            &ArchetypeDistribution::default(),
            &TierDistribution::default(),
        );
        assert_eq!(agg.total, 1_000);
        assert!(agg.total_revenue > Decimal::ZERO);
    }
}
