//! Bounded sample pool plus cohort counters (§4.3): at most `max_sample_size`
//! fully materialized `SimulatedUser` objects, with the remainder of the
//! population tracked only as aggregate counts.

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use sim_core::ids::{IdAllocator, UserId};
use sim_core::{
    AggregateUsers, ArchetypeCounts, ArchetypeDistribution, DeterministicRng, SubscriptionTier,
    TierCounts, TierDistribution, TierPricing, UserArchetype,
};
use std::collections::BTreeMap;

/// Pool users go stale (inactive) if not refreshed within this window.
const ACTIVE_WINDOW_DAYS: i64 = 7;
/// Sample-pool churn removes at most this many objects per day, for
/// freshness, independent of the aggregate decrement.
const MAX_POOL_CHURN_PER_DAY: usize = 10;

/// Owns the bounded sample pool and the aggregate cohort counters that
/// together represent the full population in O(1) memory (I8).
#[derive(Clone, Debug)]
pub struct PopulationStore {
    pub sample_pool: BTreeMap<UserId, sim_core::SimulatedUser>,
    pub aggregate: AggregateUsers,
    pub max_sample_size: usize,
}

impl PopulationStore {
    pub fn new(max_sample_size: usize) -> Self {
        Self {
            sample_pool: BTreeMap::new(),
            aggregate: AggregateUsers::default(),
            max_sample_size,
        }
    }

    pub fn total(&self) -> u64 {
        self.sample_pool.len() as u64 + self.aggregate.total
    }

    pub fn sample_pool_len(&self) -> usize {
        self.sample_pool.len()
    }

    pub fn active_count(&self, today: NaiveDate) -> u64 {
        self.sample_pool
            .values()
            .filter(|u| (today - u.last_active_at).num_days() <= ACTIVE_WINDOW_DAYS)
            .count() as u64
    }

    pub fn total_followers(&self) -> u64 {
        let pool: u64 = self.sample_pool.values().map(|u| u.total_followers).sum();
        pool + self.aggregate.total_followers
    }

    /// Per-tier counts across the whole population: the aggregate cohort
    /// counters plus one tally per materialized sample-pool user. Needed
    /// because `aggregate.by_tier` alone only covers users that overflowed
    /// the sample pool (I1).
    pub fn tier_counts(&self) -> TierCounts {
        let mut counts = self.aggregate.by_tier;
        for user in self.sample_pool.values() {
            match user.tier {
                SubscriptionTier::Monthly => counts.monthly += 1,
                SubscriptionTier::Yearly => counts.yearly += 1,
                SubscriptionTier::Lifetime => counts.lifetime += 1,
            }
        }
        counts
    }

    /// Per-archetype counts across the whole population, same composition
    /// as `tier_counts` (I2).
    pub fn archetype_counts(&self) -> ArchetypeCounts {
        let mut counts = self.aggregate.by_archetype;
        for user in self.sample_pool.values() {
            match user.archetype {
                UserArchetype::Hobbyist => counts.hobbyist += 1,
                UserArchetype::EmergingArtist => counts.emerging_artist += 1,
                UserArchetype::EstablishedArtist => counts.established_artist += 1,
                UserArchetype::Label => counts.label += 1,
                UserArchetype::Enterprise => counts.enterprise += 1,
            }
        }
        counts
    }

    /// Materialize as many of `count` new users into the sample pool as
    /// capacity allows; the remainder is represented as aggregate cohort
    /// growth only. Credits revenue on the aggregate share the same way
    /// `AggregateUsers::add_users_aggregate` does.
    pub fn add_users(
        &mut self,
        count: u64,
        archetype_dist: &ArchetypeDistribution,
        today: NaiveDate,
        ids: &mut IdAllocator,
        rng: &mut DeterministicRng,
    ) {
        let capacity_left = self.max_sample_size.saturating_sub(self.sample_pool.len());
        let to_materialize = count.min(capacity_left as u64);
        let to_aggregate = count - to_materialize;

        for _ in 0..to_materialize {
            let archetype =
                *rng.weighted_choice(&UserArchetype::ALL, &archetype_dist.weights_in_order());
            let tier_dist = TierDistribution::for_archetype(archetype);
            let tier = *rng.weighted_choice(&SubscriptionTier::ALL, &tier_dist.weights_in_order());
            let monthly_price = TierPricing::monthly_price(tier);
            let monthly_revenue = Decimal::from_f64(monthly_price).unwrap_or(Decimal::ZERO);
            let id = UserId(ids.next());
            let user = sim_core::SimulatedUser {
                id,
                archetype,
                tier,
                monthly_revenue,
                total_streams: 0,
                total_releases: 0,
                total_followers: 0,
                engagement_rate: rng.next_f32(),
                viral_potential: 0.0,
                churn_risk: rng.next_f32() * 0.3,
                last_active_at: today,
                lifetime_value: monthly_revenue * Decimal::from(12),
                created_at: today,
            };
            self.sample_pool.insert(id, user);
        }

        if to_aggregate > 0 {
            let tier_dist = TierDistribution::default();
            let avg_revenue =
                Decimal::from_f64(TierPricing::weighted_avg_revenue(&tier_dist)).unwrap_or(Decimal::ZERO);
            self.aggregate
                .add_users_aggregate(to_aggregate, &tier_dist, archetype_dist, avg_revenue);
        }
    }

    /// Remove `count` churned users: up to `MAX_POOL_CHURN_PER_DAY` pool
    /// objects are dropped outright for freshness, the remainder is
    /// decremented from the aggregate counters proportionally (§4.3).
    pub fn remove_users(&mut self, count: u64) {
        let pool_removals = self.sample_pool.len().min(MAX_POOL_CHURN_PER_DAY);
        let victims: Vec<UserId> = self.sample_pool.keys().copied().take(pool_removals).collect();
        for id in victims {
            self.sample_pool.remove(&id);
        }
        let remaining = count.saturating_sub(pool_removals as u64);
        self.aggregate.remove_users(remaining);
    }

    /// Upgrade up to `expected_count` non-lifetime pool users one tier
    /// (monthly -> yearly -> lifetime). Returns the number upgraded and
    /// the total MRR delta.
    pub fn upgrade_users(&mut self, expected_count: u64, rng: &mut DeterministicRng) -> (u64, Decimal) {
        let candidates: Vec<UserId> = self
            .sample_pool
            .iter()
            .filter(|(_, u)| u.tier != SubscriptionTier::Lifetime)
            .map(|(id, _)| *id)
            .collect();
        if candidates.is_empty() {
            return (0, Decimal::ZERO);
        }
        let mut upgraded = 0u64;
        let mut mrr_delta = Decimal::ZERO;
        for _ in 0..expected_count {
            let idx = rng.gen_range_u64(0, candidates.len() as u64) as usize;
            let id = candidates[idx];
            if let Some(user) = self.sample_pool.get_mut(&id) {
                if let Some(new_tier) = user.tier.upgraded() {
                    let old_price = TierPricing::monthly_price(user.tier);
                    let new_price = TierPricing::monthly_price(new_tier);
                    user.tier = new_tier;
                    user.monthly_revenue = Decimal::from_f64(new_price).unwrap_or(user.monthly_revenue);
                    mrr_delta += Decimal::from_f64(new_price - old_price).unwrap_or(Decimal::ZERO);
                    upgraded += 1;
                }
            }
        }
        (upgraded, mrr_delta)
    }

    /// Refresh roughly 30% of pool users' `last_active_at` to `today`.
    pub fn refresh_activity(&mut self, today: NaiveDate, rng: &mut DeterministicRng) {
        for user in self.sample_pool.values_mut() {
            if rng.gen_bool(0.30) {
                user.last_active_at = today;
            }
        }
    }
}
