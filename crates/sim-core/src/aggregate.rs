//! Cohort counters representing the portion of the population not
//! materialized as sample-pool `SimulatedUser` objects (§4.3).

use crate::distribution::{ArchetypeDistribution, TierDistribution};
use crate::types::{SubscriptionTier, UserArchetype};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-tier counts. There is no `free` field: the no-free-tier invariant
/// (I3) is structurally true rather than runtime-checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub monthly: u64,
    pub yearly: u64,
    pub lifetime: u64,
}

impl TierCounts {
    pub fn sum(&self) -> u64 {
        self.monthly + self.yearly + self.lifetime
    }

    pub fn get(&self, tier: SubscriptionTier) -> u64 {
        match tier {
            SubscriptionTier::Monthly => self.monthly,
            SubscriptionTier::Yearly => self.yearly,
            SubscriptionTier::Lifetime => self.lifetime,
        }
    }

    fn get_mut(&mut self, tier: SubscriptionTier) -> &mut u64 {
        match tier {
            SubscriptionTier::Monthly => &mut self.monthly,
            SubscriptionTier::Yearly => &mut self.yearly,
            SubscriptionTier::Lifetime => &mut self.lifetime,
        }
    }
}

/// Per-archetype counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchetypeCounts {
    pub hobbyist: u64,
    pub emerging_artist: u64,
    pub established_artist: u64,
    pub label: u64,
    pub enterprise: u64,
}

impl ArchetypeCounts {
    pub fn sum(&self) -> u64 {
        self.hobbyist + self.emerging_artist + self.established_artist + self.label + self.enterprise
    }

    pub fn get(&self, archetype: UserArchetype) -> u64 {
        match archetype {
            UserArchetype::Hobbyist => self.hobbyist,
            UserArchetype::EmergingArtist => self.emerging_artist,
            UserArchetype::EstablishedArtist => self.established_artist,
            UserArchetype::Label => self.label,
            UserArchetype::Enterprise => self.enterprise,
        }
    }

    fn get_mut(&mut self, archetype: UserArchetype) -> &mut u64 {
        match archetype {
            UserArchetype::Hobbyist => &mut self.hobbyist,
            UserArchetype::EmergingArtist => &mut self.emerging_artist,
            UserArchetype::EstablishedArtist => &mut self.established_artist,
            UserArchetype::Label => &mut self.label,
            UserArchetype::Enterprise => &mut self.enterprise,
        }
    }
}

/// Aggregate population counters: totals, per-tier and per-archetype
/// breakdowns, and rolling revenue/streams/followers statistics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AggregateUsers {
    pub total: u64,
    pub by_tier: TierCounts,
    pub by_archetype: ArchetypeCounts,
    pub total_revenue: Decimal,
    pub avg_revenue: Decimal,
    pub total_streams: u64,
    pub avg_streams: f64,
    pub total_followers: u64,
    pub avg_followers: f64,
}

impl Default for AggregateUsers {
    fn default() -> Self {
        Self {
            total: 0,
            by_tier: TierCounts::default(),
            by_archetype: ArchetypeCounts::default(),
            total_revenue: Decimal::ZERO,
            avg_revenue: Decimal::ZERO,
            total_streams: 0,
            avg_streams: 0.0,
            total_followers: 0,
            avg_followers: 0.0,
        }
    }
}

/// Largest-remainder apportionment: splits `total_count` across buckets
/// weighted by `shares` so the returned counts sum to exactly
/// `total_count`, rather than leaving a flooring remainder unassigned.
/// Buckets with the largest fractional remainder receive the leftover
/// units one at a time, ties broken by bucket order.
fn apportion(total_count: u64, shares: &[f64]) -> Vec<u64> {
    let mut floors = vec![0u64; shares.len()];
    let mut remainders = vec![0.0f64; shares.len()];
    let mut allocated = 0u64;
    for (i, &share) in shares.iter().enumerate() {
        let exact = total_count as f64 * share;
        let floor = exact.floor();
        floors[i] = floor as u64;
        remainders[i] = exact - floor;
        allocated += floors[i];
    }
    let mut leftover = total_count.saturating_sub(allocated);
    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|&a, &b| remainders[b].partial_cmp(&remainders[a]).unwrap_or(std::cmp::Ordering::Equal));
    for i in order {
        if leftover == 0 {
            break;
        }
        floors[i] += 1;
        leftover -= 1;
    }
    floors
}

impl AggregateUsers {
    /// Add `count` new users distributed per `tier_dist`/`archetype_dist`,
    /// crediting `count * avg_revenue` to total revenue. Buckets are
    /// apportioned by largest remainder so `by_tier.sum()` and
    /// `by_archetype.sum()` land exactly on the new `total` (I1/I2), not
    /// just within a few units of it.
    pub fn add_users_aggregate(
        &mut self,
        count: u64,
        tier_dist: &TierDistribution,
        archetype_dist: &ArchetypeDistribution,
        avg_revenue_per_user: Decimal,
    ) {
        self.total += count;
        let tier_shares: Vec<f64> = SubscriptionTier::ALL.iter().map(|&t| tier_dist.weight(t)).collect();
        for (tier, n) in SubscriptionTier::ALL.iter().zip(apportion(count, &tier_shares)) {
            *self.by_tier.get_mut(*tier) += n;
        }
        let archetype_shares: Vec<f64> = UserArchetype::ALL.iter().map(|&a| archetype_dist.weight(a)).collect();
        for (archetype, n) in UserArchetype::ALL.iter().zip(apportion(count, &archetype_shares)) {
            *self.by_archetype.get_mut(*archetype) += n;
        }
        self.total_revenue += avg_revenue_per_user * Decimal::from(count);
        self.refresh_avg_revenue();
    }

    /// Remove `count` users, distributing churn proportionally across
    /// tiers and archetypes based on the *pre-churn* share of each bucket,
    /// apportioned by largest remainder so the buckets stay exactly
    /// consistent with `total` after every call (I1/I2).
    pub fn remove_users(&mut self, count: u64) {
        if count == 0 || self.total == 0 {
            return;
        }
        let count = count.min(self.total);
        let pre_total = self.total as f64;
        let tier_shares: Vec<f64> = SubscriptionTier::ALL
            .iter()
            .map(|&t| self.by_tier.get(t) as f64 / pre_total)
            .collect();
        for (tier, dec) in SubscriptionTier::ALL.iter().zip(apportion(count, &tier_shares)) {
            let cur = self.by_tier.get_mut(*tier);
            *cur = cur.saturating_sub(dec);
        }
        let archetype_shares: Vec<f64> = UserArchetype::ALL
            .iter()
            .map(|&a| self.by_archetype.get(a) as f64 / pre_total)
            .collect();
        for (archetype, dec) in UserArchetype::ALL.iter().zip(apportion(count, &archetype_shares)) {
            let cur = self.by_archetype.get_mut(*archetype);
            *cur = cur.saturating_sub(dec);
        }
        self.total = self.total.saturating_sub(count);
        self.refresh_avg_revenue();
    }

    fn refresh_avg_revenue(&mut self) {
        if self.total == 0 {
            self.avg_revenue = Decimal::ZERO;
        } else {
            self.avg_revenue = self.total_revenue / Decimal::from(self.total);
        }
    }

    /// Invariant I1: per-tier counts sum to the total.
    pub fn tier_counts_consistent(&self) -> bool {
        self.by_tier.sum() == self.total
    }

    /// Invariant I2: per-archetype counts sum to the total.
    pub fn archetype_counts_consistent(&self) -> bool {
        self.by_archetype.sum() == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_remove_keeps_counts_bounded_by_total() {
        let mut agg = AggregateUsers::default();
        let tier_dist = TierDistribution::default();
        let archetype_dist = ArchetypeDistribution::default();
        agg.add_users_aggregate(100_000, &tier_dist, &archetype_dist, Decimal::new(50, 0));
        assert!(agg.tier_counts_consistent());
        assert!(agg.archetype_counts_consistent());
        assert_eq!(agg.total, 100_000);
        assert!(agg.total_revenue > Decimal::ZERO);

        agg.remove_users(10_000);
        assert_eq!(agg.total, 90_000);
        assert!(agg.tier_counts_consistent());
        assert!(agg.archetype_counts_consistent());
    }

    #[test]
    fn remove_users_never_underflows() {
        let mut agg = AggregateUsers::default();
        agg.add_users_aggregate(
            5,
            &TierDistribution::default(),
            &ArchetypeDistribution::default(),
            Decimal::new(50, 0),
        );
        agg.remove_users(1_000_000);
        assert_eq!(agg.total, 0);
        assert_eq!(agg.by_tier.sum(), 0);
        assert_eq!(agg.by_archetype.sum(), 0);
    }

    #[test]
    fn no_free_tier_bucket_exists() {
        // Structural: TierCounts has exactly monthly/yearly/lifetime fields.
        let counts = TierCounts {
            monthly: 1,
            yearly: 2,
            lifetime: 3,
        };
        assert_eq!(counts.sum(), 6);
    }

    #[test]
    fn avg_revenue_refreshes_on_mutation() {
        let mut agg = AggregateUsers::default();
        agg.add_users_aggregate(
            10,
            &TierDistribution::default(),
            &ArchetypeDistribution::default(),
            Decimal::new(100, 0),
        );
        assert_eq!(agg.avg_revenue, Decimal::new(100, 0));
    }
}
