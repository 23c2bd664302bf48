//! Aggregated, per-snapshot business and platform metrics.

use crate::aggregate::{ArchetypeCounts, TierCounts};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UsersMetrics {
    pub total: u64,
    pub active: u64,
    pub new_today: u64,
    pub churned_today: u64,
    pub by_tier: TierCounts,
    pub by_archetype: ArchetypeCounts,
}

impl Default for UsersMetrics {
    fn default() -> Self {
        Self {
            total: 0,
            active: 0,
            new_today: 0,
            churned_today: 0,
            by_tier: TierCounts::default(),
            by_archetype: ArchetypeCounts::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RevenueMetrics {
    pub daily: Decimal,
    pub monthly: Decimal,
    pub yearly: Decimal,
    pub lifetime: Decimal,
    pub mrr: Decimal,
    pub arr: Decimal,
}

impl Default for RevenueMetrics {
    fn default() -> Self {
        Self {
            daily: Decimal::ZERO,
            monthly: Decimal::ZERO,
            yearly: Decimal::ZERO,
            lifetime: Decimal::ZERO,
            mrr: Decimal::ZERO,
            arr: Decimal::ZERO,
        }
    }
}

impl RevenueMetrics {
    /// Invariant I4/I7: `arr == mrr * 12` at every snapshot.
    pub fn recompute_arr(&mut self) {
        self.arr = self.mrr * Decimal::from(12);
    }

    pub fn arr_matches_mrr(&self) -> bool {
        self.arr == self.mrr * Decimal::from(12)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StreamsMetrics {
    pub daily: u64,
    pub monthly: u64,
    pub total: u64,
    pub avg_per_release: f64,
    pub viral_releases: u64,
    pub total_releases: u64,
}

impl Default for StreamsMetrics {
    fn default() -> Self {
        Self {
            daily: 0,
            monthly: 0,
            total: 0,
            avg_per_release: 0.0,
            viral_releases: 0,
            total_releases: 0,
        }
    }
}

impl StreamsMetrics {
    /// Invariant I5: `avg_per_release * releases == total` when
    /// `releases > 0`, else `avg_per_release == 0`.
    pub fn recompute_avg(&mut self) {
        self.avg_per_release = if self.total_releases > 0 {
            self.total as f64 / self.total_releases as f64
        } else {
            0.0
        };
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SocialMetrics {
    pub posts_today: u64,
    pub engagement_rate: f64,
    pub total_followers: u64,
    pub viral_posts: u64,
}

impl Default for SocialMetrics {
    fn default() -> Self {
        Self {
            posts_today: 0,
            engagement_rate: 0.0,
            total_followers: 0,
            viral_posts: 0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlatformMetrics {
    pub uptime: f64,
    pub response_time_ms: f64,
    pub error_rate: f64,
    pub active_workflows: u64,
    pub queue_backlog: u64,
}

impl Default for PlatformMetrics {
    fn default() -> Self {
        Self {
            uptime: 100.0,
            response_time_ms: 120.0,
            error_rate: 0.0,
            active_workflows: 0,
            queue_backlog: 0,
        }
    }
}

impl PlatformMetrics {
    /// Invariant I6.
    pub fn within_bounds(&self) -> bool {
        (0.0..=100.0).contains(&self.uptime) && (0.0..=1.0).contains(&self.error_rate)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AutonomousMetrics {
    pub auto_published_posts: u64,
    pub auto_launched_campaigns: u64,
    pub auto_distributed_releases: u64,
    pub decisions_auto_made: u64,
    pub interventions_required: u64,
}

impl Default for AutonomousMetrics {
    fn default() -> Self {
        Self {
            auto_published_posts: 0,
            auto_launched_campaigns: 0,
            auto_distributed_releases: 0,
            decisions_auto_made: 0,
            interventions_required: 0,
        }
    }
}

/// Full snapshot of business and platform health at a point in simulated
/// time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub users: UsersMetrics,
    pub revenue: RevenueMetrics,
    pub streams: StreamsMetrics,
    pub social: SocialMetrics,
    pub platform: PlatformMetrics,
    pub autonomous: AutonomousMetrics,
    pub real_timestamp: DateTime<Utc>,
    pub simulated_timestamp: NaiveDate,
}

impl SystemMetrics {
    pub fn new(start_date: NaiveDate, real_now: DateTime<Utc>) -> Self {
        Self {
            users: UsersMetrics::default(),
            revenue: RevenueMetrics::default(),
            streams: StreamsMetrics::default(),
            social: SocialMetrics::default(),
            platform: PlatformMetrics::default(),
            autonomous: AutonomousMetrics::default(),
            real_timestamp: real_now,
            simulated_timestamp: start_date,
        }
    }

    /// Reset the per-day counters at the start of a day step (§4.7 step 1).
    pub fn reset_daily_counters(&mut self) {
        self.users.new_today = 0;
        self.users.churned_today = 0;
        self.streams.daily = 0;
        self.revenue.daily = Decimal::ZERO;
        self.social.posts_today = 0;
    }

    /// Check all quantified snapshot-level invariants (I1, I2, I4-I6).
    pub fn invariants_hold(&self) -> bool {
        self.users.by_tier.sum() == self.users.total
            && self.users.by_archetype.sum() == self.users.total
            && self.revenue.arr_matches_mrr()
            && self.platform.within_bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn fresh_metrics_satisfy_invariants() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let metrics = SystemMetrics::new(date, now());
        assert!(metrics.invariants_hold());
    }

    #[test]
    fn arr_recompute_matches_mrr_times_twelve() {
        let mut rev = RevenueMetrics::default();
        rev.mrr = Decimal::new(1000, 0);
        rev.recompute_arr();
        assert_eq!(rev.arr, Decimal::new(12000, 0));
        assert!(rev.arr_matches_mrr());
    }

    #[test]
    fn streams_avg_zero_when_no_releases() {
        let mut s = StreamsMetrics::default();
        s.total = 500;
        s.total_releases = 0;
        s.recompute_avg();
        assert_eq!(s.avg_per_release, 0.0);
    }

    #[test]
    fn streams_avg_matches_total_over_releases() {
        let mut s = StreamsMetrics::default();
        s.total = 1000;
        s.total_releases = 4;
        s.recompute_avg();
        assert_eq!(s.avg_per_release, 250.0);
    }

    #[test]
    fn reset_daily_counters_clears_only_daily_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut metrics = SystemMetrics::new(date, now());
        metrics.users.total = 1000;
        metrics.users.new_today = 50;
        metrics.revenue.daily = Decimal::new(500, 0);
        metrics.reset_daily_counters();
        assert_eq!(metrics.users.new_today, 0);
        assert_eq!(metrics.revenue.daily, Decimal::ZERO);
        assert_eq!(metrics.users.total, 1000);
    }
}
