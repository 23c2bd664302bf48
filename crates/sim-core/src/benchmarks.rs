//! Static industry-benchmark constants. These do not drive computation;
//! they are surfaced to reports for context.

use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct IndustryBenchmarks {
    pub total_addressable_market: u64,
    pub monthly_price_usd: f64,
    pub yearly_price_usd: f64,
    pub lifetime_price_usd: f64,
    pub streaming_rpm_usd: f64,
    pub target_monthly_churn_pct: f64,
    pub target_signup_conversion_pct: f64,
    pub revenue_milestones_usd: Vec<u64>,
}

/// Default benchmark constants exposed via the control surface's
/// `/benchmarks` endpoint equivalent.
pub fn default_benchmarks() -> IndustryBenchmarks {
    IndustryBenchmarks {
        total_addressable_market: 80_000_000,
        monthly_price_usd: 49.0,
        yearly_price_usd: 39.0,
        lifetime_price_usd: 699.0,
        streaming_rpm_usd: 3.5,
        target_monthly_churn_pct: 5.0,
        target_signup_conversion_pct: 2.5,
        revenue_milestones_usd: vec![1_000_000, 10_000_000, 100_000_000, 1_000_000_000],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn benchmarks_are_positive() {
        let b = default_benchmarks();
        assert!(b.total_addressable_market > 0);
        assert!(b.monthly_price_usd > 0.0);
        assert!(!b.revenue_milestones_usd.is_empty());
    }
}
