//! Simulation configuration: the single input to `Simulation::new`.

use crate::error::{DomainError, DomainResult};
use crate::presets;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Threshold constants for the completion-time system tests (§4.8),
/// exposed as config per the open question in §9 rather than hard-coded.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SystemTestThresholds {
    /// `mrr > initial_users * mrr_per_user_multiple` passes the revenue
    /// test. No stated rationale upstream; kept configurable.
    pub mrr_per_user_multiple: f64,
    pub uptime_pass_pct: f64,
    pub uptime_warn_pct: f64,
    pub error_rate_pass: f64,
    pub error_rate_warn: f64,
    pub churn_pass_pct: f64,
    pub churn_warn_pct: f64,
    pub ltv_cac_pass: f64,
    pub ltv_cac_warn: f64,
    pub intervention_ratio_max: f64,
}

impl Default for SystemTestThresholds {
    fn default() -> Self {
        Self {
            mrr_per_user_multiple: 5.0,
            uptime_pass_pct: 99.5,
            uptime_warn_pct: 99.0,
            error_rate_pass: 0.01,
            error_rate_warn: 0.05,
            churn_pass_pct: 5.0,
            churn_warn_pct: 10.0,
            ltv_cac_pass: 3.0,
            ltv_cac_warn: 1.0,
            intervention_ratio_max: 0.1,
        }
    }
}

/// The single configuration object a caller provides to start a run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub period_name: String,
    pub days_to_simulate: u32,
    pub initial_users: u64,
    pub initial_releases: u32,
    pub seed_money: Decimal,
    pub enable_autonomous_systems: bool,
    pub enable_system_failures: bool,
    pub enable_market_fluctuations: bool,
    pub enable_real_time_tracking: bool,
    pub snapshot_interval_days: u32,
    pub rng_seed: Option<u64>,
    pub max_sample_size: usize,
    pub system_test_thresholds: SystemTestThresholds,
}

/// Sample-pool cap used when the config does not override it.
pub const DEFAULT_MAX_SAMPLE_SIZE: usize = 5000;

impl SimulationConfig {
    /// Build a config for a named preset, using that preset's day count.
    pub fn for_period(period_name: &str) -> DomainResult<Self> {
        let days = presets::period_days(period_name)
            .ok_or_else(|| DomainError::DependencyNotFound(period_name.to_string()))?;
        Ok(Self {
            period_name: period_name.to_string(),
            days_to_simulate: days,
            initial_users: 50_000,
            initial_releases: 1_000,
            seed_money: Decimal::new(1_000_000, 0),
            enable_autonomous_systems: true,
            enable_system_failures: true,
            enable_market_fluctuations: true,
            enable_real_time_tracking: false,
            snapshot_interval_days: 30,
            rng_seed: None,
            max_sample_size: DEFAULT_MAX_SAMPLE_SIZE,
            system_test_thresholds: SystemTestThresholds::default(),
        })
    }

    /// Validate configuration invariants that must fail fast before a run
    /// starts (§7 `ConfigInvalid`): unknown period name, negative counts,
    /// `snapshot_interval_days < 1`.
    pub fn validate(&self) -> DomainResult<()> {
        let expected_days = presets::period_days(&self.period_name)
            .ok_or_else(|| DomainError::DependencyNotFound(self.period_name.clone()))?;
        if self.days_to_simulate != expected_days {
            return Err(DomainError::NonFinite("days_to_simulate"));
        }
        if self.snapshot_interval_days < 1 {
            return Err(DomainError::NonPositiveArea("snapshot_interval_days"));
        }
        if self.seed_money < Decimal::ZERO {
            return Err(DomainError::NegativeMoney("seed_money"));
        }
        if self.max_sample_size == 0 {
            return Err(DomainError::NonPositiveArea("max_sample_size"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_period_populates_matching_day_count() {
        let cfg = SimulationConfig::for_period("1_month").unwrap();
        assert_eq!(cfg.days_to_simulate, 30);
        cfg.validate().unwrap();
    }

    #[test]
    fn unknown_period_is_rejected() {
        assert!(SimulationConfig::for_period("2_fortnights").is_err());
    }

    #[test]
    fn zero_snapshot_interval_is_invalid() {
        let mut cfg = SimulationConfig::for_period("1_year").unwrap();
        cfg.snapshot_interval_days = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn mismatched_days_to_simulate_is_invalid() {
        let mut cfg = SimulationConfig::for_period("1_year").unwrap();
        cfg.days_to_simulate = 999;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_initial_population_is_a_valid_config() {
        let mut cfg = SimulationConfig::for_period("1_month").unwrap();
        cfg.initial_users = 0;
        cfg.initial_releases = 0;
        assert!(cfg.validate().is_ok());
    }
}
