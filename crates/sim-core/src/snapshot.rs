//! Point-in-time snapshots and the final run result.

use crate::config::SimulationConfig;
use crate::events::SimulationEvent;
use crate::market::MarketConditions;
use crate::metrics::SystemMetrics;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Maximum number of recent events carried in a snapshot (§4.8).
pub const SNAPSHOT_RECENT_EVENTS: usize = 100;

/// A value-copy snapshot of engine state at one point in simulated time.
/// Once appended to the engine's snapshot list it is never mutated again
/// (invariant I6 / the "deep copy of snapshots" redesign flag): every
/// field here is an owned copy, not a reference into live engine state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub period_label: String,
    pub day_number: u32,
    pub simulated_date: NaiveDate,
    pub real_timestamp: DateTime<Utc>,
    pub metrics: SystemMetrics,
    pub market: MarketConditions,
    pub recent_events: Vec<SimulationEvent>,
    pub autonomous_status: BTreeMap<String, bool>,
}

/// KPIs derived once a run completes (§4.8).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KpiBlock {
    pub user_growth_rate: f64,
    pub revenue_growth_rate: f64,
    pub churn_rate: f64,
    pub ltv: f64,
    pub cac: f64,
    pub viral_coefficient: f64,
    pub nps: f64,
    pub system_uptime: f64,
    pub autonomous_efficiency: f64,
}

/// Pass/fail tally for the seven completion-time system tests (§4.8).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SystemTestResults {
    pub passed: u32,
    pub failed: u32,
    pub warnings: u32,
    pub critical_issues: Vec<String>,
}

/// Verdict derived from `SystemTestResults`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    AllTestsPassed,
    WarningsDetected,
    CriticalIssuesFound,
}

impl Verdict {
    pub fn from_results(results: &SystemTestResults) -> Verdict {
        if results.failed > 0 || !results.critical_issues.is_empty() {
            Verdict::CriticalIssuesFound
        } else if results.warnings > 0 {
            Verdict::WarningsDetected
        } else {
            Verdict::AllTestsPassed
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::AllTestsPassed => "\u{2705} ALL TESTS PASSED",
            Verdict::WarningsDetected => "\u{26A0}\u{FE0F} WARNINGS DETECTED",
            Verdict::CriticalIssuesFound => "\u{274C} CRITICAL ISSUES FOUND",
        }
    }
}

/// The final output of a completed (or stopped) run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationResult {
    pub config: SimulationConfig,
    pub start_real: DateTime<Utc>,
    pub end_real: DateTime<Utc>,
    pub real_duration: Duration,
    pub simulated_duration_days: u32,
    pub final_metrics: SystemMetrics,
    pub snapshots: Vec<SimulationSnapshot>,
    pub events: Vec<SimulationEvent>,
    pub kpis: KpiBlock,
    pub system_tests: SystemTestResults,
    pub recommendations: Vec<String>,
}

impl SimulationResult {
    pub fn verdict(&self) -> Verdict {
        Verdict::from_results(&self.system_tests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_escalates_from_pass_to_critical() {
        let mut results = SystemTestResults::default();
        results.passed = 7;
        assert_eq!(Verdict::from_results(&results), Verdict::AllTestsPassed);

        results.warnings = 1;
        assert_eq!(Verdict::from_results(&results), Verdict::WarningsDetected);

        results.failed = 1;
        results.critical_issues.push("uptime below 99%".to_string());
        assert_eq!(Verdict::from_results(&results), Verdict::CriticalIssuesFound);
    }
}
