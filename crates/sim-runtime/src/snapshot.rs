//! Snapshot emission: builds a `sim_core::SimulationSnapshot` as a deep,
//! independent copy of engine state (§4.8, §9's "deep copy of snapshots"
//! redesign flag), so subsequent engine mutation can never retroactively
//! change a snapshot already appended to the run's history.

use chrono::{DateTime, Utc};
use sim_core::snapshot::SNAPSHOT_RECENT_EVENTS;
use sim_core::{MarketConditions, SimulationEvent, SimulationSnapshot, SystemMetrics};
use std::collections::BTreeMap;

/// Build a snapshot from the current engine state. `all_events` is the
/// full event log so far; only the last `SNAPSHOT_RECENT_EVENTS` are
/// cloned into the snapshot.
pub fn emit(
    period_label: &str,
    day_number: u32,
    real_now: DateTime<Utc>,
    metrics: &SystemMetrics,
    market: &MarketConditions,
    all_events: &[SimulationEvent],
    autonomous_status: &BTreeMap<String, bool>,
) -> SimulationSnapshot {
    let start = all_events.len().saturating_sub(SNAPSHOT_RECENT_EVENTS);
    let recent_events = all_events[start..].to_vec();
    SimulationSnapshot {
        period_label: period_label.to_string(),
        day_number,
        simulated_date: metrics.simulated_timestamp,
        real_timestamp: real_now,
        metrics: metrics.clone(),
        market: market.clone(),
        recent_events,
        autonomous_status: autonomous_status.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn snapshot_carries_at_most_the_last_hundred_events() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let metrics = SystemMetrics::new(date, now());
        let market = MarketConditions::default();
        let events = Vec::new();
        let status = BTreeMap::new();
        let snap = emit("1_month", 1, now(), &metrics, &market, &events, &status);
        assert!(snap.recent_events.len() <= SNAPSHOT_RECENT_EVENTS);
    }

    #[test]
    #[allow(unused_assignments)]
    fn snapshot_is_independent_of_later_mutation() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut metrics = SystemMetrics::new(date, now());
        let market = MarketConditions::default();
        let events = Vec::new();
        let status = BTreeMap::new();
        let snap = emit("1_month", 1, now(), &metrics, &market, &events, &status);
        metrics.users.total = 99_999;
        assert_eq!(snap.metrics.users.total, 0);
    }
}
