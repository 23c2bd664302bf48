//! Narrow collaborator traits the engine consumes, all optional (§6). The
//! default implementations are what `Simulation::new` wires in when the
//! caller supplies none: `tracing` for logging, `SystemTime::now` for wall
//! time, and a no-op event bus.

use sim_core::SimulationEvent;
use std::time::SystemTime;

/// Thin wrapper over `tracing` so call sites don't need the macro-based API
/// directly and a test double can be substituted.
pub trait Logger {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
    fn debug(&self, msg: &str);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }
    fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }
    fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }
    fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }
}

/// Real wall-clock time, used only to stamp `SimulationResult`'s
/// real-duration fields; never consulted for simulated-time correctness.
pub trait WallClock {
    fn now(&self) -> SystemTime;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Accepts typed events for live observers outside the engine (e.g. a
/// future HTTP layer's websocket fan-out). A no-op default and an
/// in-memory test double are provided.
pub trait EventBus {
    fn publish(&mut self, event: &SimulationEvent);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn publish(&mut self, _event: &SimulationEvent) {}
}

/// In-memory test double that records every published event's type string.
#[derive(Clone, Debug, Default)]
pub struct RecordingEventBus {
    pub published_types: Vec<String>,
}

impl EventBus for RecordingEventBus {
    fn publish(&mut self, event: &SimulationEvent) {
        self.published_types.push(event.type_str().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use sim_core::events::{EventCategory, EventPayload, ImpactLevel, SignupPayload, SignupSource};
    use sim_core::ids::{EventId, UserId};
    use sim_core::{SimulationEvent, SubscriptionTier, UserArchetype};

    fn sample_event() -> SimulationEvent {
        SimulationEvent {
            id: EventId(1),
            category: EventCategory::User,
            real_timestamp: Utc::now(),
            simulated_timestamp: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            payload: EventPayload::UserSignup(SignupPayload {
                user_id: UserId(1),
                archetype: UserArchetype::Hobbyist,
                tier: SubscriptionTier::Monthly,
                source: SignupSource::Organic,
                expected_ltv: 100.0,
            }),
            probability_used: 1.0,
            impact: ImpactLevel::Low,
            handled: false,
            response_time_ms: None,
        }
    }

    #[test]
    fn recording_event_bus_captures_type_strings() {
        let mut bus = RecordingEventBus::default();
        bus.publish(&sample_event());
        assert_eq!(bus.published_types, vec!["user_signup".to_string()]);
    }

    #[test]
    fn wall_clock_now_does_not_go_backwards() {
        let clock = SystemWallClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
