//! Explicit observer set the engine calls synchronously instead of
//! inheriting from an ambient event-emitter (§9 redesign flag).

use sim_core::{SimulationEvent, SimulationResult, SimulationSnapshot};

/// Progress reported once per yield-cadence batch during `run()`.
#[derive(Clone, Copy, Debug)]
pub struct ProgressUpdate {
    pub current_day: u32,
    pub total_days: u32,
    pub percent_complete: f64,
}

/// Every method is optional (no-op default) so a caller implements only
/// what it needs.
pub trait SimObserver {
    fn on_event(&mut self, _event: &SimulationEvent) {}
    fn on_snapshot(&mut self, _snapshot: &SimulationSnapshot) {}
    fn on_progress(&mut self, _progress: ProgressUpdate) {}
    fn on_complete(&mut self, _result: &SimulationResult) {}
}

/// Observer that does nothing; used when the caller passes `None`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl SimObserver for NullObserver {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_observer_accepts_every_call_without_panicking() {
        let mut obs = NullObserver;
        obs.on_progress(ProgressUpdate {
            current_day: 1,
            total_days: 30,
            percent_complete: 3.3,
        });
    }
}
