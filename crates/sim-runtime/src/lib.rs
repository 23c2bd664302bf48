#![deny(warnings)]

//! The simulation engine: owns the day-step loop, the bounded population
//! store, and the collaborator seams (observer, logger, wall clock, event
//! bus, snapshot store) a caller plugs in around a run.

pub mod collab;
pub mod engine;
pub mod error;
pub mod observer;
pub mod report;
pub mod snapshot;
pub mod storage;

pub use collab::{EventBus, Logger, NullEventBus, RecordingEventBus, SystemWallClock, TracingLogger, WallClock};
pub use engine::{RunState, Simulation, SimulationControl, StatusReport};
pub use error::{EngineError, EngineResult};
pub use observer::{NullObserver, ProgressUpdate, SimObserver};
pub use report::RunTotals;
pub use storage::PopulationStore;
