#![deny(warnings)]

//! Event generation and deterministic verification harnesses for the
//! simulation engine.
//!
//! This crate owns everything that samples from probability: the typed
//! event catalogue (`events`), the calendar/genre/platform modifier
//! tables it draws from (`tables`), and the two self-contained harnesses
//! (`harness::upgrade`, `harness::ad_booster`) that exercise the engine's
//! KPI pipeline against fixed scenario sets.

pub mod events;
pub mod harness;
pub mod tables;

pub use events::EventGenerator;
pub use tables::ProbabilityTables;
