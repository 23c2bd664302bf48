#![deny(warnings)]

//! Core domain models, deterministic primitives, and invariants for the
//! Real-Life Simulation Engine.
//!
//! This crate defines serializable types shared across the simulation
//! (users, releases, transactions, events, aggregate population counters,
//! metrics, market conditions, snapshots, and the final result) together
//! with the deterministic clock and RNG every other crate in the
//! workspace drives from.

pub mod aggregate;
pub mod benchmarks;
pub mod clock;
pub mod config;
pub mod distribution;
pub mod error;
pub mod events;
pub mod ids;
pub mod market;
pub mod metrics;
pub mod presets;
pub mod rng;
pub mod snapshot;
pub mod types;

pub use aggregate::{AggregateUsers, ArchetypeCounts, TierCounts};
pub use clock::SimClock;
pub use config::{SimulationConfig, SystemTestThresholds, DEFAULT_MAX_SAMPLE_SIZE};
pub use distribution::{ArchetypeDistribution, TierDistribution, TierPricing};
pub use error::{DomainError, DomainResult};
pub use events::{EventCategory, EventPayload, ImpactLevel, SimulationEvent};
pub use ids::{EventId, IdAllocator, ReleaseId, TransactionId, UserId};
pub use market::MarketConditions;
pub use metrics::SystemMetrics;
pub use rng::DeterministicRng;
pub use snapshot::{KpiBlock, SimulationResult, SimulationSnapshot, SystemTestResults, Verdict};
pub use types::{
    Platform, ReleaseKind, SimulatedRelease, SimulatedTransaction, SimulatedUser,
    SubscriptionTier, TransactionKind, TransactionStatus, UserArchetype, GENRES,
};
