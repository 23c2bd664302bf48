//! Engine-level run-state errors (§7), distinct from `sim_core::DomainError`
//! which covers entity-construction validation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration invalid: {0}")]
    ConfigInvalid(String),
    #[error("simulation is already running")]
    AlreadyRunning,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("snapshot store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
