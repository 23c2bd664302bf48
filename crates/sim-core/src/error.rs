use thiserror::Error;

/// Domain-level validation errors raised while constructing or mutating
/// simulation entities, independent of the engine's run-state errors.
#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    /// Year outside the supported calendar range.
    #[error("year {0} is out of supported range [1970, 2100]")]
    YearOutOfRange(i32),
    /// A ratio expected in [0,1] fell outside that range.
    #[error("value must be within [0,1]: {0}")]
    InvalidYield(f64),
    /// A numeric field that must be finite was NaN or infinite.
    #[error("non-finite numeric value encountered: {0}")]
    NonFinite(&'static str),
    /// A monetary amount that must be non-negative was negative.
    #[error("negative monetary value is invalid: {0}")]
    NegativeMoney(&'static str),
    /// An area or size field that must be strictly positive was not.
    #[error("{0} must be > 0")]
    NonPositiveArea(&'static str),
    /// A referenced entity id was not found.
    #[error("dependency not found: {0}")]
    DependencyNotFound(String),
    /// A tier-distribution table's weights did not sum to ~1.0 or contained
    /// a negative weight.
    #[error("tier distribution invalid: weights must be non-negative and sum to ~1.0, got {0}")]
    InvalidTierDistribution(f64),
    /// An archetype-distribution table's weights did not sum to ~1.0 or
    /// contained a negative weight.
    #[error(
        "archetype distribution invalid: weights must be non-negative and sum to ~1.0, got {0}"
    )]
    InvalidArchetypeDistribution(f64),
    /// The sample pool was asked to materialize a user past its capacity.
    /// Should be unreachable given the capacity check in the caller; kept
    /// as a named invariant violation rather than a panic.
    #[error("sample pool exhausted: capacity {0} already reached")]
    SamplePoolExhausted(usize),
}

pub type DomainResult<T> = Result<T, DomainError>;
