//! Error types for NK game-table generation
//!
//! All failures are fail-fast: the computation is deterministic numerics, so
//! nothing here is retried or recovered.

use thiserror::Error;

/// Result type alias using NkError
pub type Result<T> = std::result::Result<T, NkError>;

/// Unified error type for landscape, dynamics, and table operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NkError {
    // Shape errors
    #[error("Dimension mismatch: expected length {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl NkError {
    /// Shorthand for a design/baseline length check
    pub fn check_len(expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(NkError::DimensionMismatch { expected, actual })
        }
    }
}

/// Invalid-configuration conditions, raised at construction time
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Unsupported {kind}: {name}")]
    UnsupportedName { kind: &'static str, name: String },

    #[error("{what} must be positive")]
    NonPositiveCount { what: &'static str },

    #[error("Bit index out of range: {bit} (N={n})")]
    BitOutOfRange { bit: usize, n: usize },

    #[error("Invalid dependency structure: {0}")]
    InvalidDependencies(String),

    #[error("Invalid contribution tables: {0}")]
    InvalidTables(String),

    #[error("Epistasis too large: K={k} requires at least {} loci, got N={n}", .k + 1)]
    EpistasisTooLarge { n: usize, k: usize },

    #[error("Probability {name}={value} outside [0, 1]")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    #[error("Invalid skill range for {skill}: low {low} > high {high}")]
    InvalidSkillRange { skill: String, low: f64, high: f64 },

    #[error("Invalid bit string: {0}")]
    InvalidBitstring(String),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl ConfigError {
    /// Validate that a named parameter is a probability
    pub fn check_probability(name: &'static str, value: f64) -> std::result::Result<(), Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(ConfigError::ProbabilityOutOfRange { name, value })
        }
    }

    /// Validate that a bit index lies inside `[0, n)`
    pub fn check_bit(bit: usize, n: usize) -> std::result::Result<(), Self> {
        if bit < n {
            Ok(())
        } else {
            Err(ConfigError::BitOutOfRange { bit, n })
        }
    }

    /// Build an unsupported-name error
    pub fn unsupported(kind: &'static str, name: impl Into<String>) -> Self {
        ConfigError::UnsupportedName {
            kind,
            name: name.into(),
        }
    }
}
