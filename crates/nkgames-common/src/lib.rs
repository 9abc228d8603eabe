//! # NK Games Common
//!
//! Shared types, errors, and numeric helpers for NK-landscape game tables.
//!
//! ## Core Types
//!
//! - [`Design`]: fixed-length binary design evaluated on a landscape
//! - [`Agent`], [`SearchPlayer`], [`ModuleDefinition`]: the three player shapes
//! - [`GameTableRecord`]: one row of a cooperative-game value table
//!
//! ## Helpers
//!
//! - [`bits::split_bits_evenly`]: round-robin partition of loci into groups
//! - [`stats::mean`] / [`stats::population_std`]: trial aggregation

pub mod bits;
pub mod error;
pub mod stats;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{ConfigError, NkError, Result};
pub use types::{
    design::Design,
    player::{create_agents, Agent, ModuleDefinition, Player, SearchPlayer},
    record::GameTableRecord,
};

/// NK Games version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exclusive upper bound for per-trial sub-seeds drawn from a builder's generator
pub const SUB_SEED_BOUND: u64 = 1_000_000_000;

/// Multiplier applied to a contribution whose pattern activates a conflict pair
pub const CONFLICT_PENALTY: f64 = 0.5;

/// Default contribution draw range
pub const DEFAULT_CONTRIBUTION_RANGE: (f64, f64) = (0.0, 1.0);

/// Annotation on the empty coalition's record
pub const EMPTY_COALITION_NOTE: &str = "empty coalition";
