//! # NK Dynamics
//!
//! Stochastic adaptation dynamics over a shared, read-only [`NkLandscape`].
//!
//! ## Engines
//!
//! - [`social::SocialLearningEngine`]: agents on a communication graph copy
//!   fitter neighbors (explore/exploit) or hill-climb their own loci
//! - [`search::ConstrainedLocalSearchEngine`]: a single lineage climbing over
//!   a free-bit subset while all other bits stay at a baseline
//! - [`coevolution::ModularCoevolutionEngine`]: a firm population searching
//!   module by module with periodic recombination
//!
//! Every engine owns a `ChaCha8Rng` built from an explicit seed and works on
//! its own copies of designs, so runs are reproducible and independent.
//!
//! [`NkLandscape`]: nkgames_landscape::NkLandscape

pub mod coevolution;
pub mod network;
pub mod search;
pub mod social;

pub use coevolution::{
    CoevolutionConfig, CoevolutionResult, GenerationStats, ModularCoevolutionEngine,
    RecombinationMode,
};
pub use network::{CommunicationGraph, NetworkFactory, NetworkParams, NetworkTopology};
pub use search::{
    AcceptanceRule, ConstrainedLocalSearchEngine, InitStrategy, LocalSearchConfig,
    LocalSearchResult,
};
pub use social::{
    InitialStates, RoundStats, SearchScope, SimulationConfig, SimulationResult,
    SocialLearningEngine,
};
