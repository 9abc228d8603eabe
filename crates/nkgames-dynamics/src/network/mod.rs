//! Communication graphs for social learning

pub mod factory;
pub mod graph;

pub use self::factory::{NetworkFactory, NetworkParams, NetworkTopology};
pub use self::graph::CommunicationGraph;
