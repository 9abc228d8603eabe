//! Communication-graph factory
//!
//! Topologies:
//! - `LINE`: path graph `0 - 1 - ... - n-1`
//! - `COMPLETE`: every pair connected
//! - `RANDOM`: Erdős–Rényi G(n, p)
//! - `SMALL_WORLD`: Watts–Strogatz ring lattice with rewiring probability β

use std::str::FromStr;

use nkgames_common::{ConfigError, NkError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::graph::CommunicationGraph;

/// Named network topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkTopology {
    Line,
    Complete,
    Random,
    SmallWorld,
}

impl Default for NetworkTopology {
    fn default() -> Self {
        NetworkTopology::Line
    }
}

impl FromStr for NetworkTopology {
    type Err = NkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "LINE" => Ok(NetworkTopology::Line),
            "COMPLETE" => Ok(NetworkTopology::Complete),
            "RANDOM" => Ok(NetworkTopology::Random),
            "SMALL_WORLD" => Ok(NetworkTopology::SmallWorld),
            _ => Err(ConfigError::unsupported("network type", s).into()),
        }
    }
}

impl std::fmt::Display for NetworkTopology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkTopology::Line => write!(f, "LINE"),
            NetworkTopology::Complete => write!(f, "COMPLETE"),
            NetworkTopology::Random => write!(f, "RANDOM"),
            NetworkTopology::SmallWorld => write!(f, "SMALL_WORLD"),
        }
    }
}

/// Topology parameters; each topology reads only its own fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkParams {
    /// Edge probability for `RANDOM`
    #[serde(default = "default_p")]
    pub p: f64,
    /// Ring-lattice degree for `SMALL_WORLD`
    #[serde(default = "default_k")]
    pub k: usize,
    /// Rewiring probability for `SMALL_WORLD`
    #[serde(default = "default_beta")]
    pub beta: f64,
}

fn default_p() -> f64 {
    0.3
}

fn default_k() -> usize {
    4
}

fn default_beta() -> f64 {
    0.1
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            p: default_p(),
            k: default_k(),
            beta: default_beta(),
        }
    }
}

/// Builds communication graphs over agents `0..n`
#[derive(Debug, Clone)]
pub struct NetworkFactory {
    topology: NetworkTopology,
    seed: u64,
}

impl NetworkFactory {
    pub fn new(topology: NetworkTopology, seed: u64) -> Self {
        Self { topology, seed }
    }

    pub fn topology(&self) -> NetworkTopology {
        self.topology
    }

    /// Build a graph with node set `0..num_agents`
    pub fn build(&self, num_agents: usize, params: &NetworkParams) -> Result<CommunicationGraph> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let graph = match self.topology {
            NetworkTopology::Line => path_graph(num_agents),
            NetworkTopology::Complete => complete_graph(num_agents),
            NetworkTopology::Random => {
                ConfigError::check_probability("p", params.p)?;
                erdos_renyi(num_agents, params.p, &mut rng)
            }
            NetworkTopology::SmallWorld => {
                ConfigError::check_probability("beta", params.beta)?;
                watts_strogatz(num_agents, params.k, params.beta, &mut rng)?
            }
        };
        debug!(
            topology = %self.topology,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Built communication graph"
        );
        Ok(graph)
    }
}

fn path_graph(n: usize) -> CommunicationGraph {
    let mut graph = CommunicationGraph::with_nodes(n);
    for i in 1..n {
        graph.add_edge(i - 1, i);
    }
    graph
}

fn complete_graph(n: usize) -> CommunicationGraph {
    let mut graph = CommunicationGraph::with_nodes(n);
    for a in 0..n {
        for b in (a + 1)..n {
            graph.add_edge(a, b);
        }
    }
    graph
}

fn erdos_renyi<R: Rng + ?Sized>(n: usize, p: f64, rng: &mut R) -> CommunicationGraph {
    if p <= 0.0 {
        return CommunicationGraph::with_nodes(n);
    }
    if p >= 1.0 {
        return complete_graph(n);
    }
    let mut graph = CommunicationGraph::with_nodes(n);
    for a in 0..n {
        for b in (a + 1)..n {
            if rng.gen::<f64>() < p {
                graph.add_edge(a, b);
            }
        }
    }
    graph
}

fn watts_strogatz<R: Rng + ?Sized>(
    n: usize,
    k: usize,
    beta: f64,
    rng: &mut R,
) -> Result<CommunicationGraph> {
    if k > n {
        return Err(ConfigError::InvalidParameter {
            name: "k",
            reason: format!("ring degree {} exceeds node count {}", k, n),
        }
        .into());
    }
    if k == n {
        return Ok(complete_graph(n));
    }

    // ring lattice: each node joined to k/2 successors
    let mut graph = CommunicationGraph::with_nodes(n);
    for j in 1..=k / 2 {
        for u in 0..n {
            graph.add_edge(u, (u + j) % n);
        }
    }

    // rewire each lattice edge (u, u+j) with probability beta
    for j in 1..=k / 2 {
        for u in 0..n {
            let v = (u + j) % n;
            if rng.gen::<f64>() >= beta {
                continue;
            }
            let mut w = rng.gen_range(0..n);
            let mut saturated = false;
            while w == u || graph.has_edge(u, w) {
                w = rng.gen_range(0..n);
                if graph.degree(u) >= n - 1 {
                    saturated = true;
                    break;
                }
            }
            if !saturated {
                graph.remove_edge(u, v);
                graph.add_edge(u, w);
            }
        }
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_topology() {
        assert_eq!("line".parse::<NetworkTopology>().unwrap(), NetworkTopology::Line);
        assert_eq!(
            "SMALL_WORLD".parse::<NetworkTopology>().unwrap(),
            NetworkTopology::SmallWorld
        );
        assert!("STAR".parse::<NetworkTopology>().is_err());
    }

    #[test]
    fn test_line_and_complete() {
        let params = NetworkParams::default();
        let line = NetworkFactory::new(NetworkTopology::Line, 0).build(5, &params).unwrap();
        assert_eq!(line.edge_count(), 4);
        assert_eq!(line.neighbors(0).collect::<Vec<_>>(), vec![1]);

        let complete = NetworkFactory::new(NetworkTopology::Complete, 0)
            .build(5, &params)
            .unwrap();
        assert_eq!(complete.edge_count(), 10);
    }

    #[test]
    fn test_random_graph_reproducible() {
        let params = NetworkParams {
            p: 0.5,
            ..Default::default()
        };
        let factory = NetworkFactory::new(NetworkTopology::Random, 17);
        assert_eq!(factory.build(12, &params).unwrap(), factory.build(12, &params).unwrap());
    }

    #[test]
    fn test_random_graph_extremes() {
        let factory = NetworkFactory::new(NetworkTopology::Random, 1);
        let none = NetworkParams {
            p: 0.0,
            ..Default::default()
        };
        assert_eq!(factory.build(6, &none).unwrap().edge_count(), 0);
        let all = NetworkParams {
            p: 1.0,
            ..Default::default()
        };
        assert_eq!(factory.build(6, &all).unwrap().edge_count(), 15);
        let bad = NetworkParams {
            p: 1.2,
            ..Default::default()
        };
        assert!(factory.build(6, &bad).is_err());
    }

    #[test]
    fn test_small_world_preserves_edge_count() {
        let params = NetworkParams {
            k: 4,
            beta: 0.3,
            ..Default::default()
        };
        let graph = NetworkFactory::new(NetworkTopology::SmallWorld, 3)
            .build(20, &params)
            .unwrap();
        assert_eq!(graph.node_count(), 20);
        assert_eq!(graph.edge_count(), 40);
    }

    #[test]
    fn test_small_world_without_rewiring_is_lattice() {
        let params = NetworkParams {
            k: 2,
            beta: 0.0,
            ..Default::default()
        };
        let graph = NetworkFactory::new(NetworkTopology::SmallWorld, 0)
            .build(5, &params)
            .unwrap();
        assert!(graph.has_edge(4, 0));
        assert_eq!(graph.edge_count(), 5);
    }

    #[test]
    fn test_small_world_k_too_large() {
        let params = NetworkParams {
            k: 8,
            ..Default::default()
        };
        assert!(NetworkFactory::new(NetworkTopology::SmallWorld, 0)
            .build(4, &params)
            .is_err());
    }

    #[test]
    fn test_params_deserialize_with_defaults() {
        let params: NetworkParams = serde_json::from_str(r#"{"p": 0.6}"#).unwrap();
        assert_eq!(params.p, 0.6);
        assert_eq!(params.k, 4);
    }
}
