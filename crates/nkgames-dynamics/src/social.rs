//! Network-mediated social learning
//!
//! Each round, every agent independently either observes (probability
//! `velocity`) and copies its fittest strictly-better neighbor with per-bit
//! transmission noise, or performs one local search step over its assigned
//! loci. All updates in a round read the previous round's joint state.
//!
//! Draw order per agent per round: observe coin, then either the copy mask
//! (N draws, only when `error_rate > 0`) or the locus choice.

use std::collections::BTreeMap;
use std::str::FromStr;

use nkgames_common::stats;
use nkgames_common::{Agent, ConfigError, Design, NkError, Result};
use nkgames_landscape::NkLandscape;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::network::CommunicationGraph;

/// Which loci a local search step may flip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    /// The agent's assigned bits (all loci if it has none)
    Assigned,
    /// Any locus
    All,
}

impl Default for SearchScope {
    fn default() -> Self {
        SearchScope::Assigned
    }
}

impl FromStr for SearchScope {
    type Err = NkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "assigned" => Ok(SearchScope::Assigned),
            "all" => Ok(SearchScope::All),
            _ => Err(ConfigError::unsupported("local search scope", s).into()),
        }
    }
}

/// How agents' starting designs are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialStates {
    /// Uniformly random, drawn from the engine's generator in agent order
    Random,
    /// All-zero designs
    Zeros,
}

impl Default for InitialStates {
    fn default() -> Self {
        InitialStates::Random
    }
}

/// Social learning parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of rounds
    pub rounds: usize,
    /// Probability of observing neighbors in a round
    pub velocity: f64,
    /// Per-bit probability that copying fails
    pub error_rate: f64,
    /// Local search scope
    pub search_scope: SearchScope,
    /// Accept equal-fitness local moves
    pub accept_equal: bool,
    /// Starting designs
    pub initial_states: InitialStates,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rounds: 200,
            velocity: 1.0,
            error_rate: 0.0,
            search_scope: SearchScope::Assigned,
            accept_equal: true,
            initial_states: InitialStates::Random,
        }
    }
}

impl SimulationConfig {
    /// Pure Lazer–Friedman dynamics: always observe, exact copying, strict acceptance
    pub fn lf_pure(rounds: usize) -> Self {
        Self {
            rounds,
            velocity: 1.0,
            error_rate: 0.0,
            search_scope: SearchScope::Assigned,
            accept_equal: false,
            initial_states: InitialStates::Random,
        }
    }

    /// Reject out-of-range probabilities
    pub fn validate(&self) -> Result<()> {
        ConfigError::check_probability("velocity", self.velocity)?;
        ConfigError::check_probability("error_rate", self.error_rate)?;
        Ok(())
    }
}

/// Aggregate fitness after one round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundStats {
    pub round: usize,
    pub mean_score: f64,
    pub max_score: f64,
}

/// Outcome of one social learning run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    /// Per-round statistics
    pub history: Vec<RoundStats>,
    /// Agent id -> fitness after the last round
    pub final_scores: BTreeMap<usize, f64>,
    /// Best single-agent fitness seen in any round (0.0 if no rounds ran)
    pub best_score: f64,
    /// Design that achieved `best_score`
    pub best_state: Option<Design>,
}

/// Explore/exploit dynamics for a population of agents on a graph
pub struct SocialLearningEngine<'a> {
    landscape: &'a NkLandscape,
    agents: &'a [Agent],
    graph: &'a CommunicationGraph,
    config: SimulationConfig,
    rng: ChaCha8Rng,
    states: BTreeMap<usize, Design>,
}

impl<'a> SocialLearningEngine<'a> {
    /// Create an engine; initial designs are drawn from the seeded generator
    pub fn new(
        landscape: &'a NkLandscape,
        agents: &'a [Agent],
        graph: &'a CommunicationGraph,
        config: SimulationConfig,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        for agent in agents {
            agent.validate(landscape.n())?;
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let states = agents
            .iter()
            .map(|agent| {
                let state = match config.initial_states {
                    InitialStates::Random => landscape.random_state(&mut rng),
                    InitialStates::Zeros => Design::zeros(landscape.n()),
                };
                (agent.agent_id, state)
            })
            .collect();
        Ok(Self {
            landscape,
            agents,
            graph,
            config,
            rng,
            states,
        })
    }

    /// Replace the starting designs; every agent needs one of length N
    pub fn with_initial_states(mut self, states: BTreeMap<usize, Design>) -> Result<Self> {
        for agent in self.agents {
            let state = states.get(&agent.agent_id).ok_or_else(|| {
                NkError::from(ConfigError::InvalidParameter {
                    name: "initial_states",
                    reason: format!("no design for agent {}", agent.agent_id),
                })
            })?;
            NkError::check_len(self.landscape.n(), state.len())?;
        }
        self.states = states;
        Ok(self)
    }

    /// Current starting designs
    pub fn states(&self) -> &BTreeMap<usize, Design> {
        &self.states
    }

    /// Run all rounds from the starting designs
    #[instrument(skip(self), fields(agents = self.agents.len(), rounds = self.config.rounds))]
    pub fn run(&mut self) -> Result<SimulationResult> {
        let mut states = self.states.clone();
        let mut history = Vec::with_capacity(self.config.rounds);
        let mut best_score = f64::NEG_INFINITY;
        let mut best_state = None;

        for round in 0..self.config.rounds {
            states = self.run_round(&states)?;
            let scores = self.ordered_scores(&states)?;
            let values: Vec<f64> = scores.iter().map(|&(_, s)| s).collect();
            let (mean_score, max_score) = (stats::mean(&values), stats::max(&values));
            if let Some(idx) = stats::argmax(&values) {
                if max_score > best_score {
                    best_score = max_score;
                    best_state = states.get(&scores[idx].0).cloned();
                }
            }
            trace!(round, mean_score, max_score, "Round complete");
            history.push(RoundStats {
                round,
                mean_score,
                max_score,
            });
        }

        let final_scores = self.ordered_scores(&states)?.into_iter().collect();
        let best_score = if best_score.is_finite() { best_score } else { 0.0 };
        debug!(best_score, "Social learning run finished");
        Ok(SimulationResult {
            history,
            final_scores,
            best_score,
            best_state,
        })
    }

    /// Simultaneous update: every agent reads `states`, none sees another's new design
    fn run_round(&mut self, states: &BTreeMap<usize, Design>) -> Result<BTreeMap<usize, Design>> {
        let scores: BTreeMap<usize, f64> = self.ordered_scores(states)?.into_iter().collect();
        let mut next = BTreeMap::new();
        for agent in self.agents {
            let Some(current) = states.get(&agent.agent_id) else {
                continue;
            };
            let updated = self.update_agent(agent, current, states, &scores)?;
            next.insert(agent.agent_id, updated);
        }
        Ok(next)
    }

    fn update_agent(
        &mut self,
        agent: &Agent,
        current: &Design,
        states: &BTreeMap<usize, Design>,
        scores: &BTreeMap<usize, f64>,
    ) -> Result<Design> {
        let observe = self.rng.gen::<f64>() < self.config.velocity;
        if observe {
            if let Some(source) = self.best_neighbor(agent.agent_id, states, scores) {
                return Ok(self.mimic(current, source));
            }
        }
        let own = scores.get(&agent.agent_id).copied().unwrap_or(0.0);
        self.local_search(agent, current, own)
    }

    /// Fittest neighbor strictly better than the agent itself; ties keep the first
    fn best_neighbor<'s>(
        &self,
        agent_id: usize,
        states: &'s BTreeMap<usize, Design>,
        scores: &BTreeMap<usize, f64>,
    ) -> Option<&'s Design> {
        let mut best_score = scores.get(&agent_id).copied().unwrap_or(f64::NEG_INFINITY);
        let mut best = None;
        for neighbor in self.graph.neighbors(agent_id) {
            let score = scores.get(&neighbor).copied().unwrap_or(f64::NEG_INFINITY);
            if score > best_score {
                best_score = score;
                best = states.get(&neighbor);
            }
        }
        best
    }

    /// Copy `source` bit by bit; each bit fails to copy with probability `error_rate`
    fn mimic(&mut self, current: &Design, source: &Design) -> Design {
        if self.config.error_rate <= 0.0 {
            return source.clone();
        }
        let mut next = current.clone();
        for locus in 0..self.landscape.n() {
            if self.rng.gen::<f64>() >= self.config.error_rate {
                next.set(locus, source.bit(locus));
            }
        }
        next
    }

    fn local_search(
        &mut self,
        agent: &Agent,
        current: &Design,
        current_score: f64,
    ) -> Result<Design> {
        let all: Vec<usize>;
        let space: &[usize] = match self.config.search_scope {
            SearchScope::Assigned if !agent.bits.is_empty() => &agent.bits,
            _ => {
                all = (0..self.landscape.n()).collect();
                &all
            }
        };
        let locus = space[self.rng.gen_range(0..space.len())];
        let candidate = current.flipped(locus);
        let score = self.landscape.evaluate(&candidate)?;
        let accept = if self.config.accept_equal {
            score >= current_score
        } else {
            score > current_score
        };
        Ok(if accept { candidate } else { current.clone() })
    }

    /// `(agent_id, fitness)` in agent order
    fn ordered_scores(&self, states: &BTreeMap<usize, Design>) -> Result<Vec<(usize, f64)>> {
        self.agents
            .iter()
            .filter_map(|agent| states.get(&agent.agent_id).map(|s| (agent.agent_id, s)))
            .map(|(id, state)| self.landscape.evaluate(state).map(|score| (id, score)))
            .collect()
    }
}
