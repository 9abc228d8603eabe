//! Social-learning game tables
//!
//! Each non-empty coalition runs the social learning engine on the subgraph
//! induced by its members, `runs` times with fresh sub-seeds, and is valued
//! by the configured [`GameValueProtocol`].

use nkgames_common::stats;
use nkgames_common::{Agent, ConfigError, GameTableRecord, Player, Result, SUB_SEED_BOUND};
use nkgames_dynamics::{CommunicationGraph, SimulationConfig, SocialLearningEngine};
use nkgames_landscape::NkLandscape;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

use super::empty_coalition_note;
use crate::coalition::enumerate_coalitions;
use crate::value::GameValueProtocol;

/// Builder for tables whose players are agents on a communication graph
pub struct SocialTableBuilder<'a> {
    landscape: &'a NkLandscape,
    agents: &'a [Agent],
    graph: &'a CommunicationGraph,
    config: SimulationConfig,
    runs: usize,
    protocol: GameValueProtocol,
    notes: String,
    rng: ChaCha8Rng,
}

impl<'a> SocialTableBuilder<'a> {
    /// Defaults: 5 runs, average final score, no notes
    pub fn new(
        landscape: &'a NkLandscape,
        agents: &'a [Agent],
        graph: &'a CommunicationGraph,
        config: SimulationConfig,
        seed: u64,
    ) -> Self {
        Self {
            landscape,
            agents,
            graph,
            config,
            runs: 5,
            protocol: GameValueProtocol::default(),
            notes: String::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    pub fn protocol(mut self, protocol: GameValueProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Base note carried on every record
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// One record per coalition, in enumeration order
    #[instrument(skip(self), fields(agents = self.agents.len(), runs = self.runs))]
    pub fn build_table(&mut self, max_size: Option<usize>) -> Result<Vec<GameTableRecord>> {
        if self.runs == 0 {
            return Err(ConfigError::NonPositiveCount { what: "runs" }.into());
        }
        self.config.validate()?;
        for agent in self.agents {
            agent.validate(self.landscape.n())?;
        }

        let mut records = Vec::new();
        for (coalition_id, coalition) in enumerate_coalitions(self.agents, max_size).enumerate() {
            let members: Vec<String> =
                coalition.iter().map(|a| a.player_id().to_string()).collect();
            if coalition.is_empty() {
                records.push(GameTableRecord {
                    coalition_id,
                    members,
                    size: 0,
                    mean_value: 0.0,
                    std_value: 0.0,
                    runs: 0,
                    notes: empty_coalition_note(&self.notes),
                });
                continue;
            }

            let coalition_agents: Vec<Agent> = coalition.into_iter().cloned().collect();
            let node_ids: Vec<usize> = coalition_agents.iter().map(|a| a.agent_id).collect();
            let subgraph = self.graph.subgraph(&node_ids);

            let mut values = Vec::with_capacity(self.runs);
            for _ in 0..self.runs {
                let sub_seed = self.rng.gen_range(0..SUB_SEED_BOUND);
                let result = SocialLearningEngine::new(
                    self.landscape,
                    &coalition_agents,
                    &subgraph,
                    self.config.clone(),
                    sub_seed,
                )?
                .run()?;
                values.push(self.protocol.evaluate(&result, &coalition_agents));
            }
            let (mean_value, std_value) = stats::summarize(&values);
            debug!(coalition_id, size = members.len(), mean_value, "Coalition valued");
            records.push(GameTableRecord {
                coalition_id,
                size: members.len(),
                members,
                mean_value,
                std_value,
                runs: self.runs,
                notes: self.notes.clone(),
            });
        }
        info!(records = records.len(), "Social learning table built");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nkgames_common::create_agents;
    use nkgames_dynamics::{NetworkFactory, NetworkParams, NetworkTopology};

    fn fixture() -> (NkLandscape, Vec<Agent>, CommunicationGraph) {
        let landscape = NkLandscape::random(4, 1, 3).unwrap();
        let agents = create_agents(4);
        let graph = NetworkFactory::new(NetworkTopology::Complete, 0)
            .build(4, &NetworkParams::default())
            .unwrap();
        (landscape, agents, graph)
    }

    fn config() -> SimulationConfig {
        SimulationConfig {
            rounds: 10,
            ..Default::default()
        }
    }

    #[test]
    fn test_table_shape_and_ids() {
        let (landscape, agents, graph) = fixture();
        let table = SocialTableBuilder::new(&landscape, &agents, &graph, config(), 42)
            .runs(3)
            .build_table(None)
            .unwrap();
        assert_eq!(table.len(), 16);
        for (idx, record) in table.iter().enumerate() {
            assert_eq!(record.coalition_id, idx);
            assert_eq!(record.size, record.members.len());
        }
        assert_eq!(table[1].members, vec!["0".to_string()]);
        assert_eq!(table[15].runs, 3);
    }

    #[test]
    fn test_empty_coalition_record() {
        let (landscape, agents, graph) = fixture();
        let table = SocialTableBuilder::new(&landscape, &agents, &graph, config(), 1)
            .notes("lazer2007")
            .build_table(Some(1))
            .unwrap();
        let empty = &table[0];
        assert!(empty.is_empty_coalition());
        assert_eq!(empty.mean_value, 0.0);
        assert_eq!(empty.runs, 0);
        assert_eq!(empty.notes, "lazer2007;empty coalition");
        assert_eq!(table[1].notes, "lazer2007");
    }

    #[test]
    fn test_same_seed_same_table() {
        let (landscape, agents, graph) = fixture();
        let build = |seed| {
            SocialTableBuilder::new(&landscape, &agents, &graph, config(), seed)
                .runs(2)
                .protocol(GameValueProtocol::MaxFinalScore)
                .build_table(Some(2))
                .unwrap()
        };
        assert_eq!(build(7), build(7));
    }

    #[test]
    fn test_zero_runs_rejected() {
        let (landscape, agents, graph) = fixture();
        let result = SocialTableBuilder::new(&landscape, &agents, &graph, config(), 0)
            .runs(0)
            .build_table(None);
        assert!(result.is_err());
    }
}
