//! Player shapes
//!
//! Each scenario values coalitions of a different kind of player:
//! - [`Agent`]: a social learner on a communication graph
//! - [`SearchPlayer`]: a participant in constrained local search, owning free bits
//! - [`ModuleDefinition`]: a named group of loci in modular co-evolution

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Anything that can appear as a coalition member in a game table
pub trait Player {
    /// Identifier written to a record's `members` column
    fn player_id(&self) -> &str;

    /// Loci this player is responsible for
    fn bits(&self) -> &[usize];
}

/// Social-learning agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Node index on the communication graph
    pub agent_id: usize,
    /// Display name
    pub name: String,
    /// Identifier used in game-table records
    pub player_id: String,
    /// Assigned loci (local search scope)
    pub bits: Vec<usize>,
    /// Optional skill label
    pub skill: Option<String>,
}

impl Agent {
    /// Create an agent with default name `Agent{id}` and player id `{id}`
    pub fn new(agent_id: usize, bits: Vec<usize>) -> Self {
        Self {
            agent_id,
            name: format!("Agent{}", agent_id),
            player_id: agent_id.to_string(),
            bits,
            skill: None,
        }
    }

    /// Attach a skill label
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skill = Some(skill.into());
        self
    }

    /// Check that every assigned bit lies inside `[0, n)`
    pub fn validate(&self, n: usize) -> Result<()> {
        for &bit in &self.bits {
            ConfigError::check_bit(bit, n)?;
        }
        Ok(())
    }
}

impl Player for Agent {
    fn player_id(&self) -> &str {
        &self.player_id
    }

    fn bits(&self) -> &[usize] {
        &self.bits
    }
}

/// One agent per bit: agent `i` owns locus `i`
pub fn create_agents(num_bits: usize) -> Vec<Agent> {
    (0..num_bits).map(|i| Agent::new(i, vec![i])).collect()
}

/// Constrained-search participant owning a set of free bits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPlayer {
    pub player_id: String,
    /// Sorted, deduplicated loci
    pub bits: Vec<usize>,
}

impl SearchPlayer {
    /// Create a player, sorting and deduplicating bits and checking them against `n`
    pub fn new(
        player_id: impl Into<String>,
        bits: impl IntoIterator<Item = usize>,
        n: usize,
    ) -> Result<Self> {
        let mut bits: Vec<usize> = bits.into_iter().collect();
        bits.sort_unstable();
        bits.dedup();
        for &bit in &bits {
            ConfigError::check_bit(bit, n)?;
        }
        Ok(Self {
            player_id: player_id.into(),
            bits,
        })
    }

    /// Default roster: one player per bit, ids `"0"..`
    pub fn one_per_bit(n: usize) -> Vec<Self> {
        (0..n)
            .map(|i| Self {
                player_id: i.to_string(),
                bits: vec![i],
            })
            .collect()
    }
}

impl Player for SearchPlayer {
    fn player_id(&self) -> &str {
        &self.player_id
    }

    fn bits(&self) -> &[usize] {
        &self.bits
    }
}

/// Named module of loci
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDefinition {
    pub name: String,
    pub bits: Vec<usize>,
}

impl ModuleDefinition {
    pub fn new(name: impl Into<String>, bits: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            bits,
        }
    }

    /// Name modules `{prefix}0`, `{prefix}1`, ... from a partition
    pub fn from_partition(prefix: &str, partition: &[Vec<usize>]) -> Vec<Self> {
        partition
            .iter()
            .enumerate()
            .map(|(idx, bits)| Self::new(format!("{}{}", prefix, idx), bits.clone()))
            .collect()
    }
}

impl Player for ModuleDefinition {
    fn player_id(&self) -> &str {
        &self.name
    }

    fn bits(&self) -> &[usize] {
        &self.bits
    }
}
