//! Constrained hill climbing
//!
//! A single lineage flips one free bit per step while every other locus stays
//! at the baseline design. The walk stops after `max_steps` steps or after
//! `stall_limit` consecutive steps without improvement.

use std::str::FromStr;

use nkgames_common::{ConfigError, Design, NkError, Result};
use nkgames_landscape::NkLandscape;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

/// Starting point of each trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitStrategy {
    /// Randomize only the free bits
    Random,
    /// Start from the baseline unchanged
    Baseline,
    /// Flip each free bit with probability `perturb_prob`
    Perturb,
}

impl Default for InitStrategy {
    fn default() -> Self {
        InitStrategy::Random
    }
}

impl FromStr for InitStrategy {
    type Err = NkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(InitStrategy::Random),
            "baseline" => Ok(InitStrategy::Baseline),
            "perturb" => Ok(InitStrategy::Perturb),
            _ => Err(ConfigError::unsupported("init strategy", s).into()),
        }
    }
}

/// What a candidate must beat to be accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceRule {
    /// The last accepted fitness; the result reports the last accepted state
    VersusCurrent,
    /// The best fitness so far; the result reports the best state
    VersusBest,
}

impl Default for AcceptanceRule {
    fn default() -> Self {
        AcceptanceRule::VersusCurrent
    }
}

impl FromStr for AcceptanceRule {
    type Err = NkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "versus_current" | "current" => Ok(AcceptanceRule::VersusCurrent),
            "versus_best" | "best" => Ok(AcceptanceRule::VersusBest),
            _ => Err(ConfigError::unsupported("acceptance rule", s).into()),
        }
    }
}

/// Local search parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalSearchConfig {
    pub max_steps: usize,
    /// Consecutive non-improving steps before stopping
    pub stall_limit: usize,
    /// Probability of accepting a non-improving candidate
    pub noise_accept_prob: f64,
    pub init_strategy: InitStrategy,
    pub perturb_prob: f64,
    pub acceptance: AcceptanceRule,
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self {
            max_steps: 250,
            stall_limit: 50,
            noise_accept_prob: 0.0,
            init_strategy: InitStrategy::Random,
            perturb_prob: 0.15,
            acceptance: AcceptanceRule::VersusCurrent,
        }
    }
}

impl LocalSearchConfig {
    pub fn validate(&self) -> Result<()> {
        ConfigError::check_probability("noise_accept_prob", self.noise_accept_prob)?;
        ConfigError::check_probability("perturb_prob", self.perturb_prob)?;
        Ok(())
    }
}

/// Outcome of one trial
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalSearchResult {
    pub final_state: Design,
    pub final_fitness: f64,
    pub best_fitness: f64,
    pub steps: usize,
}

/// Hill climber restricted to a free-bit subset of a baseline design
pub struct ConstrainedLocalSearchEngine<'a> {
    landscape: &'a NkLandscape,
    baseline: Design,
    free_bits: Vec<usize>,
    config: LocalSearchConfig,
    rng: ChaCha8Rng,
}

impl<'a> ConstrainedLocalSearchEngine<'a> {
    /// Create an engine; free bits are sorted, deduplicated and range-checked
    pub fn new(
        landscape: &'a NkLandscape,
        baseline: Design,
        free_bits: impl IntoIterator<Item = usize>,
        config: LocalSearchConfig,
        seed: u64,
    ) -> Result<Self> {
        NkError::check_len(landscape.n(), baseline.len())?;
        config.validate()?;
        let mut free_bits: Vec<usize> = free_bits.into_iter().collect();
        free_bits.sort_unstable();
        free_bits.dedup();
        for &bit in &free_bits {
            ConfigError::check_bit(bit, landscape.n())?;
        }
        Ok(Self {
            landscape,
            baseline,
            free_bits,
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn free_bits(&self) -> &[usize] {
        &self.free_bits
    }

    /// Run `trials` consecutive trials from this engine's generator
    pub fn run_trials(&mut self, trials: usize) -> Result<Vec<LocalSearchResult>> {
        (0..trials).map(|_| self.run_once()).collect()
    }

    /// One climb; an empty free-bit set returns the baseline without searching
    #[instrument(skip(self), fields(free_bits = self.free_bits.len()))]
    pub fn run_once(&mut self) -> Result<LocalSearchResult> {
        if self.free_bits.is_empty() {
            let fitness = self.landscape.evaluate(&self.baseline)?;
            return Ok(LocalSearchResult {
                final_state: self.baseline.clone(),
                final_fitness: fitness,
                best_fitness: fitness,
                steps: 0,
            });
        }

        let mut current = self.initial_state();
        let mut current_fitness = self.landscape.evaluate(&current)?;
        let mut best = current.clone();
        let mut best_fitness = current_fitness;
        let mut stall = 0;
        let mut steps = 0;

        while steps < self.config.max_steps && stall < self.config.stall_limit {
            steps += 1;
            let bit = self.free_bits[self.rng.gen_range(0..self.free_bits.len())];
            let candidate = current.flipped(bit);
            let candidate_fitness = self.landscape.evaluate(&candidate)?;

            let reference = match self.config.acceptance {
                AcceptanceRule::VersusCurrent => current_fitness,
                AcceptanceRule::VersusBest => best_fitness,
            };
            let improved = candidate_fitness > reference;
            let accept = improved
                || (self.config.noise_accept_prob > 0.0
                    && self.rng.gen::<f64>() < self.config.noise_accept_prob);

            if improved {
                stall = 0;
            } else {
                stall += 1;
            }
            if accept {
                if candidate_fitness > best_fitness {
                    best_fitness = candidate_fitness;
                    best = candidate.clone();
                }
                current = candidate;
                current_fitness = candidate_fitness;
            }
        }
        trace!(steps, best_fitness, "Local search finished");

        let (final_state, final_fitness) = match self.config.acceptance {
            AcceptanceRule::VersusCurrent => (current, current_fitness),
            AcceptanceRule::VersusBest => (best, best_fitness),
        };
        Ok(LocalSearchResult {
            final_state,
            final_fitness,
            best_fitness,
            steps,
        })
    }

    fn initial_state(&mut self) -> Design {
        let mut state = self.baseline.clone();
        match self.config.init_strategy {
            InitStrategy::Baseline => {}
            InitStrategy::Perturb => {
                for &bit in &self.free_bits {
                    if self.rng.gen::<f64>() < self.config.perturb_prob {
                        state.flip(bit);
                    }
                }
            }
            InitStrategy::Random => {
                for &bit in &self.free_bits {
                    state.set(bit, self.rng.gen_range(0..2u8));
                }
            }
        }
        state
    }
}
