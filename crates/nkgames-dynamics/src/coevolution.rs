//! Modular co-evolution of a firm population
//!
//! Every generation each firm takes one local search step per module, judged
//! by module-local fitness. Every `recombination_interval` generations the
//! population shares designs according to the [`RecombinationMode`].

use std::fmt;
use std::str::FromStr;

use nkgames_common::stats;
use nkgames_common::{ConfigError, Design, NkError, Result};
use nkgames_landscape::NkLandscape;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

/// How firms share designs at a recombination point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecombinationMode {
    /// Every firm adopts the fittest firm's whole design
    Firm,
    /// Per module, every firm adopts the best firm's bits for that module
    Module,
    /// `Firm` followed by `Module`
    Hybrid,
    /// No sharing
    #[serde(alias = "none", alias = "off")]
    Disabled,
}

impl Default for RecombinationMode {
    fn default() -> Self {
        RecombinationMode::Module
    }
}

impl FromStr for RecombinationMode {
    type Err = NkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "firm" => Ok(RecombinationMode::Firm),
            "module" => Ok(RecombinationMode::Module),
            "hybrid" => Ok(RecombinationMode::Hybrid),
            "disabled" | "none" | "off" => Ok(RecombinationMode::Disabled),
            _ => Err(ConfigError::unsupported("recombination mode", s).into()),
        }
    }
}

impl fmt::Display for RecombinationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecombinationMode::Firm => "firm",
            RecombinationMode::Module => "module",
            RecombinationMode::Hybrid => "hybrid",
            RecombinationMode::Disabled => "disabled",
        };
        f.write_str(name)
    }
}

/// Co-evolution parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoevolutionConfig {
    pub num_firms: usize,
    /// Generations to run
    pub rounds: usize,
    /// Recombine after every this many generations; 0 never recombines
    pub recombination_interval: usize,
    pub recombination_mode: RecombinationMode,
}

impl Default for CoevolutionConfig {
    fn default() -> Self {
        Self {
            num_firms: 10,
            rounds: 200,
            recombination_interval: 5,
            recombination_mode: RecombinationMode::Module,
        }
    }
}

/// Population fitness after one generation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub mean_fitness: f64,
    pub max_fitness: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoevolutionResult {
    /// Fittest design in the final population
    pub best_design: Design,
    pub best_fitness: f64,
    pub baseline_design: Design,
    pub history: Vec<GenerationStats>,
}

/// Population of firms searching a landscape module by module
pub struct ModularCoevolutionEngine<'a> {
    landscape: &'a NkLandscape,
    modules: Vec<Vec<usize>>,
    baseline: Design,
    config: CoevolutionConfig,
    rng: ChaCha8Rng,
    firms: Vec<Design>,
}

impl<'a> ModularCoevolutionEngine<'a> {
    /// Create a population of `num_firms` uniformly random designs
    pub fn new(
        landscape: &'a NkLandscape,
        modules: Vec<Vec<usize>>,
        baseline: Design,
        config: CoevolutionConfig,
        seed: u64,
    ) -> Result<Self> {
        if config.num_firms == 0 {
            return Err(ConfigError::NonPositiveCount { what: "num_firms" }.into());
        }
        NkError::check_len(landscape.n(), baseline.len())?;
        for &bit in modules.iter().flatten() {
            ConfigError::check_bit(bit, landscape.n())?;
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let firms = (0..config.num_firms)
            .map(|_| landscape.random_state(&mut rng))
            .collect();
        Ok(Self {
            landscape,
            modules,
            baseline,
            config,
            rng,
            firms,
        })
    }

    /// Replace the population
    pub fn with_firms(mut self, firms: Vec<Design>) -> Result<Self> {
        if firms.is_empty() {
            return Err(ConfigError::NonPositiveCount { what: "num_firms" }.into());
        }
        for firm in &firms {
            NkError::check_len(self.landscape.n(), firm.len())?;
        }
        self.firms = firms;
        Ok(self)
    }

    pub fn firms(&self) -> &[Design] {
        &self.firms
    }

    /// One flip attempt per module per firm, kept when module-local fitness improves
    pub fn local_search_step(&mut self) -> Result<()> {
        for firm in &mut self.firms {
            for module in &self.modules {
                if module.is_empty() {
                    continue;
                }
                let bit = module[self.rng.gen_range(0..module.len())];
                let candidate = firm.flipped(bit);
                let current_fitness = self.landscape.module_fitness(firm, module)?;
                let candidate_fitness = self.landscape.module_fitness(&candidate, module)?;
                if candidate_fitness > current_fitness {
                    *firm = candidate;
                }
            }
        }
        Ok(())
    }

    pub fn recombine(&mut self, mode: RecombinationMode) -> Result<()> {
        match mode {
            RecombinationMode::Firm => self.recombine_firms(),
            RecombinationMode::Module => self.recombine_modules(),
            RecombinationMode::Hybrid => {
                self.recombine_firms()?;
                self.recombine_modules()
            }
            RecombinationMode::Disabled => Ok(()),
        }
    }

    /// Whole-design fitness of every firm, in population order
    pub fn evaluate_all(&self) -> Result<Vec<f64>> {
        self.firms
            .iter()
            .map(|firm| self.landscape.evaluate(firm))
            .collect()
    }

    /// Fittest firm's design; ties go to the earliest firm
    pub fn best_design(&self) -> Result<Design> {
        let scores = self.evaluate_all()?;
        let idx = stats::argmax(&scores).unwrap_or(0);
        Ok(self.firms[idx].clone())
    }

    #[instrument(skip(self), fields(
        firms = self.firms.len(),
        rounds = self.config.rounds,
        mode = %self.config.recombination_mode
    ))]
    pub fn run(&mut self) -> Result<CoevolutionResult> {
        let mut history = Vec::with_capacity(self.config.rounds);
        let interval = self.config.recombination_interval;
        for generation in 0..self.config.rounds {
            self.local_search_step()?;
            if interval > 0 && (generation + 1) % interval == 0 {
                self.recombine(self.config.recombination_mode)?;
            }
            let scores = self.evaluate_all()?;
            let (mean_fitness, max_fitness) = (stats::mean(&scores), stats::max(&scores));
            trace!(generation, mean_fitness, max_fitness, "Generation complete");
            history.push(GenerationStats {
                generation,
                mean_fitness,
                max_fitness,
            });
        }

        let best_design = self.best_design()?;
        let best_fitness = self.landscape.evaluate(&best_design)?;
        debug!(best_fitness, "Co-evolution run finished");
        Ok(CoevolutionResult {
            best_design,
            best_fitness,
            baseline_design: self.baseline.clone(),
            history,
        })
    }

    fn recombine_firms(&mut self) -> Result<()> {
        let scores = self.evaluate_all()?;
        let Some(best) = stats::argmax(&scores) else {
            return Ok(());
        };
        let donor = self.firms[best].clone();
        for (idx, firm) in self.firms.iter_mut().enumerate() {
            if idx != best {
                *firm = donor.clone();
            }
        }
        Ok(())
    }

    fn recombine_modules(&mut self) -> Result<()> {
        for module in &self.modules {
            if module.is_empty() {
                continue;
            }
            let mut best = 0;
            let mut best_value = f64::NEG_INFINITY;
            for (idx, firm) in self.firms.iter().enumerate() {
                let value = self.landscape.module_fitness(firm, module)?;
                if value > best_value {
                    best_value = value;
                    best = idx;
                }
            }
            let donor = self.firms[best].clone();
            for (idx, firm) in self.firms.iter_mut().enumerate() {
                if idx != best {
                    firm.copy_loci_from(&donor, module)?;
                }
            }
        }
        Ok(())
    }
}
