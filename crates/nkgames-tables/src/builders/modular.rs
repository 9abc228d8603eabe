//! Modular adoption game tables
//!
//! A coalition of modules is valued by substituting its modules' bits from a
//! mature design into the baseline and evaluating the landscape directly.
//! Mature designs come from co-evolution runs, one per run, and each
//! coalition is averaged over all of them.

use std::str::FromStr;

use nkgames_common::stats;
use nkgames_common::{
    ConfigError, Design, GameTableRecord, ModuleDefinition, NkError, Player, Result,
    SUB_SEED_BOUND,
};
use nkgames_dynamics::{CoevolutionConfig, ModularCoevolutionEngine};
use nkgames_landscape::NkLandscape;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::empty_coalition_note;
use crate::coalition::enumerate_coalitions;

/// What a coalition's value is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueBasis {
    /// Fitness of the adopted design
    Absolute,
    /// Fitness of the adopted design minus the baseline's fitness
    #[serde(alias = "relative")]
    RelativeToBaseline,
}

impl Default for ValueBasis {
    fn default() -> Self {
        ValueBasis::Absolute
    }
}

impl FromStr for ValueBasis {
    type Err = NkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "absolute" => Ok(ValueBasis::Absolute),
            "relative" | "relative_to_baseline" => Ok(ValueBasis::RelativeToBaseline),
            _ => Err(ConfigError::unsupported("value basis", s).into()),
        }
    }
}

/// Builder for tables whose players are modules of loci
pub struct ModularTableBuilder<'a> {
    landscape: &'a NkLandscape,
    modules: Vec<ModuleDefinition>,
    baseline: Design,
    mature_designs: Vec<Design>,
    basis: ValueBasis,
    notes: String,
}

impl<'a> ModularTableBuilder<'a> {
    /// Builder over precomputed mature designs
    pub fn new(
        landscape: &'a NkLandscape,
        modules: Vec<ModuleDefinition>,
        baseline: Design,
        mature_designs: Vec<Design>,
    ) -> Result<Self> {
        let n = landscape.n();
        NkError::check_len(n, baseline.len())?;
        if mature_designs.is_empty() {
            return Err(ConfigError::NonPositiveCount {
                what: "mature designs",
            }
            .into());
        }
        for design in &mature_designs {
            NkError::check_len(n, design.len())?;
        }
        for &bit in modules.iter().flat_map(|m| m.bits()) {
            ConfigError::check_bit(bit, n)?;
        }
        Ok(Self {
            landscape,
            modules,
            baseline,
            mature_designs,
            basis: ValueBasis::default(),
            notes: String::new(),
        })
    }

    /// Produce `runs` mature designs by co-evolving over `search_modules`.
    ///
    /// Run `i` uses the `i`-th sub-seed drawn from a generator seeded with `seed`.
    #[instrument(skip_all, fields(runs = runs, firms = config.num_firms))]
    pub fn from_coevolution(
        landscape: &'a NkLandscape,
        modules: Vec<ModuleDefinition>,
        baseline: Design,
        search_modules: &[Vec<usize>],
        config: &CoevolutionConfig,
        runs: usize,
        seed: u64,
    ) -> Result<Self> {
        if runs == 0 {
            return Err(ConfigError::NonPositiveCount { what: "runs" }.into());
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let sub_seeds: Vec<u64> = (0..runs).map(|_| rng.gen_range(0..SUB_SEED_BOUND)).collect();
        let mut mature_designs = Vec::with_capacity(runs);
        for sub_seed in sub_seeds {
            let result = ModularCoevolutionEngine::new(
                landscape,
                search_modules.to_vec(),
                baseline.clone(),
                config.clone(),
                sub_seed,
            )?
            .run()?;
            debug!(sub_seed, best_fitness = result.best_fitness, "Mature design ready");
            mature_designs.push(result.best_design);
        }
        Self::new(landscape, modules, baseline, mature_designs)
    }

    pub fn basis(mut self, basis: ValueBasis) -> Self {
        self.basis = basis;
        self
    }

    /// Note carried on every record
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn mature_designs(&self) -> &[Design] {
        &self.mature_designs
    }

    /// Baseline with the coalition's module bits taken from `mature`
    pub fn adopt(&self, coalition: &[&ModuleDefinition], mature: &Design) -> Result<Design> {
        let mut state = self.baseline.clone();
        for module in coalition {
            state.copy_loci_from(mature, module.bits())?;
        }
        Ok(state)
    }

    #[instrument(skip(self), fields(modules = self.modules.len(), basis = ?self.basis))]
    pub fn build_table(&self, max_size: Option<usize>) -> Result<Vec<GameTableRecord>> {
        let baseline_fitness = self.landscape.evaluate(&self.baseline)?;
        let offset = match self.basis {
            ValueBasis::Absolute => 0.0,
            ValueBasis::RelativeToBaseline => baseline_fitness,
        };

        let mut records = Vec::new();
        for (coalition_id, coalition) in enumerate_coalitions(&self.modules, max_size).enumerate() {
            let members: Vec<String> =
                coalition.iter().map(|m| m.player_id().to_string()).collect();
            if coalition.is_empty() {
                records.push(GameTableRecord {
                    coalition_id,
                    members,
                    size: 0,
                    mean_value: baseline_fitness - offset,
                    std_value: 0.0,
                    runs: 0,
                    notes: empty_coalition_note(&self.notes),
                });
                continue;
            }

            let values = self
                .mature_designs
                .iter()
                .map(|mature| -> Result<f64> {
                    let adopted = self.adopt(&coalition, mature)?;
                    Ok(self.landscape.evaluate(&adopted)? - offset)
                })
                .collect::<Result<Vec<f64>>>()?;
            let (mean_value, std_value) = stats::summarize(&values);
            debug!(coalition_id, mean_value, "Coalition valued");
            records.push(GameTableRecord {
                coalition_id,
                size: members.len(),
                members,
                mean_value,
                std_value,
                runs: values.len(),
                notes: self.notes.clone(),
            });
        }
        info!(records = records.len(), "Modular adoption table built");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nkgames_landscape::{build_modular_landscape, build_true_modules};

    fn modules() -> Vec<ModuleDefinition> {
        ModuleDefinition::from_partition("T", &[vec![0, 2], vec![1, 3]])
    }

    #[test]
    fn test_adoption_substitutes_module_bits() {
        let landscape = NkLandscape::random(4, 1, 2).unwrap();
        let mature = Design::parse("1111", 4).unwrap();
        let builder =
            ModularTableBuilder::new(&landscape, modules(), Design::zeros(4), vec![mature.clone()])
                .unwrap();
        let modules = modules();
        let adopted = builder.adopt(&[&modules[0]], &mature).unwrap();
        assert_eq!(adopted.to_string(), "1010");

        let table = builder.build_table(None).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table[1].members, vec!["T0".to_string()]);
        assert_eq!(table[1].mean_value, landscape.evaluate(&adopted).unwrap());
        assert_eq!(table[3].mean_value, landscape.evaluate(&mature).unwrap());
        assert_eq!(table[3].std_value, 0.0);
    }

    #[test]
    fn test_value_basis() {
        let landscape = NkLandscape::random(4, 1, 2).unwrap();
        let baseline = Design::zeros(4);
        let baseline_fitness = landscape.evaluate(&baseline).unwrap();
        let mature = vec![
            Design::parse("1100", 4).unwrap(),
            Design::parse("0011", 4).unwrap(),
        ];

        let absolute =
            ModularTableBuilder::new(&landscape, modules(), baseline.clone(), mature.clone())
                .unwrap()
                .build_table(None)
                .unwrap();
        let relative = ModularTableBuilder::new(&landscape, modules(), baseline, mature)
            .unwrap()
            .basis(ValueBasis::RelativeToBaseline)
            .build_table(None)
            .unwrap();

        assert_eq!(absolute[0].mean_value, baseline_fitness);
        assert_eq!(relative[0].mean_value, 0.0);
        for (a, r) in absolute.iter().zip(&relative).skip(1) {
            assert!((a.mean_value - baseline_fitness - r.mean_value).abs() < 1e-12);
            assert_eq!(a.runs, 2);
        }
    }

    #[test]
    fn test_from_coevolution() {
        let true_modules = build_true_modules(6, 2).unwrap();
        let landscape = build_modular_landscape(6, 2, &true_modules, 0.8, 4).unwrap();
        let config = CoevolutionConfig {
            num_firms: 3,
            rounds: 10,
            ..Default::default()
        };
        let players = ModuleDefinition::from_partition("T", &true_modules);
        let build = || {
            ModularTableBuilder::from_coevolution(
                &landscape,
                players.clone(),
                Design::zeros(6),
                &true_modules,
                &config,
                3,
                11,
            )
            .unwrap()
        };
        let builder = build();
        assert_eq!(builder.mature_designs().len(), 3);
        assert_eq!(builder.mature_designs(), build().mature_designs());
        let table = builder.notes("ethiraj2004").build_table(Some(1)).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table[0].notes, "ethiraj2004;empty coalition");
        assert_eq!(table[2].runs, 3);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let landscape = NkLandscape::random(4, 1, 2).unwrap();
        let no_mature =
            ModularTableBuilder::new(&landscape, modules(), Design::zeros(4), Vec::new());
        assert!(no_mature.is_err());
        let outside = vec![ModuleDefinition::new("X", vec![4])];
        assert!(
            ModularTableBuilder::new(&landscape, outside, Design::zeros(4), vec![Design::zeros(4)])
                .is_err()
        );
        assert_eq!(
            "relative".parse::<ValueBasis>().unwrap(),
            ValueBasis::RelativeToBaseline
        );
        assert!("sideways".parse::<ValueBasis>().is_err());
    }
}
