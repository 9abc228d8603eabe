//! Experiment configuration
//!
//! Loaded from a YAML file with `NK_GAMES__`-prefixed environment overrides
//! (`NK_GAMES__SIMULATION__ROUNDS=50`). Keys are case-insensitive, so `N`
//! and `n` are the same key. Names (scenario, topology, protocol, modes) stay
//! strings until [`ExperimentConfig::validate`] resolves them to closed enums.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use nkgames_common::{ConfigError, Design, SearchPlayer};
use nkgames_dynamics::{
    AcceptanceRule, CoevolutionConfig, InitStrategy, InitialStates, LocalSearchConfig,
    NetworkParams, NetworkTopology, RecombinationMode, SearchScope, SimulationConfig,
};
use nkgames_landscape::{BitSkills, SkillProfile};
use nkgames_tables::{GameValueProtocol, ValueBasis};
use serde::{Deserialize, Serialize};

/// Environment prefix for overrides
pub const ENV_PREFIX: &str = "NK_GAMES";

/// Raw experiment configuration, as written in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Number of loci
    pub n: usize,
    /// Epistatic dependencies per locus
    pub k: usize,
    #[serde(default)]
    pub scenario: ScenarioSettings,
    #[serde(default)]
    pub network: NetworkSettings,
    #[serde(default)]
    pub simulation: SimulationSettings,
    #[serde(default)]
    pub game_table: GameTableSettings,
    #[serde(default)]
    pub seeds: SeedSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub landscape: LandscapeSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub ethiraj: EthirajSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSettings {
    #[serde(rename = "type")]
    pub kind: String,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            kind: "lazer2007".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub params: NetworkParams,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            kind: "LINE".to_string(),
            params: NetworkParams::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub rounds: usize,
    pub velocity: f64,
    pub error_rate: f64,
    pub local_search_scope: String,
    pub accept_equal: bool,
    pub initial_states: String,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            rounds: 200,
            velocity: 1.0,
            error_rate: 0.0,
            local_search_scope: "assigned".to_string(),
            accept_equal: true,
            initial_states: "random".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameTableSettings {
    /// Runs (social, modular) or trials (constrained) per coalition
    pub runs: usize,
    pub protocol: String,
    pub max_coalition_size: Option<usize>,
}

impl Default for GameTableSettings {
    fn default() -> Self {
        Self {
            runs: 3,
            protocol: "average_final_score".to_string(),
            max_coalition_size: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedSettings {
    pub random: Option<u64>,
    pub landscape: Option<u64>,
    pub network: Option<u64>,
}

impl SeedSettings {
    /// Builder seed; 0 when unset
    pub fn random_seed(&self) -> u64 {
        self.random.unwrap_or(0)
    }

    /// Landscape seed, falling back to the random seed
    pub fn landscape_seed(&self) -> u64 {
        self.landscape.unwrap_or_else(|| self.random_seed())
    }

    /// Network seed, falling back to the random seed
    pub fn network_seed(&self) -> u64 {
        self.network.unwrap_or_else(|| self.random_seed())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub path: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("outputs/tables/lazer2007_baseline.csv"),
        }
    }
}

/// Landscape biases
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeSettings {
    /// Skill name -> `[low, high]` contribution range
    pub skill_profile: BTreeMap<String, (f64, f64)>,
    /// Locus (as a string key) -> skill name
    pub bit_skills: BTreeMap<String, String>,
    pub conflict_pairs: Vec<(usize, usize)>,
}

/// Constrained search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub max_steps: usize,
    pub stall_limit: usize,
    pub noise_accept_prob: f64,
    pub init_strategy: String,
    pub perturb_prob: f64,
    pub acceptance: String,
    /// Defaults to all zeros
    pub baseline_state: Option<String>,
    /// Defaults to one player per bit
    pub players: Option<Vec<PlayerSettings>>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_steps: 250,
            stall_limit: 50,
            noise_accept_prob: 0.0,
            init_strategy: "random".to_string(),
            perturb_prob: 0.15,
            acceptance: "versus_current".to_string(),
            baseline_state: None,
            players: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSettings {
    /// Defaults to the player's position
    pub id: Option<String>,
    #[serde(default)]
    pub bits: Vec<usize>,
}

/// Modular co-evolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EthirajSettings {
    pub true_modules: usize,
    /// Defaults to `true_modules`
    pub designer_modules: Option<usize>,
    /// `true` or `designer`
    pub players_basis: String,
    /// Probability that a dependency is drawn from the locus's own module
    pub intra_density: f64,
    pub firms: usize,
    /// Defaults to `simulation.rounds`
    pub rounds: Option<usize>,
    pub recombination_interval: usize,
    pub recombination_mode: String,
    pub value_basis: String,
    pub baseline_state: Option<String>,
}

impl Default for EthirajSettings {
    fn default() -> Self {
        Self {
            true_modules: 3,
            designer_modules: None,
            players_basis: "designer".to_string(),
            intra_density: 0.8,
            firms: 10,
            rounds: None,
            recombination_interval: 5,
            recombination_mode: "module".to_string(),
            value_basis: "absolute".to_string(),
            baseline_state: None,
        }
    }
}

/// Which experiment family to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioType {
    /// Social learning on a network
    Lazer2007,
    /// Constrained local search
    Levinthal1997,
    /// Modular co-evolution
    Ethiraj2004,
}

impl ScenarioType {
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioType::Lazer2007 => "lazer2007",
            ScenarioType::Levinthal1997 => "levinthal1997",
            ScenarioType::Ethiraj2004 => "ethiraj2004",
        }
    }
}

impl std::str::FromStr for ScenarioType {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lazer2007" => Ok(ScenarioType::Lazer2007),
            "levinthal1997" => Ok(ScenarioType::Levinthal1997),
            "ethiraj2004" => Ok(ScenarioType::Ethiraj2004),
            _ => Err(ConfigError::unsupported("scenario type", s)),
        }
    }
}

/// Whose modules are the table's players
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayersBasis {
    True,
    Designer,
}

impl PlayersBasis {
    /// Module name prefix
    pub fn prefix(&self) -> &'static str {
        match self {
            PlayersBasis::True => "T",
            PlayersBasis::Designer => "D",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlayersBasis::True => "true",
            PlayersBasis::Designer => "designer",
        }
    }
}

/// Landscape parameters after validation
#[derive(Debug, Clone)]
pub struct LandscapePlan {
    pub n: usize,
    pub k: usize,
    pub seed: u64,
    pub skills: Option<(SkillProfile, BitSkills)>,
    pub conflict_pairs: Vec<(usize, usize)>,
}

/// Modular scenario parameters after validation
#[derive(Debug, Clone)]
pub struct ModularPlan {
    pub true_modules: usize,
    pub designer_modules: usize,
    pub players_basis: PlayersBasis,
    pub intra_density: f64,
    pub coevolution: CoevolutionConfig,
    pub value_basis: ValueBasis,
    pub baseline: Design,
}

/// A fully resolved experiment: every name is an enum, every value checked
#[derive(Debug, Clone)]
pub struct Experiment {
    pub scenario: ScenarioType,
    pub landscape: LandscapePlan,
    pub topology: NetworkTopology,
    pub network_params: NetworkParams,
    pub simulation: SimulationConfig,
    pub protocol: GameValueProtocol,
    pub runs: usize,
    pub max_coalition_size: Option<usize>,
    pub random_seed: u64,
    pub network_seed: u64,
    pub search: LocalSearchConfig,
    pub search_baseline: Design,
    pub players: Option<Vec<SearchPlayer>>,
    pub modular: ModularPlan,
    pub output_path: PathBuf,
}

impl ExperimentConfig {
    /// Load from a YAML file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Yaml))
            .add_source(environment())
            .build()
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        settings
            .try_deserialize()
            .with_context(|| format!("Invalid experiment config {}", path.display()))
    }

    /// Load from YAML text, without environment overrides
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(content, FileFormat::Yaml))
            .build()
            .context("Failed to parse config")?;
        settings
            .try_deserialize()
            .context("Invalid experiment config")
    }

    /// Resolve names to enums and reject out-of-range values
    pub fn validate(&self) -> Result<Experiment> {
        if self.n == 0 {
            return Err(ConfigError::NonPositiveCount { what: "N" }.into());
        }
        if self.k >= self.n {
            return Err(ConfigError::EpistasisTooLarge {
                n: self.n,
                k: self.k,
            }
            .into());
        }
        let scenario: ScenarioType = self.scenario.kind.parse()?;

        let simulation = SimulationConfig {
            rounds: self.simulation.rounds,
            velocity: self.simulation.velocity,
            error_rate: self.simulation.error_rate,
            search_scope: self.simulation.local_search_scope.parse::<SearchScope>()?,
            accept_equal: self.simulation.accept_equal,
            initial_states: parse_initial_states(&self.simulation.initial_states)?,
        };
        simulation.validate()?;

        let search = LocalSearchConfig {
            max_steps: self.search.max_steps,
            stall_limit: self.search.stall_limit,
            noise_accept_prob: self.search.noise_accept_prob,
            init_strategy: self.search.init_strategy.parse::<InitStrategy>()?,
            perturb_prob: self.search.perturb_prob,
            acceptance: self.search.acceptance.parse::<AcceptanceRule>()?,
        };
        search.validate()?;

        let eth = &self.ethiraj;
        ConfigError::check_probability("intra_density", eth.intra_density)?;
        let players_basis = match eth.players_basis.to_ascii_lowercase().as_str() {
            "true" => PlayersBasis::True,
            "designer" => PlayersBasis::Designer,
            other => return Err(ConfigError::unsupported("players basis", other).into()),
        };
        let modular = ModularPlan {
            true_modules: eth.true_modules,
            designer_modules: eth.designer_modules.unwrap_or(eth.true_modules),
            players_basis,
            intra_density: eth.intra_density,
            coevolution: CoevolutionConfig {
                num_firms: eth.firms,
                rounds: eth.rounds.unwrap_or(self.simulation.rounds),
                recombination_interval: eth.recombination_interval,
                recombination_mode: eth.recombination_mode.parse::<RecombinationMode>()?,
            },
            value_basis: eth.value_basis.parse::<ValueBasis>()?,
            baseline: self.baseline(eth.baseline_state.as_deref())?,
        };

        if self.game_table.runs == 0 {
            bail!(ConfigError::NonPositiveCount { what: "runs" });
        }

        Ok(Experiment {
            scenario,
            landscape: self.landscape_plan()?,
            topology: self.network.kind.parse::<NetworkTopology>()?,
            network_params: self.network.params.clone(),
            simulation,
            protocol: self.game_table.protocol.parse::<GameValueProtocol>()?,
            runs: self.game_table.runs,
            max_coalition_size: self.game_table.max_coalition_size,
            random_seed: self.seeds.random_seed(),
            network_seed: self.seeds.network_seed(),
            search,
            search_baseline: self.baseline(self.search.baseline_state.as_deref())?,
            players: self.players()?,
            modular,
            output_path: self.output.path.clone(),
        })
    }

    fn baseline(&self, bitstring: Option<&str>) -> Result<Design> {
        Ok(match bitstring {
            Some(text) => Design::parse(text, self.n)?,
            None => Design::zeros(self.n),
        })
    }

    fn players(&self) -> Result<Option<Vec<SearchPlayer>>> {
        let Some(entries) = &self.search.players else {
            return Ok(None);
        };
        if entries.is_empty() {
            return Ok(None);
        }
        let players = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                let id = entry.id.clone().unwrap_or_else(|| idx.to_string());
                SearchPlayer::new(id, entry.bits.iter().copied(), self.n)
            })
            .collect::<nkgames_common::Result<Vec<_>>>()?;
        Ok(Some(players))
    }

    fn landscape_plan(&self) -> Result<LandscapePlan> {
        let settings = &self.landscape;
        let skills = if settings.skill_profile.is_empty() || settings.bit_skills.is_empty() {
            None
        } else {
            // skill names are matched case-insensitively
            let profile: SkillProfile = settings
                .skill_profile
                .iter()
                .map(|(name, range)| (name.to_ascii_lowercase(), *range))
                .collect();
            let mut bit_skills = BitSkills::new();
            for (locus, skill) in &settings.bit_skills {
                let locus: usize = locus.trim().parse().map_err(|_| {
                    ConfigError::InvalidParameter {
                        name: "bit_skills",
                        reason: format!("locus key '{}' is not an integer", locus),
                    }
                })?;
                ConfigError::check_bit(locus, self.n)?;
                bit_skills.insert(locus, skill.to_ascii_lowercase());
            }
            Some((profile, bit_skills))
        };
        Ok(LandscapePlan {
            n: self.n,
            k: self.k,
            seed: self.seeds.landscape_seed(),
            skills,
            conflict_pairs: settings.conflict_pairs.clone(),
        })
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn parse_initial_states(name: &str) -> std::result::Result<InitialStates, ConfigError> {
    match name.to_ascii_lowercase().as_str() {
        "random" => Ok(InitialStates::Random),
        "zeros" => Ok(InitialStates::Zeros),
        _ => Err(ConfigError::unsupported("initial states", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAZER: &str = r#"
N: 6
K: 2
scenario:
  type: lazer2007
network:
  type: small_world
  params:
    k: 2
    beta: 0.2
simulation:
  rounds: 40
  velocity: 0.5
game_table:
  runs: 4
  protocol: avg_final
  max_coalition_size: 2
seeds:
  random: 7
  landscape: 11
output:
  path: out/table.csv
landscape:
  skill_profile:
    rnd: [0.2, 0.9]
  bit_skills:
    "0": rnd
    "3": rnd
  conflict_pairs:
    - [0, 1]
"#;

    #[test]
    fn test_lazer_config_resolves() {
        let config = ExperimentConfig::from_yaml_str(LAZER).unwrap();
        assert_eq!(config.n, 6);
        let exp = config.validate().unwrap();
        assert_eq!(exp.scenario, ScenarioType::Lazer2007);
        assert_eq!(exp.topology, NetworkTopology::SmallWorld);
        assert_eq!(exp.network_params.k, 2);
        assert_eq!(exp.network_params.p, 0.3);
        assert_eq!(exp.simulation.rounds, 40);
        assert_eq!(exp.simulation.error_rate, 0.0);
        assert_eq!(exp.protocol, GameValueProtocol::AverageFinalScore);
        assert_eq!(exp.runs, 4);
        assert_eq!(exp.max_coalition_size, Some(2));
        assert_eq!(exp.random_seed, 7);
        assert_eq!(exp.landscape.seed, 11);
        assert_eq!(exp.network_seed, 7);
        assert_eq!(exp.output_path, PathBuf::from("out/table.csv"));
        let (profile, bit_skills) = exp.landscape.skills.unwrap();
        assert_eq!(profile["rnd"], (0.2, 0.9));
        assert_eq!(bit_skills.get(&3).map(String::as_str), Some("rnd"));
        assert_eq!(exp.landscape.conflict_pairs, vec![(0, 1)]);
    }

    #[test]
    fn test_defaults() {
        let exp = ExperimentConfig::from_yaml_str("N: 4\nK: 1\n")
            .unwrap()
            .validate()
            .unwrap();
        assert_eq!(exp.scenario, ScenarioType::Lazer2007);
        assert_eq!(exp.topology, NetworkTopology::Line);
        assert_eq!(exp.runs, 3);
        assert_eq!(exp.simulation.rounds, 200);
        assert_eq!(exp.search.max_steps, 250);
        assert_eq!(exp.search_baseline, Design::zeros(4));
        assert!(exp.players.is_none());
        assert_eq!(exp.modular.designer_modules, 3);
        assert_eq!(exp.modular.coevolution.rounds, 200);
        assert_eq!(exp.modular.players_basis, PlayersBasis::Designer);
    }

    #[test]
    fn test_levinthal_players() {
        let yaml = r#"
N: 5
K: 1
scenario:
  type: levinthal1997
search:
  baseline_state: "10101"
  acceptance: versus_best
  players:
    - id: rnd
      bits: [2, 0, 2]
    - bits: [4]
"#;
        let exp = ExperimentConfig::from_yaml_str(yaml)
            .unwrap()
            .validate()
            .unwrap();
        assert_eq!(exp.scenario, ScenarioType::Levinthal1997);
        assert_eq!(exp.search.acceptance, AcceptanceRule::VersusBest);
        assert_eq!(exp.search_baseline.to_string(), "10101");
        let players = exp.players.unwrap();
        assert_eq!(players[0].player_id, "rnd");
        assert_eq!(players[0].bits, vec![0, 2]);
        assert_eq!(players[1].player_id, "1");
    }

    #[test]
    fn test_bundled_configs_validate() {
        let bundled = [
            (
                include_str!("../config/lazer2007_baseline.yml"),
                ScenarioType::Lazer2007,
            ),
            (
                include_str!("../config/levinthal1997_constrained.yml"),
                ScenarioType::Levinthal1997,
            ),
            (
                include_str!("../config/ethiraj2004_modular.yml"),
                ScenarioType::Ethiraj2004,
            ),
        ];
        for (yaml, scenario) in bundled {
            let exp = ExperimentConfig::from_yaml_str(yaml)
                .unwrap()
                .validate()
                .unwrap();
            assert_eq!(exp.scenario, scenario);
        }
    }

    #[test]
    fn test_rejects_invalid_values() {
        let cases = [
            "N: 4\nK: 4\n",
            "N: 4\nK: 1\nscenario:\n  type: march1991\n",
            "N: 4\nK: 1\nnetwork:\n  type: star\n",
            "N: 4\nK: 1\nsimulation:\n  velocity: 1.5\n",
            "N: 4\nK: 1\ngame_table:\n  runs: 0\n",
            "N: 4\nK: 1\nsearch:\n  players:\n    - bits: [9]\n",
            "N: 4\nK: 1\nethiraj:\n  recombination_mode: swap\n",
            "N: 4\nK: 1\nsearch:\n  baseline_state: \"101\"\n",
        ];
        for yaml in cases {
            let config = ExperimentConfig::from_yaml_str(yaml).unwrap();
            assert!(config.validate().is_err(), "accepted: {}", yaml);
        }
    }
}
