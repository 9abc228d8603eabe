//! NK landscape construction and evaluation
//!
//! Contribution tables are generated locus by locus, pattern index ascending,
//! from a single seeded draw sequence. Reordering any draw changes every
//! table after it, so the generation order is part of the reproducibility
//! contract.

use std::collections::{BTreeMap, BTreeSet};

use nkgames_common::{
    ConfigError, Design, NkError, Result, CONFLICT_PENALTY, DEFAULT_CONTRIBUTION_RANGE,
};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::debug;

/// Skill name -> `(low, high)` contribution draw range
pub type SkillProfile = BTreeMap<String, (f64, f64)>;

/// Locus -> skill name
pub type BitSkills = BTreeMap<usize, String>;

/// Epistatic fitness landscape over designs of length N
#[derive(Debug, Clone, Serialize)]
pub struct NkLandscape {
    n: usize,
    k: usize,
    dependencies: Vec<Vec<usize>>,
    tables: Vec<Vec<f64>>,
    skill_profile: Option<SkillProfile>,
    bit_skills: Option<BitSkills>,
    conflict_pairs: BTreeSet<(usize, usize)>,
}

impl NkLandscape {
    /// Start building a random landscape
    pub fn builder(n: usize, k: usize, seed: u64) -> LandscapeBuilder {
        LandscapeBuilder::new(n, k, seed)
    }

    /// Random landscape with uniform `[0, 1)` contributions and sampled dependencies
    pub fn random(n: usize, k: usize, seed: u64) -> Result<Self> {
        LandscapeBuilder::new(n, k, seed).build()
    }

    /// Assemble a landscape from explicit dependencies and tables
    pub fn from_parts(
        n: usize,
        k: usize,
        dependencies: Vec<Vec<usize>>,
        tables: Vec<Vec<f64>>,
    ) -> Result<Self> {
        check_shape(n, k)?;
        validate_dependencies(n, k, &dependencies)?;
        if tables.len() != n {
            return Err(ConfigError::InvalidTables(format!(
                "expected {} tables, got {}",
                n,
                tables.len()
            ))
            .into());
        }
        let width = 1usize << (k + 1);
        if let Some((locus, table)) = tables.iter().enumerate().find(|(_, t)| t.len() != width) {
            return Err(ConfigError::InvalidTables(format!(
                "table for locus {} has {} entries, expected {}",
                locus,
                table.len(),
                width
            ))
            .into());
        }
        Ok(Self {
            n,
            k,
            dependencies,
            tables,
            skill_profile: None,
            bit_skills: None,
            conflict_pairs: BTreeSet::new(),
        })
    }

    /// Design length
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Epistatic degree per locus
    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Dependency lists, one per locus
    pub fn dependencies(&self) -> &[Vec<usize>] {
        &self.dependencies
    }

    /// Contribution table of one locus
    pub fn table(&self, locus: usize) -> &[f64] {
        &self.tables[locus]
    }

    /// Normalized conflict pairs (`a < b`)
    pub fn conflict_pairs(&self) -> &BTreeSet<(usize, usize)> {
        &self.conflict_pairs
    }

    /// Skill profile used for contribution draws, if any
    pub fn skill_profile(&self) -> Option<&SkillProfile> {
        self.skill_profile.as_ref()
    }

    /// Skill assigned to a locus, if any
    pub fn skill_of(&self, locus: usize) -> Option<&str> {
        self.bit_skills.as_ref()?.get(&locus).map(String::as_str)
    }

    /// Fitness of a design: the mean of the N per-locus contributions
    pub fn evaluate(&self, design: &Design) -> Result<f64> {
        NkError::check_len(self.n, design.len())?;
        let total: f64 = (0..self.n).map(|locus| self.contribution(locus, design)).sum();
        Ok(total / self.n as f64)
    }

    /// Table index for a locus: `[locus, deps...]` folded most significant first.
    ///
    /// `design` must have length N.
    #[inline]
    pub fn pattern_index(&self, locus: usize, design: &Design) -> usize {
        self.dependencies[locus]
            .iter()
            .fold(design.bit(locus) as usize, |acc, &dep| {
                (acc << 1) | design.bit(dep) as usize
            })
    }

    /// Contribution of one locus. `design` must have length N.
    #[inline]
    pub fn contribution(&self, locus: usize, design: &Design) -> f64 {
        self.tables[locus][self.pattern_index(locus, design)]
    }

    /// Mean contribution over a subset of loci; `0.0` when `loci` is empty
    pub fn module_fitness(&self, design: &Design, loci: &[usize]) -> Result<f64> {
        NkError::check_len(self.n, design.len())?;
        if loci.is_empty() {
            return Ok(0.0);
        }
        for &locus in loci {
            ConfigError::check_bit(locus, self.n)?;
        }
        let total: f64 = loci.iter().map(|&locus| self.contribution(locus, design)).sum();
        Ok(total / loci.len() as f64)
    }

    /// One-bit neighbors of `design`, one per listed locus, in list order
    pub fn neighbors(&self, design: &Design, loci: &[usize]) -> Result<Vec<Design>> {
        NkError::check_len(self.n, design.len())?;
        loci.iter()
            .map(|&locus| {
                ConfigError::check_bit(locus, self.n)?;
                Ok(design.flipped(locus))
            })
            .collect()
    }

    /// Uniformly random design
    pub fn random_state<R: Rng + ?Sized>(&self, rng: &mut R) -> Design {
        let mut design = Design::zeros(self.n);
        for locus in 0..self.n {
            design.set(locus, rng.gen_range(0..2u8));
        }
        design
    }
}

/// Builder for random NK landscapes
#[derive(Debug, Clone)]
pub struct LandscapeBuilder {
    n: usize,
    k: usize,
    seed: u64,
    dependencies: Option<Vec<Vec<usize>>>,
    skill_profile: Option<SkillProfile>,
    bit_skills: Option<BitSkills>,
    conflict_pairs: Vec<(usize, usize)>,
}

impl LandscapeBuilder {
    /// Create a new builder
    pub fn new(n: usize, k: usize, seed: u64) -> Self {
        Self {
            n,
            k,
            seed,
            dependencies: None,
            skill_profile: None,
            bit_skills: None,
            conflict_pairs: Vec::new(),
        }
    }

    /// Use fixed dependencies instead of sampling them
    pub fn dependencies(mut self, dependencies: Vec<Vec<usize>>) -> Self {
        self.dependencies = Some(dependencies);
        self
    }

    /// Bias contribution draws by skill
    pub fn skills(mut self, profile: SkillProfile, bit_skills: BitSkills) -> Self {
        self.skill_profile = Some(profile);
        self.bit_skills = Some(bit_skills);
        self
    }

    /// Register conflicting locus pairs (unordered; self-pairs are dropped)
    pub fn conflict_pairs(mut self, pairs: impl IntoIterator<Item = (usize, usize)>) -> Self {
        self.conflict_pairs.extend(pairs);
        self
    }

    /// Build the landscape
    pub fn build(self) -> Result<NkLandscape> {
        check_shape(self.n, self.k)?;

        let conflict_pairs = normalize_conflicts(&self.conflict_pairs, self.n)?;
        self.validate_skills()?;

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let dependencies = match self.dependencies {
            Some(deps) => {
                validate_dependencies(self.n, self.k, &deps)?;
                deps
            }
            None => sample_dependencies(self.n, self.k, &mut rng),
        };

        let tables = (0..self.n)
            .map(|locus| {
                let range = skill_range(
                    locus,
                    self.skill_profile.as_ref(),
                    self.bit_skills.as_ref(),
                );
                generate_table(locus, &dependencies[locus], range, &conflict_pairs, &mut rng)
            })
            .collect();

        debug!(
            n = self.n,
            k = self.k,
            seed = self.seed,
            conflicts = conflict_pairs.len(),
            "Built NK landscape"
        );

        Ok(NkLandscape {
            n: self.n,
            k: self.k,
            dependencies,
            tables,
            skill_profile: self.skill_profile,
            bit_skills: self.bit_skills,
            conflict_pairs,
        })
    }

    fn validate_skills(&self) -> Result<()> {
        if let Some(profile) = &self.skill_profile {
            for (skill, &(low, high)) in profile {
                if !(low <= high) {
                    return Err(ConfigError::InvalidSkillRange {
                        skill: skill.clone(),
                        low,
                        high,
                    }
                    .into());
                }
            }
        }
        if let Some(bit_skills) = &self.bit_skills {
            for &bit in bit_skills.keys() {
                ConfigError::check_bit(bit, self.n)?;
            }
        }
        Ok(())
    }
}

fn check_shape(n: usize, k: usize) -> Result<()> {
    if n == 0 {
        return Err(ConfigError::NonPositiveCount { what: "N" }.into());
    }
    if k >= n {
        return Err(ConfigError::EpistasisTooLarge { n, k }.into());
    }
    Ok(())
}

fn validate_dependencies(n: usize, k: usize, dependencies: &[Vec<usize>]) -> Result<()> {
    if dependencies.len() != n {
        return Err(ConfigError::InvalidDependencies(format!(
            "expected {} dependency lists, got {}",
            n,
            dependencies.len()
        ))
        .into());
    }
    for (locus, deps) in dependencies.iter().enumerate() {
        if deps.len() != k {
            return Err(ConfigError::InvalidDependencies(format!(
                "locus {} has {} dependencies, expected {}",
                locus,
                deps.len(),
                k
            ))
            .into());
        }
        let mut seen = BTreeSet::new();
        for &dep in deps {
            ConfigError::check_bit(dep, n)?;
            if dep == locus {
                return Err(ConfigError::InvalidDependencies(format!(
                    "locus {} depends on itself",
                    locus
                ))
                .into());
            }
            if !seen.insert(dep) {
                return Err(ConfigError::InvalidDependencies(format!(
                    "locus {} lists dependency {} twice",
                    locus, dep
                ))
                .into());
            }
        }
    }
    Ok(())
}

/// For each locus, K distinct other loci in random order
fn sample_dependencies<R: Rng + ?Sized>(n: usize, k: usize, rng: &mut R) -> Vec<Vec<usize>> {
    (0..n)
        .map(|locus| {
            if k == 0 {
                return Vec::new();
            }
            let others: Vec<usize> = (0..n).filter(|&i| i != locus).collect();
            index::sample(rng, others.len(), k)
                .into_iter()
                .map(|i| others[i])
                .collect()
        })
        .collect()
}

fn normalize_conflicts(pairs: &[(usize, usize)], n: usize) -> Result<BTreeSet<(usize, usize)>> {
    let mut normalized = BTreeSet::new();
    for &(a, b) in pairs {
        ConfigError::check_bit(a, n)?;
        ConfigError::check_bit(b, n)?;
        if a != b {
            normalized.insert((a.min(b), a.max(b)));
        }
    }
    Ok(normalized)
}

fn skill_range(
    locus: usize,
    profile: Option<&SkillProfile>,
    bit_skills: Option<&BitSkills>,
) -> (f64, f64) {
    match (profile, bit_skills) {
        (Some(profile), Some(bit_skills)) => bit_skills
            .get(&locus)
            .and_then(|skill| profile.get(skill))
            .copied()
            .unwrap_or(DEFAULT_CONTRIBUTION_RANGE),
        _ => DEFAULT_CONTRIBUTION_RANGE,
    }
}

fn generate_table<R: Rng + ?Sized>(
    locus: usize,
    deps: &[usize],
    (low, high): (f64, f64),
    conflicts: &BTreeSet<(usize, usize)>,
    rng: &mut R,
) -> Vec<f64> {
    let width = deps.len() + 1;
    let local_bits: Vec<usize> = std::iter::once(locus).chain(deps.iter().copied()).collect();
    (0..1usize << width)
        .map(|pattern| {
            // one draw per pattern, even when low == high
            let u: f64 = rng.gen();
            let value = low + (high - low) * u;
            if has_conflict(pattern, &local_bits, conflicts) {
                value * CONFLICT_PENALTY
            } else {
                value
            }
        })
        .collect()
}

/// Whether `pattern` sets both loci of any conflict pair present in `local_bits`
fn has_conflict(
    pattern: usize,
    local_bits: &[usize],
    conflicts: &BTreeSet<(usize, usize)>,
) -> bool {
    if conflicts.is_empty() {
        return false;
    }
    let width = local_bits.len();
    let value_of = |locus: usize| {
        local_bits
            .iter()
            .position(|&b| b == locus)
            .map(|pos| (pattern >> (width - 1 - pos)) & 1)
    };
    conflicts
        .iter()
        .any(|&(a, b)| value_of(a) == Some(1) && value_of(b) == Some(1))
}
