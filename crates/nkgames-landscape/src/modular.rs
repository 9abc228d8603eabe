//! Modular landscape structure
//!
//! True modules partition the loci; dependencies are sampled to prefer loci
//! in the same module with probability `intra_bias`. Designer modules are the
//! (possibly different) partition that firms search over.

use nkgames_common::bits::split_bits_evenly;
use nkgames_common::{ConfigError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::landscape::NkLandscape;

/// Partition loci into `module_count` true modules
pub fn build_true_modules(n: usize, module_count: usize) -> Result<Vec<Vec<usize>>> {
    split_bits_evenly(n, module_count)
}

/// Partition loci into the designer's perceived modules
pub fn build_designer_modules(n: usize, designer_count: usize) -> Result<Vec<Vec<usize>>> {
    split_bits_evenly(n, designer_count)
}

/// Sample K dependencies per locus, biased toward the locus's own module.
///
/// Per draw: with probability `intra_bias` (and a non-empty same-module pool)
/// the candidate comes from the same module, otherwise from the other modules
/// (or the same module if no others exist). Self and repeated candidates are
/// rejected. When every pool is exhausted the remaining slots are filled
/// uniformly from all loci.
pub fn sample_modular_dependencies<R: Rng + ?Sized>(
    n: usize,
    k: usize,
    modules: &[Vec<usize>],
    intra_bias: f64,
    rng: &mut R,
) -> Result<Vec<Vec<usize>>> {
    ConfigError::check_probability("intra_bias", intra_bias)?;
    if k >= n {
        return Err(ConfigError::EpistasisTooLarge { n, k }.into());
    }
    let module_of = module_map(n, modules)?;

    let mut dependencies = Vec::with_capacity(n);
    for bit in 0..n {
        if k == 0 {
            dependencies.push(Vec::new());
            continue;
        }
        let home = module_of[bit];
        let same: Vec<usize> = modules[home].iter().copied().filter(|&b| b != bit).collect();
        let other: Vec<usize> = (0..n).filter(|&b| module_of[b] != home).collect();

        let mut deps: Vec<usize> = Vec::with_capacity(k);
        while deps.len() < k {
            let fresh = |pool: &[usize], deps: &[usize]| pool.iter().any(|b| !deps.contains(b));
            if !fresh(&same, &deps) && !fresh(&other, &deps) {
                break;
            }
            let prefer_same = rng.gen::<f64>() < intra_bias && !same.is_empty();
            let mut use_same = prefer_same || other.is_empty();
            if !fresh(if use_same { &same } else { &other }, &deps) {
                use_same = !use_same;
            }
            let pool = if use_same { &same } else { &other };
            let candidate = pool[rng.gen_range(0..pool.len())];
            if candidate == bit || deps.contains(&candidate) {
                continue;
            }
            deps.push(candidate);
        }
        while deps.len() < k {
            let fallback = rng.gen_range(0..n);
            if fallback == bit || deps.contains(&fallback) {
                continue;
            }
            deps.push(fallback);
        }
        dependencies.push(deps);
    }
    Ok(dependencies)
}

/// Landscape whose dependencies follow `true_modules`.
///
/// Dependencies and contribution tables are drawn from two generators seeded
/// with the same `seed`.
pub fn build_modular_landscape(
    n: usize,
    k: usize,
    true_modules: &[Vec<usize>],
    intra_bias: f64,
    seed: u64,
) -> Result<NkLandscape> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let dependencies = sample_modular_dependencies(n, k, true_modules, intra_bias, &mut rng)?;
    NkLandscape::builder(n, k, seed)
        .dependencies(dependencies)
        .build()
}

/// Locus -> module index; later modules win for overlapping loci
fn module_map(n: usize, modules: &[Vec<usize>]) -> Result<Vec<usize>> {
    let mut module_of = vec![None; n];
    for (idx, bits) in modules.iter().enumerate() {
        for &bit in bits {
            ConfigError::check_bit(bit, n)?;
            module_of[bit] = Some(idx);
        }
    }
    module_of
        .into_iter()
        .enumerate()
        .map(|(bit, module)| {
            module.ok_or_else(|| {
                ConfigError::InvalidDependencies(format!("locus {} belongs to no module", bit))
                    .into()
            })
        })
        .collect()
}
