//! # NK Landscape
//!
//! Epistatic fitness landscapes over bit-string designs.
//!
//! ## Fitness Formula
//!
//! ```text
//! F(d) = (1/N) × Σᵢ tableᵢ[ pattern(dᵢ, d_dep(i,0), …, d_dep(i,K-1)) ]
//! ```
//!
//! Each locus reads its own bit followed by its K dependency bits, most
//! significant first, and looks the pattern up in a table of `2^(K+1)`
//! contributions. Fitness is the mean over loci, never the sum.
//!
//! ## Biases
//!
//! - Skill profile: a locus assigned a skill draws its contributions from that
//!   skill's `[low, high)` range instead of `[0, 1)`
//! - Conflict pairs: patterns where both loci of a registered pair are 1 have
//!   their drawn contribution halved
//!
//! ## Modular structure
//!
//! [`modular`] samples dependencies that prefer loci from the same module,
//! for co-evolution scenarios.

pub mod landscape;
pub mod modular;

pub use landscape::{BitSkills, LandscapeBuilder, NkLandscape, SkillProfile};
pub use modular::{
    build_designer_modules, build_modular_landscape, build_true_modules,
    sample_modular_dependencies,
};
