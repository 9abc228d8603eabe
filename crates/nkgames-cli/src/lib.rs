//! # nk-games
//!
//! Runs one NK game-table experiment from a YAML configuration:
//!
//! ```text
//! YAML + NK_GAMES__* env -> ExperimentConfig -> Experiment -> table builder -> CSV / JSON
//! ```
//!
//! The scenario type selects the builder: `lazer2007` (social learning),
//! `levinthal1997` (constrained search), or `ethiraj2004` (modular adoption).

pub mod config;
pub mod output;
pub mod pipeline;

pub use config::{Experiment, ExperimentConfig, ScenarioType};
pub use output::{write_table, OutputFormat};
pub use pipeline::build_table;
