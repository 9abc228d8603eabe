//! Core data types for NK game-table generation

pub mod design;
pub mod player;
pub mod record;
