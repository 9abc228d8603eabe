//! GameTableRecord - one row of a cooperative-game value table

use serde::{Deserialize, Serialize};

/// Value of one coalition, aggregated across repeated trials.
///
/// Field order is the table's column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameTableRecord {
    /// Rank of the coalition in canonical enumeration order
    pub coalition_id: usize,
    /// Member player identifiers, in player-list order
    pub members: Vec<String>,
    /// Coalition size
    pub size: usize,
    /// Mean value across trials
    pub mean_value: f64,
    /// Population standard deviation across trials
    pub std_value: f64,
    /// Number of trials that produced the value
    pub runs: usize,
    /// Free-form scenario annotation
    pub notes: String,
}

impl GameTableRecord {
    /// Whether this record describes the empty coalition
    pub fn is_empty_coalition(&self) -> bool {
        self.size == 0
    }
}
