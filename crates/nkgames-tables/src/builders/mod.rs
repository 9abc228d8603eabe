//! Game-table builders, one per adaptation scenario

pub mod constrained;
pub mod modular;
pub mod social;

pub use constrained::ConstrainedTableBuilder;
pub use modular::{ModularTableBuilder, ValueBasis};
pub use social::SocialTableBuilder;

use nkgames_common::EMPTY_COALITION_NOTE;

/// Append the empty-coalition marker to an optional base note
pub(crate) fn annotate(base: &str, marker: &str) -> String {
    if base.is_empty() {
        marker.to_string()
    } else {
        format!("{};{}", base, marker)
    }
}

pub(crate) fn empty_coalition_note(base: &str) -> String {
    annotate(base, EMPTY_COALITION_NOTE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_coalition_note() {
        assert_eq!(empty_coalition_note(""), "empty coalition");
        assert_eq!(empty_coalition_note("lazer"), "lazer;empty coalition");
    }
}
