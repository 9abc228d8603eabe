//! Locus partitioning helpers

use crate::error::{ConfigError, Result};

/// Partition loci `0..num_bits` into `groups` groups round-robin.
///
/// Locus `i` lands in group `i % groups`, so group sizes differ by at most one.
pub fn split_bits_evenly(num_bits: usize, groups: usize) -> Result<Vec<Vec<usize>>> {
    if groups == 0 {
        return Err(ConfigError::NonPositiveCount { what: "group count" }.into());
    }
    let mut partitions = vec![Vec::new(); groups];
    for idx in 0..num_bits {
        partitions[idx % groups].push(idx);
    }
    Ok(partitions)
}

/// Sorted union of several bit lists
pub fn union_sorted<'a>(lists: impl IntoIterator<Item = &'a [usize]>) -> Vec<usize> {
    let mut merged: Vec<usize> = lists.into_iter().flatten().copied().collect();
    merged.sort_unstable();
    merged.dedup();
    merged
}
