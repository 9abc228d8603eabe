//! Canonical coalition enumeration

/// Iterator over coalitions as ascending position lists.
///
/// Yields `[]` first, then every size-1 coalition, every size-2 coalition,
/// and so on, each size in lexicographic order of positions.
#[derive(Debug, Clone)]
pub struct CoalitionEnumerator {
    n: usize,
    limit: usize,
    current: Option<Vec<usize>>,
    started: bool,
}

impl CoalitionEnumerator {
    /// Enumerate subsets of `n` positions; `None` or `Some(0)` means no size limit
    pub fn new(n: usize, max_size: Option<usize>) -> Self {
        Self {
            n,
            limit: size_limit(n, max_size),
            current: None,
            started: false,
        }
    }

    /// Largest coalition size that will be yielded
    pub fn limit(&self) -> usize {
        self.limit
    }

    fn advance(&self, mut positions: Vec<usize>) -> Option<Vec<usize>> {
        let size = positions.len();
        // rightmost position that can still move right
        for i in (0..size).rev() {
            if positions[i] < self.n - size + i {
                positions[i] += 1;
                for j in i + 1..size {
                    positions[j] = positions[j - 1] + 1;
                }
                return Some(positions);
            }
        }
        let size = size + 1;
        if size > self.limit {
            return None;
        }
        Some((0..size).collect())
    }
}

impl Iterator for CoalitionEnumerator {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = match self.current.take() {
            Some(previous) => self.advance(previous),
            None if !self.started => {
                self.started = true;
                Some(Vec::new())
            }
            None => None,
        };
        self.current = next.clone();
        next
    }
}

/// A zero limit is treated as unset
fn size_limit(n: usize, max_size: Option<usize>) -> usize {
    match max_size {
        Some(m) if m > 0 => m.min(n),
        _ => n,
    }
}

/// Coalitions of `players` as member references, in canonical order
pub fn enumerate_coalitions<T>(
    players: &[T],
    max_size: Option<usize>,
) -> impl Iterator<Item = Vec<&T>> + '_ {
    CoalitionEnumerator::new(players.len(), max_size)
        .map(move |positions| positions.into_iter().map(|p| &players[p]).collect())
}

/// `Σ_{k=0}^{m} C(n, k)` with `m = min(n, max_size)`
pub fn coalition_count(n: usize, max_size: Option<usize>) -> u128 {
    let limit = size_limit(n, max_size);
    let mut total = 0u128;
    let mut binomial = 1u128;
    for k in 0..=limit {
        total += binomial;
        binomial = binomial * (n - k) as u128 / (k + 1) as u128;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_two_players_truncated() {
        let players = ["a", "b"];
        let coalitions: Vec<Vec<&str>> = enumerate_coalitions(&players[..], Some(1))
            .map(|c| c.into_iter().copied().collect())
            .collect();
        assert_eq!(coalitions, vec![vec![], vec!["a"], vec!["b"]]);
    }

    #[test]
    fn test_full_order_for_four() {
        let all: Vec<Vec<usize>> = CoalitionEnumerator::new(4, None).collect();
        assert_eq!(all.len(), 16);
        assert_eq!(all[0], Vec::<usize>::new());
        let singles: Vec<Vec<usize>> = vec![vec![0], vec![1], vec![2], vec![3]];
        assert_eq!(all[1..5].to_vec(), singles);
        let pairs: Vec<Vec<usize>> = vec![
            vec![0, 1],
            vec![0, 2],
            vec![0, 3],
            vec![1, 2],
            vec![1, 3],
            vec![2, 3],
        ];
        assert_eq!(all[5..11].to_vec(), pairs);
        assert_eq!(all[15], vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_no_players() {
        let all: Vec<Vec<usize>> = CoalitionEnumerator::new(0, None).collect();
        assert_eq!(all, vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_zero_max_size_means_unlimited() {
        let all: Vec<Vec<usize>> = CoalitionEnumerator::new(3, Some(0)).collect();
        assert_eq!(all.len(), 8);
        assert_eq!(all, CoalitionEnumerator::new(3, None).collect::<Vec<_>>());
        assert_eq!(coalition_count(3, Some(0)), 8);
        assert_eq!(enumerate_coalitions(&["a", "b"], Some(0)).count(), 4);
    }

    #[test]
    fn test_oversized_limit_clamps() {
        let enumerator = CoalitionEnumerator::new(3, Some(10));
        assert_eq!(enumerator.limit(), 3);
        assert_eq!(enumerator.count(), 8);
    }

    #[test]
    fn test_coalition_count() {
        assert_eq!(coalition_count(10, None), 1024);
        assert_eq!(coalition_count(10, Some(2)), 1 + 10 + 45);
        assert_eq!(coalition_count(64, None), 1u128 << 64);
    }

    proptest! {
        #[test]
        fn test_enumeration_count_and_order(
            n in 0usize..9,
            max in proptest::option::of(0usize..10),
        ) {
            let all: Vec<Vec<usize>> = CoalitionEnumerator::new(n, max).collect();
            prop_assert_eq!(all.len() as u128, coalition_count(n, max));
            prop_assert!(all[0].is_empty());
            for pair in all.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                prop_assert!(a.len() < b.len() || (a.len() == b.len() && a < b));
            }
            for coalition in &all {
                prop_assert!(coalition.windows(2).all(|w| w[0] < w[1]));
                prop_assert!(coalition.iter().all(|&p| p < n));
            }
        }
    }
}
