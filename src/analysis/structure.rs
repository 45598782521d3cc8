//! Self-structure scans: hairpin stems and self-dimer diagonals
//!
//! Both scans are O(n²) over the primer and only look at Watson-Crick
//! pairs; any symbol outside the alphabet breaks a stem and never counts
//! towards a dimer.

use serde::{Deserialize, Serialize};

use super::nucleotide::pairs_with;

/// Length of the longest complementary stem the primer can fold into.
///
/// For every start offset the left pointer begins at the offset and the right
/// pointer at the last base. Each step moves the right pointer one base
/// inward; the left pointer only advances while the two bases pair. A
/// mismatch ends the current stem but the scan carries on from the current
/// pointer positions rather than restarting.
pub fn longest_hairpin_stem(seq: &[char]) -> usize {
    let n = seq.len();
    let mut longest = 0;

    for start in 0..n {
        let mut left = start;
        let mut right = n - 1;
        let mut stem = 0;

        // `stem` counts consecutive pairs since the last mismatch
        while right > left {
            if pairs_with(seq[left], seq[right]) {
                stem += 1;
                left += 1;
            } else {
                stem = 0;
            }
            longest = longest.max(stem);
            right -= 1;
        }
    }

    longest
}

/// One diagonal of the primer-versus-reversed-primer matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimerDiagonal {
    /// Number of complementary positions on the diagonal (not necessarily contiguous)
    pub pairs: usize,
    /// Number of positions the two copies overlap on this diagonal
    pub overlap: usize,
}

impl DimerDiagonal {
    pub fn percentage(&self) -> f64 {
        self.pairs as f64 / self.overlap as f64 * 100.0
    }
}

/// Diagonal start cells in scan order.
///
/// Rows index the reversed primer, columns the primer. The scan starts at
/// the bottom-left corner (1-base overlap), walks up the first column to the
/// full-overlap diagonal, then along the first row to the top-right corner.
fn diagonal_starts(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n)
        .rev()
        .map(|row| (row, 0))
        .chain((1..n).map(|col| (0, col)))
}

/// Find the diagonal with the greatest raw number of complementary pairs.
///
/// Ties keep the first diagonal in scan order. Returns `None` when no
/// diagonal has a single pair (including the empty sequence).
pub fn best_dimer_diagonal(seq: &[char]) -> Option<DimerDiagonal> {
    let n = seq.len();
    let mut best: Option<DimerDiagonal> = None;

    for (row, col) in diagonal_starts(n) {
        let overlap = n - row.max(col);
        let pairs = (0..overlap)
            .filter(|&k| pairs_with(seq[col + k], seq[n - 1 - (row + k)]))
            .count();

        if pairs > best.map_or(0, |b| b.pairs) {
            best = Some(DimerDiagonal { pairs, overlap });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(seq: &str) -> Vec<char> {
        seq.chars().collect()
    }

    #[test]
    fn test_hairpin_stem_reference_primer() {
        assert_eq!(longest_hairpin_stem(&symbols("tgaggccgccatccacgc")), 3);
    }

    #[test]
    fn test_hairpin_stem_palindrome() {
        // gggccc folds completely onto itself
        assert_eq!(longest_hairpin_stem(&symbols("gggccc")), 3);
        assert_eq!(longest_hairpin_stem(&symbols("aaaattttt")), 4);
    }

    #[test]
    fn test_hairpin_stem_no_pairing() {
        assert_eq!(longest_hairpin_stem(&symbols("aaaaaaaa")), 0);
        assert_eq!(longest_hairpin_stem(&symbols("a")), 0);
        assert_eq!(longest_hairpin_stem(&symbols("")), 0);
    }

    #[test]
    fn test_invalid_symbols_never_pair() {
        assert_eq!(longest_hairpin_stem(&symbols("nnnn")), 0);
        assert_eq!(best_dimer_diagonal(&symbols("nnnn")), None);
        // One symbol per position, however many bytes it takes
        assert_eq!(longest_hairpin_stem(&symbols("aéét")), 1);
    }

    #[test]
    fn test_dimer_best_diagonal_need_not_be_full_overlap() {
        let best = best_dimer_diagonal(&symbols("atgcatgc")).unwrap();
        assert_eq!(best, DimerDiagonal { pairs: 6, overlap: 6 });
    }

    #[test]
    fn test_dimer_reference_primer() {
        let best = best_dimer_diagonal(&symbols("tgaggccgccatccacgc")).unwrap();
        assert_eq!(best, DimerDiagonal { pairs: 8, overlap: 14 });
    }

    #[test]
    fn test_dimer_no_pairing() {
        assert_eq!(best_dimer_diagonal(&symbols("aaaaaaaa")), None);
        assert_eq!(best_dimer_diagonal(&symbols("")), None);
    }

    #[test]
    fn test_diagonal_scan_order() {
        let starts: Vec<_> = diagonal_starts(3).collect();
        assert_eq!(starts, vec![(2, 0), (1, 0), (0, 0), (0, 1), (0, 2)]);
    }
}
