//! The primer sequence model and its derived structural properties

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{PrimerError, Result};
use super::nucleotide::{self, is_gc};
use super::structure::{best_dimer_diagonal, longest_hairpin_stem, DimerDiagonal};
use super::types::Orientation;

/// Oligos up to this length use the Wallace rule for melting temperature.
pub const WALLACE_MAX_LENGTH: usize = 14;

/// A single oligonucleotide primer.
///
/// The name and sequence are fixed at construction; only the binding
/// orientation can be reassigned afterwards. Every derived property is
/// recomputed on demand, so repeated calls always agree. Lengths and
/// positions count symbols (`char`s), not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPrimer")]
pub struct Primer {
    name: String,
    sequence: String,
    orientation: Orientation,
}

/// Serialized form of a primer; loading goes through [`Primer::new`]
#[derive(Deserialize)]
struct RawPrimer {
    name: String,
    sequence: String,
    #[serde(default)]
    orientation: Orientation,
}

impl From<RawPrimer> for Primer {
    fn from(raw: RawPrimer) -> Self {
        Self::new(raw.name, &raw.sequence, raw.orientation)
    }
}

impl Primer {
    /// Create a primer; the sequence is case-folded to lowercase but not validated.
    pub fn new(name: impl Into<String>, sequence: &str, orientation: Orientation) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.to_lowercase(),
            orientation,
        }
    }

    /// Create a primer binding the forward strand
    pub fn forward(name: impl Into<String>, sequence: &str) -> Self {
        Self::new(name, sequence, Orientation::Forward)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Reassign the strand the primer binds to, e.g. once alignment is known.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    /// Iterate over the nucleotides of the primer
    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.sequence.chars()
    }

    fn symbols(&self) -> Vec<char> {
        self.sequence.chars().collect()
    }

    /// Number of symbols in the sequence
    pub fn length(&self) -> usize {
        self.sequence.chars().count()
    }

    pub fn gc_count(&self) -> usize {
        self.sequence.chars().filter(|&c| is_gc(c)).count()
    }

    pub fn at_count(&self) -> usize {
        self.length() - self.gc_count()
    }

    /// GC content in percent, rounded to 4 places as a fraction and then to
    /// 2 places as a percentage.
    pub fn gc_percentage(&self) -> Result<f64> {
        let length = self.non_empty_length()?;
        let fraction = round_to(self.gc_count() as f64 / length as f64, 4);
        Ok(round_to(fraction * 100.0, 2))
    }

    /// Melting temperature in degrees Celsius.
    ///
    /// Short oligos use the Wallace rule `2(A+T) + 4(G+C)`; longer ones use
    /// `64.9 + 41(G+C - 16.4) / N`. The two formulas do not meet at the
    /// boundary, so Tm jumps between 14 and 15 bases.
    pub fn melting_temperature(&self) -> f64 {
        let length = self.length();
        let gc_count = self.gc_count();
        let at_count = length - gc_count;

        let tm = if length <= WALLACE_MAX_LENGTH {
            (2 * at_count + 4 * gc_count) as f64
        } else {
            64.9 + (41.0 * (gc_count as f64 - 16.4)) / length as f64
        };

        round_to(tm, 2)
    }

    /// True if the 3' base is G or C (a GC clamp)
    pub fn last_base_is_gc(&self) -> bool {
        self.sequence.chars().last().is_some_and(is_gc)
    }

    pub fn reverse_complement(&self) -> Result<String> {
        nucleotide::reverse_complement(&self.symbols())
    }

    /// Length of the longest stretch of one repeated base
    pub fn homopolymer_run(&self) -> usize {
        let mut longest = 0;
        let mut current = 0;
        let mut previous: Option<char> = None;

        for base in self.sequence.chars() {
            if previous == Some(base) {
                current += 1;
            } else {
                current = 1;
            }
            longest = longest.max(current);
            previous = Some(base);
        }

        longest
    }

    /// Share of the primer, in percent, taken up by its longest hairpin stem.
    /// Both arms of the stem are counted.
    pub fn hairpin_score(&self) -> Result<f64> {
        let length = self.non_empty_length()?;
        let stem = longest_hairpin_stem(&self.symbols());
        Ok(round_to(2.0 * stem as f64 / length as f64 * 100.0, 2))
    }

    /// Percentage of complementary positions on the self-dimer alignment
    /// with the most pairs.
    pub fn self_dimer_score(&self) -> Result<f64> {
        self.non_empty_length()?;
        Ok(self
            .self_dimer_alignment()
            .map_or(0.0, |best| round_to(best.percentage(), 2)))
    }

    /// The self-dimer alignment behind [`Primer::self_dimer_score`], if any
    /// position pairs at all.
    pub fn self_dimer_alignment(&self) -> Option<DimerDiagonal> {
        best_dimer_diagonal(&self.symbols())
    }

    /// True when every base is one of `a`, `c`, `g`, `t`
    pub fn primer_qc_check(&self) -> bool {
        nucleotide::is_valid_sequence(&self.sequence)
    }

    fn non_empty_length(&self) -> Result<usize> {
        match self.length() {
            0 => Err(PrimerError::EmptyInput),
            n => Ok(n),
        }
    }
}

impl fmt::Display for Primer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Sequence: {}", self.sequence)?;
        write!(f, "Binding Strand: {}", self.orientation)
    }
}

impl<'a> IntoIterator for &'a Primer {
    type Item = char;
    type IntoIter = std::str::Chars<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.sequence.chars()
    }
}

/// Round to a number of decimal places, halves away from zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
