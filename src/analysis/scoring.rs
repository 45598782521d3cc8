//! Composite primer quality score
//!
//! A primer earns points for sitting inside the configured length, GC and
//! Tm windows and for ending in G/C, and loses points for long homopolymer
//! runs, hairpins and self-dimers. Window checks truncate the property to an
//! integer first, so a GC content of 59.99 % still falls inside `[40, 60)`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::Result;
use super::primer::Primer;
use super::thresholds::{ResolvedThresholds, Thresholds};

/// A scoring rule and the adjustment it applies when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreRule {
    LengthInRange,
    GcInRange,
    GcClamp,
    TmInRange,
    LongHomopolymer,
    Hairpin,
    SelfDimer,
}

impl ScoreRule {
    pub fn adjustment(&self) -> i32 {
        match self {
            Self::LengthInRange | Self::GcInRange | Self::GcClamp | Self::TmInRange => 2,
            Self::LongHomopolymer | Self::Hairpin => -2,
            Self::SelfDimer => -1,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::LengthInRange => "Length within range",
            Self::GcInRange => "GC content within range",
            Self::GcClamp => "3' end is G or C",
            Self::TmInRange => "Melting temperature within range",
            Self::LongHomopolymer => "Homopolymer run too long",
            Self::Hairpin => "Hairpin above limit",
            Self::SelfDimer => "Self-dimer above limit",
        }
    }
}

/// The rules that fired for one primer and the resulting score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub fired: Vec<ScoreRule>,
    pub total: i32,
}

/// `[low, high)` after truncating the value toward zero
fn in_window(value: f64, low: f64, high: f64) -> bool {
    let value = value.trunc();
    low <= value && value < high
}

/// Score a primer against a threshold set.
///
/// Fails with a configuration error before any property is computed if a
/// threshold is missing.
pub fn score(primer: &Primer, thresholds: &Thresholds) -> Result<i32> {
    evaluate(primer, thresholds).map(|card| card.total)
}

/// Score a primer and report which rules contributed.
pub fn evaluate(primer: &Primer, thresholds: &Thresholds) -> Result<ScoreCard> {
    let limits = thresholds.resolve()?;
    evaluate_resolved(primer, &limits)
}

pub fn evaluate_resolved(primer: &Primer, limits: &ResolvedThresholds) -> Result<ScoreCard> {
    // Fallible properties first, so a failure never leaves a partial card
    let gc_percentage = primer.gc_percentage()?;
    let hairpin = primer.hairpin_score()?;
    let self_dimer = primer.self_dimer_score()?;

    let checks = [
        (
            ScoreRule::LengthInRange,
            in_window(primer.length() as f64, limits.length_low, limits.length_high),
        ),
        (
            ScoreRule::GcInRange,
            in_window(gc_percentage, limits.gc_low, limits.gc_high),
        ),
        (ScoreRule::GcClamp, primer.last_base_is_gc()),
        (
            ScoreRule::TmInRange,
            in_window(primer.melting_temperature(), limits.tm_low, limits.tm_high),
        ),
        (
            ScoreRule::LongHomopolymer,
            primer.homopolymer_run() as f64 >= limits.homopolymer_max,
        ),
        (ScoreRule::Hairpin, hairpin > limits.hairpin_max),
        (ScoreRule::SelfDimer, self_dimer > limits.dimer_max),
    ];

    let fired: Vec<ScoreRule> = checks
        .into_iter()
        .filter_map(|(rule, hit)| hit.then_some(rule))
        .collect();

    for rule in &fired {
        debug!(primer = primer.name(), ?rule, adjustment = rule.adjustment(), "rule fired");
    }

    let total = fired.iter().map(ScoreRule::adjustment).sum();
    Ok(ScoreCard { fired, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::error::PrimerError;
    use crate::analysis::thresholds::ThresholdKey;
    use crate::analysis::types::Orientation;

    #[test]
    fn test_reference_primer_score() {
        let primer = Primer::new("TDSP1712", "tgaggccgccatccacgc", Orientation::Reverse);
        let card = evaluate(&primer, &Thresholds::reference()).unwrap();
        assert_eq!(
            card.fired,
            vec![ScoreRule::LengthInRange, ScoreRule::GcClamp, ScoreRule::TmInRange]
        );
        assert_eq!(card.total, 6);
        assert_eq!(score(&primer, &Thresholds::reference()).unwrap(), 6);
    }

    #[test]
    fn test_penalties_apply() {
        // GC 50 %, Tm 48.04, hairpin 88.89 %, self-dimer 100 %
        let primer = Primer::forward("p", "acgtacgtacgtacgtac");
        let card = evaluate(&primer, &Thresholds::reference()).unwrap();
        assert!(card.fired.contains(&ScoreRule::Hairpin));
        assert!(card.fired.contains(&ScoreRule::SelfDimer));
        assert_eq!(card.total, 5);
    }

    #[test]
    fn test_homopolymer_penalty_is_inclusive() {
        let primer = Primer::forward("p", "gcaaaaaagc");
        let mut thresholds = Thresholds::reference();
        thresholds.set(ThresholdKey::HomopolymerMax, 6.0);
        let card = evaluate(&primer, &thresholds).unwrap();
        assert!(card.fired.contains(&ScoreRule::LongHomopolymer));

        thresholds.set(ThresholdKey::HomopolymerMax, 7.0);
        let card = evaluate(&primer, &thresholds).unwrap();
        assert!(!card.fired.contains(&ScoreRule::LongHomopolymer));
    }

    #[test]
    fn test_window_truncates_instead_of_rounding() {
        assert!(in_window(59.99, 40.0, 60.0));
        assert!(!in_window(60.0, 40.0, 60.0));
        assert!(!in_window(39.99, 40.0, 60.0));
        assert!(in_window(40.0, 40.0, 60.0));
    }

    #[test]
    fn test_length_window_upper_bound_is_exclusive() {
        let mut thresholds = Thresholds::reference();
        thresholds.set(ThresholdKey::LengthHigh, 18.0);
        let primer = Primer::forward("p", "tgaggccgccatccacgc");
        let card = evaluate(&primer, &thresholds).unwrap();
        assert!(!card.fired.contains(&ScoreRule::LengthInRange));
    }

    #[test]
    fn test_missing_threshold_is_configuration_error() {
        let mut thresholds = Thresholds::reference();
        thresholds.remove(ThresholdKey::DimerMax);
        let primer = Primer::forward("p", "acgt");
        assert!(matches!(
            score(&primer, &thresholds),
            Err(PrimerError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_primer_cannot_be_scored() {
        let primer = Primer::forward("p", "");
        assert!(matches!(
            score(&primer, &Thresholds::reference()),
            Err(PrimerError::EmptyInput)
        ));
    }

    #[test]
    fn test_score_is_stable() {
        let primer = Primer::forward("p", "tgaggccgccatccacgc");
        let thresholds = Thresholds::reference();
        let first = score(&primer, &thresholds).unwrap();
        for _ in 0..5 {
            assert_eq!(score(&primer, &thresholds).unwrap(), first);
        }
    }
}
