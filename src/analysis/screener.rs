//! Batch primer screening
//!
//! Scores a list of primers in parallel and collects a report per primer.

use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use super::error::PrimerError;
use super::primer::Primer;
use super::scoring::evaluate_resolved;
use super::thresholds::ResolvedThresholds;
use super::types::{PrimerReport, ProgressUpdate, ScreenParams, ScreeningResults};

/// Run the complete screening analysis
pub fn run_screening(
    primers: &[Primer],
    params: &ScreenParams,
    progress_tx: Option<Sender<ProgressUpdate>>,
) -> ScreeningResults {
    let num_threads = params.thread_count.get_count();
    tracing::info!(
        "Screening {} primers on {} threads",
        primers.len(),
        num_threads
    );

    // Resolve once; a missing key is recorded on every report below
    let limits = params.thresholds.resolve();
    if let Err(ref e) = limits {
        tracing::warn!("Primers will not be scored: {}", e);
    }

    let reports = match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
    {
        Ok(pool) => pool.install(|| screen_all(primers, &limits, &progress_tx)),
        Err(e) => {
            // Fall back to the global pool
            tracing::warn!("Could not build thread pool: {}", e);
            screen_all(primers, &limits, &progress_tx)
        }
    };

    let mut results = ScreeningResults::new(params.clone());
    results.reports = reports;

    tracing::info!(
        "Screening complete: {}/{} primers scored",
        results.scored_count(),
        results.reports.len()
    );

    results
}

fn screen_all(
    primers: &[Primer],
    limits: &Result<ResolvedThresholds, PrimerError>,
    progress_tx: &Option<Sender<ProgressUpdate>>,
) -> Vec<PrimerReport> {
    let total = primers.len();
    let completed_count = Arc::new(AtomicUsize::new(0));

    // par_iter().map().collect() preserves input order
    primers
        .par_iter()
        .map(|primer| {
            let report = match limits {
                Ok(limits) => analyze_primer(primer, Some(limits)),
                Err(e) => {
                    let mut report = analyze_primer(primer, None);
                    report.error = Some(e.to_string());
                    report
                }
            };

            let completed = completed_count.fetch_add(1, Ordering::Relaxed) + 1;

            // Only send periodic updates to avoid flooding the channel
            if let Some(tx) = progress_tx {
                if completed % 10 == 0 || completed == total {
                    let _ = tx.send(ProgressUpdate {
                        completed,
                        total,
                        message: format!("Scored primer {}/{}", completed, total),
                    });
                }
            }

            report
        })
        .collect()
}

/// Compute every property of one primer and, given thresholds, its score.
///
/// Failing properties are left empty; the first failure is recorded as
/// the report error.
pub fn analyze_primer(primer: &Primer, limits: Option<&ResolvedThresholds>) -> PrimerReport {
    let mut errors = Vec::new();
    let mut keep = |result: Result<f64, PrimerError>| match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(e.to_string());
            None
        }
    };

    let gc_percentage = keep(primer.gc_percentage());
    let hairpin_score = keep(primer.hairpin_score());
    let self_dimer_score = keep(primer.self_dimer_score());
    let reverse_complement = primer.reverse_complement().ok();

    let score_card = match limits {
        Some(limits) if errors.is_empty() => match evaluate_resolved(primer, limits) {
            Ok(card) => Some(card),
            Err(e) => {
                errors.push(e.to_string());
                None
            }
        },
        _ => None,
    };

    PrimerReport {
        primer: primer.clone(),
        length: primer.length(),
        gc_percentage,
        melting_temperature: primer.melting_temperature(),
        last_base_is_gc: primer.last_base_is_gc(),
        homopolymer_run: primer.homopolymer_run(),
        hairpin_score,
        self_dimer_score,
        self_dimer_alignment: primer.self_dimer_alignment(),
        reverse_complement,
        passes_qc: primer.primer_qc_check(),
        score_card,
        error: errors.into_iter().next(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fasta::parse_primer_fasta;
    use crate::analysis::thresholds::{ThresholdKey, Thresholds};
    use crate::analysis::types::{Orientation, ThreadCount};
    use std::sync::mpsc::channel;

    fn params() -> ScreenParams {
        ScreenParams {
            thresholds: Thresholds::reference(),
            thread_count: ThreadCount::Fixed(2),
        }
    }

    #[test]
    fn test_screening() {
        let fasta = ">TDSP1712 reverse\ntgaggccgccatccacgc\n>Pal\nacgtacgtacgtacgtac\n>Odd\nacgnacgt";
        let primers = parse_primer_fasta(fasta).unwrap();
        let results = run_screening(&primers, &params(), None);

        assert_eq!(results.reports.len(), 3);
        assert_eq!(results.reports[0].primer.name(), "TDSP1712");
        assert_eq!(results.reports[0].score(), Some(6));
        assert_eq!(results.reports[1].score(), Some(5));
        // Invalid symbols do not stop scoring, only the complement
        assert!(!results.reports[2].passes_qc);
        assert!(results.reports[2].reverse_complement.is_none());
        assert_eq!(results.scored_count(), 3);

        let ranked = results.ranked();
        assert_eq!(ranked[0].0, 0);
        assert_eq!(ranked[0].1.primer.name(), "TDSP1712");
        assert_eq!(ranked[1].0, 1);
    }

    #[test]
    fn test_ranked_keeps_input_index_and_puts_unscored_last() {
        let primers = vec![
            Primer::forward("empty", ""),
            Primer::forward("pal", "acgtacgtacgtacgtac"),
            Primer::new("TDSP1712", "tgaggccgccatccacgc", Orientation::Reverse),
        ];
        let results = run_screening(&primers, &params(), None);
        let order: Vec<usize> = results.ranked().into_iter().map(|(i, _)| i).collect();
        assert_eq!(order, vec![2, 1, 0]);
    }

    #[test]
    fn test_report_carries_dimer_alignment() {
        let primers = vec![Primer::forward("p", "tgaggccgccatccacgc"), Primer::forward("a", "aaaa")];
        let results = run_screening(&primers, &params(), None);
        let best = results.reports[0].self_dimer_alignment.unwrap();
        assert_eq!((best.pairs, best.overlap), (8, 14));
        assert_eq!(results.reports[0].self_dimer_score, Some(57.14));
        assert!(results.reports[1].self_dimer_alignment.is_none());
    }

    #[test]
    fn test_saved_results_reload_canonical_primers() {
        let primers = vec![Primer::forward("p", "GGCCAT")];
        let results = run_screening(&primers, &params(), None);
        let json = serde_json::to_string(&results).unwrap().replace("ggccat", "GGCCAT");
        let loaded: ScreeningResults = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.reports[0].primer.sequence(), "ggccat");
        assert_eq!(loaded.reports[0].primer.gc_count(), 4);
    }

    #[test]
    fn test_missing_threshold_reported_per_primer() {
        let mut params = params();
        params.thresholds.remove(ThresholdKey::GcHigh);
        let primers = vec![Primer::forward("p", "acgtacgt")];
        let results = run_screening(&primers, &params, None);

        let report = &results.reports[0];
        assert!(report.score_card.is_none());
        assert!(report.error.as_deref().unwrap().contains("gcHigh"));
        // Properties are still reported
        assert_eq!(report.length, 8);
        assert_eq!(report.gc_percentage, Some(50.0));
    }

    #[test]
    fn test_empty_primer_does_not_abort_batch() {
        let primers = vec![Primer::forward("empty", ""), Primer::forward("ok", "gcgcatatgc")];
        let results = run_screening(&primers, &params(), None);
        assert!(results.reports[0].score_card.is_none());
        assert!(results.reports[0].error.is_some());
        assert!(results.reports[1].score_card.is_some());
    }

    #[test]
    fn test_progress_reports_completion() {
        let primers: Vec<Primer> = (0..25)
            .map(|i| Primer::forward(format!("P{}", i), "acgtacgtacgtacgtac"))
            .collect();
        let (tx, rx) = channel();
        run_screening(&primers, &params(), Some(tx));

        let updates: Vec<ProgressUpdate> = rx.try_iter().collect();
        assert!(!updates.is_empty());
        assert!(updates.iter().any(|u| u.completed == 25 && u.total == 25));
    }
}
