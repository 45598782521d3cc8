//! Data types for primer screening

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::PrimerError;
use super::primer::Primer;
use super::scoring::ScoreCard;
use super::structure::DimerDiagonal;
use super::thresholds::Thresholds;

/// Strand the primer binds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Forward,
    Reverse,
}

impl Default for Orientation {
    fn default() -> Self {
        Self::Forward
    }
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Reverse => "reverse",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = PrimerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" | "fwd" | "f" | "+" => Ok(Self::Forward),
            "reverse" | "rev" | "r" | "-" => Ok(Self::Reverse),
            other => Err(PrimerError::Parse(format!("unknown orientation '{}'", other))),
        }
    }
}

/// Thread count configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreadCount {
    /// Use all available CPU cores
    Auto,
    /// Use a specific number of threads
    Fixed(usize),
}

impl Default for ThreadCount {
    fn default() -> Self {
        Self::Auto
    }
}

impl ThreadCount {
    /// Get the actual number of threads to use
    pub fn get_count(&self) -> usize {
        match self {
            Self::Auto => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            Self::Fixed(n) => (*n).max(1),
        }
    }
}

/// Parameters for a batch screen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenParams {
    pub thresholds: Thresholds,
    pub thread_count: ThreadCount,
}

/// Every derived property of one primer, plus its score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimerReport {
    pub primer: Primer,
    pub length: usize,
    pub gc_percentage: Option<f64>,
    pub melting_temperature: f64,
    pub last_base_is_gc: bool,
    pub homopolymer_run: usize,
    pub hairpin_score: Option<f64>,
    pub self_dimer_score: Option<f64>,
    /// Alignment behind the self-dimer score
    #[serde(default)]
    pub self_dimer_alignment: Option<DimerDiagonal>,
    pub reverse_complement: Option<String>,
    pub passes_qc: bool,
    pub score_card: Option<ScoreCard>,
    /// Reason the primer could not be scored
    pub error: Option<String>,
}

impl PrimerReport {
    pub fn score(&self) -> Option<i32> {
        self.score_card.as_ref().map(|card| card.total)
    }
}

/// Complete screening results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningResults {
    pub params: ScreenParams,
    pub reports: Vec<PrimerReport>,
}

impl ScreeningResults {
    pub fn new(params: ScreenParams) -> Self {
        Self {
            params,
            reports: Vec::new(),
        }
    }

    pub fn scored_count(&self) -> usize {
        self.reports.iter().filter(|r| r.score_card.is_some()).count()
    }

    /// Reports with their input index, best score first; unscored primers
    /// go last. Equal scores keep input order.
    pub fn ranked(&self) -> Vec<(usize, &PrimerReport)> {
        let mut ranked: Vec<(usize, &PrimerReport)> = self.reports.iter().enumerate().collect();
        ranked.sort_by_key(|(_, r)| std::cmp::Reverse(r.score().unwrap_or(i32::MIN)));
        ranked
    }
}

/// Progress update during screening
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub completed: usize,
    pub total: usize,
    pub message: String,
}
