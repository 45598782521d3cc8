//! Error types for primer analysis and scoring

use thiserror::Error;

/// Errors raised while deriving primer properties, scoring, or loading input.
///
/// Every variant is recoverable: a failing property does not poison the
/// primer, other properties of the same primer can still be queried.
#[derive(Debug, Error)]
pub enum PrimerError {
    /// A symbol outside `a`, `c`, `g`, `t` was met while complementing.
    #[error("invalid nucleotide '{symbol}' at position {position}")]
    InvalidSymbol { symbol: char, position: usize },

    /// The sequence is empty and the property divides by its length.
    #[error("primer sequence is empty")]
    EmptyInput,

    /// A threshold is missing or malformed.
    #[error("threshold configuration error: {0}")]
    Configuration(String),

    /// Primer input text did not contain any usable sequence.
    #[error("could not parse primer input: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PrimerError>;
