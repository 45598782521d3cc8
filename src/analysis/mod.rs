mod error;
mod fasta;
mod nucleotide;
mod primer;
mod scoring;
mod screener;
mod structure;
mod thresholds;
mod types;

pub use error::PrimerError;
pub use fasta::*;
pub use nucleotide::*;
pub use primer::*;
pub use scoring::*;
pub use screener::*;
pub use structure::*;
pub use thresholds::*;
pub use types::*;
