//! Primer QC - Oligonucleotide primer quality control
//!
//! Derives structural properties of single primers (GC content, melting
//! temperature, homopolymer runs, hairpins, self-dimers) and combines them
//! into a quality score against configurable thresholds.

pub mod analysis;

pub use analysis::*;
