//! Nucleotide alphabet and Watson-Crick pairing rules
//!
//! Primers are stored lowercase, so everything here works on lowercase
//! symbols. Positions are counted in `char`s, never bytes.

use bio::alphabets::Alphabet;
use once_cell::sync::Lazy;

use super::error::{PrimerError, Result};

/// The canonical primer alphabet.
pub static DNA_ALPHABET: Lazy<Alphabet> = Lazy::new(|| Alphabet::new(b"acgt"));

/// Check if a symbol is one of `a`, `c`, `g`, `t`
#[inline]
pub fn is_standard_base(c: char) -> bool {
    matches!(c, 'a' | 'c' | 'g' | 't')
}

/// Check if a symbol is guanine or cytosine
#[inline]
pub fn is_gc(c: char) -> bool {
    matches!(c, 'g' | 'c')
}

/// Watson-Crick complement of a base, `None` outside the alphabet.
#[inline]
pub fn complement(c: char) -> Option<char> {
    match c {
        'a' => Some('t'),
        't' => Some('a'),
        'g' => Some('c'),
        'c' => Some('g'),
        _ => None,
    }
}

/// True when the two bases form a Watson-Crick pair.
/// Symbols outside the alphabet never pair.
#[inline]
pub fn pairs_with(x: char, y: char) -> bool {
    complement(x) == Some(y)
}

/// Check that every symbol of a sequence belongs to the canonical alphabet
pub fn is_valid_sequence(seq: &str) -> bool {
    // Multi-byte symbols are made of bytes >= 0x80, which the alphabet rejects
    DNA_ALPHABET.is_word(seq.as_bytes())
}

/// Compute the reverse complement of a lowercase DNA sequence.
///
/// Fails on the first symbol (counting from the 5' end) that has no complement.
pub fn reverse_complement(seq: &[char]) -> Result<String> {
    if let Some(position) = seq.iter().position(|&c| !is_standard_base(c)) {
        return Err(PrimerError::InvalidSymbol {
            symbol: seq[position],
            position,
        });
    }

    Ok(seq.iter().rev().filter_map(|&c| complement(c)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(seq: &str) -> Vec<char> {
        seq.chars().collect()
    }

    #[test]
    fn test_complement_pairs() {
        assert!(pairs_with('a', 't'));
        assert!(pairs_with('t', 'a'));
        assert!(pairs_with('g', 'c'));
        assert!(pairs_with('c', 'g'));
        assert!(!pairs_with('a', 'a'));
        assert!(!pairs_with('g', 't'));
        assert!(!pairs_with('n', 'n'));
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(
            reverse_complement(&symbols("tgaggccgccatccacgc")).unwrap(),
            "gcgtggatggcggcctca"
        );
        assert_eq!(reverse_complement(&symbols("acgt")).unwrap(), "acgt");
        assert_eq!(reverse_complement(&[]).unwrap(), "");
    }

    #[test]
    fn test_reverse_complement_rejects_invalid() {
        match reverse_complement(&symbols("acgnt")) {
            Err(PrimerError::InvalidSymbol { symbol, position }) => {
                assert_eq!(symbol, 'n');
                assert_eq!(position, 3);
            }
            other => panic!("expected InvalidSymbol, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_multibyte_symbol_keeps_char_position() {
        match reverse_complement(&symbols("aéct")) {
            Err(PrimerError::InvalidSymbol { symbol, position }) => {
                assert_eq!(symbol, 'é');
                assert_eq!(position, 1);
            }
            other => panic!("expected InvalidSymbol, got {:?}", other),
        }
    }

    #[test]
    fn test_alphabet() {
        assert!(is_valid_sequence("acgtacgt"));
        assert!(!is_valid_sequence("ACGT"));
        assert!(!is_valid_sequence("acgu"));
        assert!(!is_valid_sequence("acgé"));
        assert!(is_standard_base('g'));
        assert!(!is_standard_base('-'));
        assert!(!is_standard_base('é'));
    }
}
