//! Primer list parsing (FASTA or one primer per line)

use bio::io::fasta;

use super::error::{PrimerError, Result};
use super::primer::Primer;
use super::types::Orientation;

/// Parse primers from FASTA text.
///
/// The first word of a record description may give the binding strand,
/// e.g. `>TDSP1712 reverse`; otherwise the primer binds forward.
/// Text without any `>` header is read line by line instead, see
/// [`parse_primer_lines`].
pub fn parse_primer_fasta(text: &str) -> Result<Vec<Primer>> {
    let primers = if text.lines().any(|l| l.trim_start().starts_with('>')) {
        parse_fasta_records(text)?
    } else {
        parse_primer_lines(text)?
    };

    if primers.is_empty() {
        return Err(PrimerError::Parse("no primer sequences found".to_string()));
    }

    tracing::debug!("Parsed {} primers", primers.len());
    Ok(primers)
}

fn parse_fasta_records(text: &str) -> Result<Vec<Primer>> {
    let reader = fasta::Reader::new(text.trim_start().as_bytes());
    let mut primers = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| PrimerError::Parse(e.to_string()))?;
        if record.seq().is_empty() {
            tracing::warn!("Skipping empty record {}", record.id());
            continue;
        }

        let orientation = match record.desc().and_then(|d| d.split_whitespace().next()) {
            Some(token) => token.parse().unwrap_or_default(),
            None => Orientation::Forward,
        };
        let sequence: String = String::from_utf8_lossy(record.seq())
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        primers.push(Primer::new(record.id(), &sequence, orientation));
    }

    Ok(primers)
}

/// Read one primer per line: `sequence` or `name sequence [orientation]`.
/// Unnamed primers are called `Primer_<line>`.
pub fn parse_primer_lines(text: &str) -> Result<Vec<Primer>> {
    let mut primers = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let primer = match fields.as_slice() {
            [] => continue,
            [sequence] => Primer::forward(format!("Primer_{}", i + 1), sequence),
            [name, sequence] => Primer::forward(*name, sequence),
            [name, sequence, orientation] => {
                Primer::new(*name, sequence, orientation.parse()?)
            }
            _ => {
                return Err(PrimerError::Parse(format!(
                    "line {}: expected 'sequence' or 'name sequence [orientation]'",
                    i + 1
                )))
            }
        };
        primers.push(primer);
    }

    Ok(primers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fasta_with_orientation() {
        let text = ">TDSP1712 reverse\ntgaggccgcc\natccacgc\n>P2\nACGTACGT\n";
        let primers = parse_primer_fasta(text).unwrap();
        assert_eq!(primers.len(), 2);
        assert_eq!(primers[0].name(), "TDSP1712");
        assert_eq!(primers[0].sequence(), "tgaggccgccatccacgc");
        assert_eq!(primers[0].orientation(), Orientation::Reverse);
        assert_eq!(primers[1].sequence(), "acgtacgt");
        assert_eq!(primers[1].orientation(), Orientation::Forward);
    }

    #[test]
    fn test_unknown_description_defaults_forward() {
        let primers = parse_primer_fasta(">P1 designed by hand\nacgt").unwrap();
        assert_eq!(primers[0].orientation(), Orientation::Forward);
    }

    #[test]
    fn test_parse_plain_lines() {
        let text = "acgtacgt\nP2 TTTTGGGG r\n\nP3 ccccaaaa\n";
        let primers = parse_primer_fasta(text).unwrap();
        assert_eq!(primers.len(), 3);
        assert_eq!(primers[0].name(), "Primer_1");
        assert_eq!(primers[1].orientation(), Orientation::Reverse);
        assert_eq!(primers[1].sequence(), "ttttgggg");
        assert_eq!(primers[2].name(), "P3");
    }

    #[test]
    fn test_bad_line_rejected() {
        assert!(parse_primer_lines("P1 acgt forward extra").is_err());
        assert!(parse_primer_lines("P1 acgt sideways").is_err());
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(parse_primer_fasta("  \n\n"), Err(PrimerError::Parse(_))));
        assert!(matches!(parse_primer_fasta(">empty\n"), Err(PrimerError::Parse(_))));
    }
}
