//! Frequency table decoder
//!
//! The table is the only lossless artifact: every row carries the byte
//! value itself, so no inverse mapping is needed.

use std::path::Path;

use log::{debug, warn};

use super::{non_empty, read_text, ArtifactDecoder, ArtifactKind};
use crate::codec::DecodeParams;
use crate::error::{Result, SonarError};
use crate::sequence::RecoveredSequence;

/// Column header written on the first line of every table
pub const TABLE_HEADER: &str = "Sample,Byte_Hex,Byte_Dec,Frequency_Hz,Amplitude,Duration_s";

const COLUMNS: usize = 6;

/// One parsed table row
#[derive(Debug, Clone, Copy, PartialEq)]
struct TableRow {
    index: usize,
    hex_byte: u8,
    byte: u8,
    frequency: f64,
    amplitude: f64,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TableDecoder;

impl TableDecoder {
    /// Decode table text held in memory
    pub fn decode_str(&self, text: &str) -> Result<RecoveredSequence> {
        let mut lines = text.lines().enumerate();

        let header = lines
            .by_ref()
            .map(|(_, line)| line.trim())
            .find(|line| !line.is_empty());
        match header {
            Some(line) if line.starts_with("Sample,") => {}
            Some(line) => {
                return Err(SonarError::InvalidHeader {
                    reason: format!("expected table header, found {:?}", truncate(line)),
                })
            }
            None => {
                return Err(SonarError::InvalidHeader {
                    reason: "frequency table is empty".to_string(),
                })
            }
        }

        let mut seq = RecoveredSequence::new();
        for (number, line) in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match parse_row(line, number + 1) {
                Ok(row) => {
                    if row.hex_byte != row.byte {
                        warn!(
                            "Table row {} disagrees with itself (0x{:02X} vs {}), using decimal",
                            row.index, row.hex_byte, row.byte
                        );
                    }
                    seq.push(row.byte, row.frequency, row.amplitude);
                }
                Err(e) => warn!("Skipping table row: {}", e),
            }
        }

        debug!("Frequency table yielded {} samples", seq.len());
        non_empty(seq, ArtifactKind::Table)
    }
}

impl ArtifactDecoder for TableDecoder {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Table
    }

    fn decode(&self, path: &Path, _params: &DecodeParams) -> Result<RecoveredSequence> {
        self.decode_str(&read_text(path)?)
    }
}

fn parse_row(line: &str, number: usize) -> Result<TableRow> {
    let malformed = |reason: String| SonarError::MalformedRecord {
        line: number,
        reason,
    };

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != COLUMNS {
        return Err(malformed(format!(
            "expected {} columns, found {}",
            COLUMNS,
            fields.len()
        )));
    }

    let index = fields[0]
        .parse::<usize>()
        .map_err(|_| malformed(format!("bad sample index {:?}", fields[0])))?;
    let hex_byte = parse_hex_byte(fields[1])
        .ok_or_else(|| malformed(format!("bad hex byte {:?}", fields[1])))?;
    let byte = fields[2]
        .parse::<u8>()
        .map_err(|_| malformed(format!("bad decimal byte {:?}", fields[2])))?;
    let frequency = parse_finite(fields[3])
        .ok_or_else(|| malformed(format!("bad frequency {:?}", fields[3])))?;
    let amplitude = parse_finite(fields[4])
        .ok_or_else(|| malformed(format!("bad amplitude {:?}", fields[4])))?;
    parse_finite(fields[5]).ok_or_else(|| malformed(format!("bad duration {:?}", fields[5])))?;

    Ok(TableRow {
        index,
        hex_byte,
        byte,
        frequency,
        amplitude,
    })
}

/// Parse `0xHH` (either case prefix)
pub(crate) fn parse_hex_byte(field: &str) -> Option<u8> {
    let digits = field
        .strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))?;
    if digits.is_empty() || digits.len() > 2 {
        return None;
    }
    u8::from_str_radix(digits, 16).ok()
}

fn parse_finite(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn truncate(line: &str) -> String {
    line.chars().take(40).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_three_rows() {
        let text = format!(
            "{}\n0,0x41,65,729.80,0.329,0.050\n1,0x42,66,737.65,0.333,0.050\n2,0x43,67,745.49,0.336,0.050\n",
            TABLE_HEADER
        );
        let seq = TableDecoder.decode_str(&text).unwrap();

        assert_eq!(seq.to_bytes(), b"ABC".to_vec());
        assert_eq!(seq.len(), 3);
        assert_relative_eq!(
            seq.mean_confidence(),
            (0.329 + 0.333 + 0.336) / 3.0,
            epsilon = 1e-12
        );
        // amplitudes all sit below the success threshold
        assert_eq!(seq.count_above(0.5), 0);
    }

    #[test]
    fn test_decimal_is_authoritative() {
        // frequency would inverse map to 0xFF, hex says 0x01
        let text = format!("{}\n0,0x01,7,2220.00,0.900,0.050\n", TABLE_HEADER);
        let seq = TableDecoder.decode_str(&text).unwrap();
        assert_eq!(seq.to_bytes(), vec![7]);
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let text = format!(
            "{}\n0,0x41,65,729.80,0.329,0.050\nthis is not a row\n\n2,0x43,300,745.49,0.336,0.050\n3,0x44,68,753.33,0.340,0.050\n",
            TABLE_HEADER
        );
        let seq = TableDecoder.decode_str(&text).unwrap();

        assert_eq!(seq.to_bytes(), vec![0x41, 0x44]);
        let indices: Vec<usize> = seq.iter().map(|s| s.sequence_index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_confidence_clamped() {
        let text = format!("{}\n0,0x10,16,345.49,1.700,0.050\n", TABLE_HEADER);
        let seq = TableDecoder.decode_str(&text).unwrap();
        assert_relative_eq!(seq.as_slice()[0].confidence, 1.0);
    }

    #[test]
    fn test_missing_header() {
        let err = TableDecoder
            .decode_str("0,0x41,65,729.80,0.329,0.050\n")
            .unwrap_err();
        assert!(matches!(err, SonarError::InvalidHeader { .. }));

        let err = TableDecoder.decode_str("").unwrap_err();
        assert!(matches!(err, SonarError::InvalidHeader { .. }));
    }

    #[test]
    fn test_header_only_is_empty() {
        let err = TableDecoder.decode_str(TABLE_HEADER).unwrap_err();
        assert!(matches!(err, SonarError::EmptyResult { .. }));
    }

    #[test]
    fn test_parse_hex_byte() {
        assert_eq!(parse_hex_byte("0x41"), Some(0x41));
        assert_eq!(parse_hex_byte("0XfF"), Some(0xFF));
        assert_eq!(parse_hex_byte("41"), None);
        assert_eq!(parse_hex_byte("0x"), None);
        assert_eq!(parse_hex_byte("0x100"), None);
    }
}
