//! Analysis report decoder
//!
//! The report is meant for people, so it is the least trusted source. Only
//! the tab-delimited detail section is read, and reading stops at the first
//! line that does not look like a sample.

use std::path::Path;

use log::debug;

use super::table::parse_hex_byte;
use super::{non_empty, read_text, ArtifactDecoder, ArtifactKind};
use crate::codec::DecodeParams;
use crate::error::{Result, SonarError};
use crate::sequence::RecoveredSequence;

/// Line that introduces the per-sample section
pub const SECTION_MARKER: &str = "Detailed Sample Data";

/// Confidence assigned to every report sample
pub const REPORT_CONFIDENCE: f64 = 0.85;

/// Column header and separator between the marker and the first sample
const SKIPPED_LINES: usize = 2;

#[derive(Debug, Default, Clone, Copy)]
pub struct ReportDecoder;

impl ReportDecoder {
    /// Decode report text held in memory
    pub fn decode_str(&self, text: &str, params: &DecodeParams) -> Result<RecoveredSequence> {
        let mut lines = text.lines();

        if !lines.by_ref().any(|line| line.contains(SECTION_MARKER)) {
            return Err(SonarError::InvalidHeader {
                reason: format!("no \"{}\" section", SECTION_MARKER),
            });
        }

        let mut seq = RecoveredSequence::new();
        for line in lines.skip(SKIPPED_LINES) {
            let Some(frequency) = parse_sample_line(line) else {
                debug!("Report detail section ends at {:?}", line);
                break;
            };
            seq.push_frequency(frequency, REPORT_CONFIDENCE, params);
        }

        debug!("Analysis report yielded {} samples", seq.len());
        non_empty(seq, ArtifactKind::Report)
    }
}

impl ArtifactDecoder for ReportDecoder {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Report
    }

    fn decode(&self, path: &Path, params: &DecodeParams) -> Result<RecoveredSequence> {
        self.decode_str(&read_text(path)?, params)
    }
}

/// Frequency of a `0xHH  freq  amp  dur` line, `None` if it is not one
fn parse_sample_line(line: &str) -> Option<f64> {
    let mut fields = line.split_whitespace();

    parse_hex_byte(fields.next()?)?;
    let frequency = fields.next()?.parse::<f64>().ok().filter(|f| f.is_finite())?;
    fields.next()?.parse::<f64>().ok()?;
    fields.next()?.parse::<f64>().ok()?;

    Some(frequency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PREAMBLE: &str = "SONAR Audio Analysis Report\n\
        ===========================\n\
        \n\
        Detailed Sample Data:\n\
        Byte\tFreq(Hz)\tAmp\tDuration(s)\n\
        ----\t--------\t---\t-----------\n";

    #[test]
    fn test_reads_detail_section() {
        let text = format!(
            "{}0x41\t729.80\t\t0.329\t0.050\n0x42\t737.65\t\t0.333\t0.050\n",
            PREAMBLE
        );
        let seq = ReportDecoder
            .decode_str(&text, &DecodeParams::default())
            .unwrap();

        assert_eq!(seq.to_bytes(), vec![0x41, 0x42]);
        assert!(seq.iter().all(|s| s.confidence == REPORT_CONFIDENCE));
        assert_eq!(seq.count_above(0.6), 2);
    }

    #[test]
    fn test_stops_at_malformed_line() {
        let text = format!(
            "{}0x41\t729.80\t\t0.329\t0.050\nTotal: 3\n0x43\t745.49\t\t0.336\t0.050\n",
            PREAMBLE
        );
        let seq = ReportDecoder
            .decode_str(&text, &DecodeParams::default())
            .unwrap();
        assert_eq!(seq.to_bytes(), vec![0x41]);
    }

    #[test]
    fn test_stops_at_blank_line() {
        let text = format!(
            "{}0x41\t729.80\t\t0.329\t0.050\n\n0x43\t745.49\t\t0.336\t0.050\n",
            PREAMBLE
        );
        let seq = ReportDecoder
            .decode_str(&text, &DecodeParams::default())
            .unwrap();
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn test_missing_marker() {
        let err = ReportDecoder
            .decode_str("0x41\t729.80\t\t0.329\t0.050\n", &DecodeParams::default())
            .unwrap_err();
        assert!(matches!(err, SonarError::InvalidHeader { .. }));
    }

    #[test]
    fn test_empty_section() {
        let err = ReportDecoder
            .decode_str(PREAMBLE, &DecodeParams::default())
            .unwrap_err();
        assert!(matches!(err, SonarError::EmptyResult { .. }));
    }

    #[test]
    fn test_parse_sample_line() {
        assert_eq!(parse_sample_line("0xFF\t2220.00\t\t1.000\t0.050"), Some(2220.0));
        assert_eq!(parse_sample_line("0xFF\t2220.00"), None);
        assert_eq!(parse_sample_line("Byte\tFreq(Hz)\tAmp\tDuration(s)"), None);
        assert_eq!(parse_sample_line(""), None);
    }
}
