//! Accuracy checks against a known original

use sha2::{Digest, Sha256};

/// Mismatch offsets kept in a validation report
pub const MAX_REPORTED_MISMATCHES: usize = 10;

/// Fraction of matching bytes over the shorter of the two buffers
///
/// 0.0 when either buffer is empty.
pub fn accuracy(original: &[u8], reconstructed: &[u8]) -> f64 {
    let len = original.len().min(reconstructed.len());
    if len == 0 {
        return 0.0;
    }
    let matches = original
        .iter()
        .zip(reconstructed)
        .filter(|(a, b)| a == b)
        .count();
    matches as f64 / len as f64
}

/// Comparison of a reconstruction with its original
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub accuracy: f64,
    /// Bytes compared (the shorter length)
    pub compared_len: usize,
    /// Reconstructed length minus original length
    pub length_delta: i64,
    /// First differing offsets within the compared range
    pub mismatches: Vec<usize>,
    pub original_sha256: String,
    pub reconstructed_sha256: String,
    /// Both buffers are identical
    pub exact: bool,
}

impl ValidationReport {
    pub fn compare(original: &[u8], reconstructed: &[u8]) -> Self {
        let mismatches = original
            .iter()
            .zip(reconstructed)
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(offset, _)| offset)
            .take(MAX_REPORTED_MISMATCHES)
            .collect();

        let original_sha256 = sha256_hex(original);
        let reconstructed_sha256 = sha256_hex(reconstructed);
        let exact = original_sha256 == reconstructed_sha256;

        ValidationReport {
            accuracy: accuracy(original, reconstructed),
            compared_len: original.len().min(reconstructed.len()),
            length_delta: reconstructed.len() as i64 - original.len() as i64,
            mismatches,
            original_sha256,
            reconstructed_sha256,
            exact,
        }
    }

    pub fn print(&self) {
        if self.exact {
            println!("  Validation: exact match (sha256 {})", self.original_sha256);
            return;
        }
        println!(
            "  Validation: {:.2}% of {} bytes match",
            self.accuracy * 100.0,
            self.compared_len
        );
        if self.length_delta != 0 {
            println!("  Length differs by {:+} bytes", self.length_delta);
        }
        if !self.mismatches.is_empty() {
            let offsets: Vec<String> = self.mismatches.iter().map(|o| o.to_string()).collect();
            println!("  First mismatches at offsets: {}", offsets.join(", "));
        }
    }
}

fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_accuracy() {
        assert_relative_eq!(accuracy(b"abcd", b"abcd"), 1.0);
        assert_relative_eq!(accuracy(b"abcd", b"abXd"), 0.75);
        // only the overlap is compared
        assert_relative_eq!(accuracy(b"abcd", b"ab"), 1.0);
        assert_relative_eq!(accuracy(b"", b"ab"), 0.0);
    }

    #[test]
    fn test_exact_report() {
        let report = ValidationReport::compare(b"sonar", b"sonar");
        assert!(report.exact);
        assert!(report.mismatches.is_empty());
        assert_eq!(report.length_delta, 0);
        assert_eq!(
            report.original_sha256,
            "48ce1a75f18924f02f7d555a0c30d5c2f5f09eba641a555555d355a477bb9ae6"
        );
        assert_eq!(report.original_sha256, report.reconstructed_sha256);
    }

    #[test]
    fn test_mismatch_report() {
        let original: Vec<u8> = (0..40).collect();
        let mut reconstructed = original.clone();
        for offset in (0..40).step_by(3) {
            reconstructed[offset] ^= 0xFF;
        }
        reconstructed.truncate(38);

        let report = ValidationReport::compare(&original, &reconstructed);
        assert!(!report.exact);
        assert_eq!(report.compared_len, 38);
        assert_eq!(report.length_delta, -2);
        assert_eq!(report.mismatches, vec![0, 3, 6, 9, 12, 15, 18, 21, 24, 27]);
    }

    #[test]
    fn test_length_only_difference_is_not_exact() {
        let report = ValidationReport::compare(b"abc", b"abcd");
        assert_relative_eq!(report.accuracy, 1.0);
        assert!(!report.exact);
        assert_eq!(report.length_delta, 1);
    }
}
