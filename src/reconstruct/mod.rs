//! Reconstruction Orchestrator
//!
//! Picks the best surviving artifact for each partition, decodes it, and
//! reports how much of the result can be trusted. Artifacts are tried in
//! [`ArtifactKind::PRIORITY`] order and a per-file failure falls through
//! to the next one.

pub mod combine;
mod validate;

pub use combine::{combine_partitions, CombineSummary};
pub use validate::{accuracy, ValidationReport, MAX_REPORTED_MISMATCHES};

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::artifacts::{ArtifactLayout, RECONSTRUCTED_PREFIX};
use crate::codec::DecodeParams;
use crate::decoders::{AcousticDecoder, ArtifactDecoder, ArtifactKind};
use crate::error::{Result, SonarError};
use crate::partition::PartitionedFile;
use crate::sequence::RecoveredSequence;

/// Number of leading bytes shown in console reports
const PREVIEW_BYTES: usize = 10;

// ============================================================================
// Results
// ============================================================================

/// Bytes recovered from one artifact and how much to trust them
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructionResult {
    pub bytes: Vec<u8>,
    pub total_samples: usize,
    pub successful_samples: usize,
    pub average_confidence: f64,
    pub source: ArtifactKind,
    pub source_path: PathBuf,
}

impl ReconstructionResult {
    pub fn from_sequence(seq: &RecoveredSequence, source: ArtifactKind, source_path: &Path) -> Self {
        let successful_samples = match source.success_threshold() {
            Some(threshold) => seq.count_above(threshold),
            None => seq.len(),
        };

        ReconstructionResult {
            bytes: seq.to_bytes(),
            total_samples: seq.len(),
            successful_samples,
            average_confidence: seq.mean_confidence(),
            source,
            source_path: source_path.to_path_buf(),
        }
    }

    /// Successful samples as a percentage of all samples
    pub fn success_rate(&self) -> f64 {
        if self.total_samples == 0 {
            return 0.0;
        }
        self.successful_samples as f64 / self.total_samples as f64 * 100.0
    }

    /// Write the recovered bytes to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.bytes).map_err(|e| SonarError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Print a console summary
    pub fn print_report(&self, label: &str) {
        println!("{}: {} bytes from {}", label, self.bytes.len(), self.source);
        println!("  Source: {}", self.source_path.display());
        println!(
            "  Samples: {}/{} successful ({:.1}%)",
            self.successful_samples,
            self.total_samples,
            self.success_rate()
        );
        println!("  Average confidence: {:.3}", self.average_confidence);
        println!("  First bytes: {}", hex_preview(&self.bytes));
    }
}

/// What happened to one partition during a batch
#[derive(Debug)]
pub enum PartitionOutcome {
    Reconstructed {
        partition: usize,
        result: ReconstructionResult,
        output: PathBuf,
        validation: Option<ValidationReport>,
    },
    /// The original partition holds no bytes, so no artifacts are expected
    Empty { partition: usize },
    Failed { partition: usize, error: SonarError },
}

impl PartitionOutcome {
    pub fn partition(&self) -> usize {
        match self {
            PartitionOutcome::Reconstructed { partition, .. }
            | PartitionOutcome::Empty { partition }
            | PartitionOutcome::Failed { partition, .. } => *partition,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, PartitionOutcome::Failed { .. })
    }
}

/// Outcome of a whole batch
#[derive(Debug)]
pub struct BatchOutcome {
    pub partitions: Vec<PartitionOutcome>,
    pub combined: Option<CombineSummary>,
    /// No partition failed and the combined output holds at least one byte
    pub success: bool,
}

impl BatchOutcome {
    pub fn reconstructed_count(&self) -> usize {
        self.partitions
            .iter()
            .filter(|p| matches!(p, PartitionOutcome::Reconstructed { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.partitions.iter().filter(|p| p.is_failure()).count()
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Reconstructs partitions from the artifacts in one directory
#[derive(Debug, Clone)]
pub struct Reconstructor {
    layout: ArtifactLayout,
    params: DecodeParams,
}

impl Reconstructor {
    pub fn new(layout: ArtifactLayout, params: DecodeParams) -> Self {
        Reconstructor { layout, params }
    }

    /// Reconstruct one partition from the best artifact that decodes
    ///
    /// # Errors
    /// * `ArtifactNotFound` - no artifact exists for the partition
    /// * `DecodeFailed` - every existing artifact failed
    pub fn reconstruct_partition(&self, partition: usize) -> Result<ReconstructionResult> {
        let candidates = self.layout.existing(partition);
        if candidates.is_empty() {
            return Err(SonarError::ArtifactNotFound { partition });
        }

        for (kind, path) in &candidates {
            match kind.decoder().decode(path, &self.params) {
                Ok(seq) => {
                    info!(
                        "Partition {}: {} samples from {}",
                        partition,
                        seq.len(),
                        path.display()
                    );
                    return Ok(ReconstructionResult::from_sequence(&seq, *kind, path));
                }
                Err(e) => warn!(
                    "Partition {}: {} unusable, trying next artifact: {}",
                    partition, kind, e
                ),
            }
        }

        Err(SonarError::DecodeFailed {
            partition,
            attempts: candidates.len(),
        })
    }

    /// Reconstruct a single audio container, writing
    /// `dsonar_reconstructed_<stem>.bin` into the artifact directory
    pub fn reconstruct_container_file(&self, path: &Path) -> Result<(ReconstructionResult, PathBuf)> {
        let seq = AcousticDecoder.decode(path, &self.params)?;
        let result = ReconstructionResult::from_sequence(&seq, ArtifactKind::Acoustic, path);

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "container".to_string());
        let output = self
            .layout
            .dir()
            .join(format!("{}{}.bin", RECONSTRUCTED_PREFIX, stem));
        result.save(&output)?;

        info!("Reconstructed {} bytes into {}", result.bytes.len(), output.display());
        Ok((result, output))
    }

    /// Reconstruct partitions `0..partition_count`, then combine them
    ///
    /// Each success is saved and, when `original` is given, validated
    /// against the matching original partition. Recoverable failures are
    /// recorded and the batch moves on.
    pub fn reconstruct_batch(
        &self,
        partition_count: usize,
        original: Option<&PartitionedFile>,
        combined_output: &Path,
    ) -> Result<BatchOutcome> {
        let mut partitions = Vec::with_capacity(partition_count);

        for partition in 0..partition_count {
            let expected = original.and_then(|o| o.partition(partition));

            let outcome = match self.reconstruct_partition(partition) {
                Ok(result) => {
                    let output = self.layout.reconstructed_partition(partition);
                    result.save(&output)?;
                    result.print_report(&format!("Partition {}", partition));

                    let validation = expected.map(|orig| ValidationReport::compare(orig, &result.bytes));
                    if let Some(report) = &validation {
                        report.print();
                    }

                    PartitionOutcome::Reconstructed {
                        partition,
                        result,
                        output,
                        validation,
                    }
                }
                Err(SonarError::ArtifactNotFound { .. }) if expected.is_some_and(<[u8]>::is_empty) => {
                    info!("Partition {} is empty in the original, nothing to reconstruct", partition);
                    self.discard_stale_output(partition)?;
                    PartitionOutcome::Empty { partition }
                }
                Err(e) if e.is_recoverable() => {
                    warn!("Partition {} failed: {} ({})", partition, e, e.recovery_hint());
                    self.discard_stale_output(partition)?;
                    PartitionOutcome::Failed { partition, error: e }
                }
                Err(e) => return Err(e),
            };
            partitions.push(outcome);
        }

        let combined = match combine_partitions(self.layout.dir(), partition_count, combined_output) {
            Ok(summary) => Some(summary),
            Err(e @ SonarError::EmptyResult { .. }) => {
                warn!("Nothing to combine: {}", e);
                None
            }
            Err(e) => return Err(e),
        };

        let success = !partitions.iter().any(PartitionOutcome::is_failure)
            && combined.as_ref().is_some_and(|c| c.bytes_written > 0);

        Ok(BatchOutcome {
            partitions,
            combined,
            success,
        })
    }

    /// Remove a partition output left by an earlier run so it cannot
    /// reach the combined file
    fn discard_stale_output(&self, partition: usize) -> Result<()> {
        let path = self.layout.reconstructed_partition(partition);
        if !path.is_file() {
            return Ok(());
        }
        warn!(
            "Partition {}: discarding output from an earlier run ({})",
            partition,
            path.display()
        );
        fs::remove_file(&path).map_err(|e| SonarError::FileWriteError { path, source: e })
    }
}

/// Space-separated hex of the first few bytes
pub(crate) fn hex_preview(bytes: &[u8]) -> String {
    let mut preview: Vec<String> = bytes
        .iter()
        .take(PREVIEW_BYTES)
        .map(|b| format!("{:02X}", b))
        .collect();
    if bytes.len() > PREVIEW_BYTES {
        preview.push("...".to_string());
    }
    preview.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoders::TABLE_HEADER;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn table_text(rows: &[(u8, f64)]) -> String {
        let mut text = format!("{}\n", TABLE_HEADER);
        for (i, (byte, amplitude)) in rows.iter().enumerate() {
            text.push_str(&format!(
                "{},0x{:02X},{},1000.00,{:.3},0.050\n",
                i, byte, byte, amplitude
            ));
        }
        text
    }

    const REPORT: &str = "Detailed Sample Data:\nByte\tFreq(Hz)\tAmp\tDuration(s)\n----\t--------\t---\t-----------\n0x80\t1223.92\t\t0.552\t0.050\n";

    #[test]
    fn test_result_from_table_sequence() {
        let seq = crate::decoders::TableDecoder
            .decode_str(&table_text(&[(0x41, 0.3), (0x42, 0.9), (0x43, 0.6)]))
            .unwrap();
        let result = ReconstructionResult::from_sequence(&seq, ArtifactKind::Table, Path::new("t.csv"));

        assert_eq!(result.bytes, b"ABC".to_vec());
        assert_eq!(result.total_samples, 3);
        assert_eq!(result.successful_samples, 2);
        assert_relative_eq!(result.average_confidence, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_acoustic_counts_every_sample() {
        let mut seq = RecoveredSequence::new();
        seq.push(1, 300.0, 0.1);
        seq.push(2, 300.0, 0.7);
        let result = ReconstructionResult::from_sequence(&seq, ArtifactKind::Acoustic, Path::new("a.wav"));
        assert_eq!(result.successful_samples, 2);
        assert_relative_eq!(result.success_rate(), 100.0);
    }

    #[test]
    fn test_no_artifacts() {
        let dir = tempdir().unwrap();
        let reconstructor = Reconstructor::new(ArtifactLayout::new(dir.path()), DecodeParams::default());

        let err = reconstructor.reconstruct_partition(0).unwrap_err();
        assert!(matches!(err, SonarError::ArtifactNotFound { partition: 0 }));
    }

    #[test]
    fn test_table_preferred_over_report() {
        let dir = tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        fs::write(layout.table(0), table_text(&[(0x41, 0.9)])).unwrap();
        fs::write(layout.report(0), REPORT).unwrap();

        let reconstructor = Reconstructor::new(layout, DecodeParams::default());
        let result = reconstructor.reconstruct_partition(0).unwrap();

        assert_eq!(result.source, ArtifactKind::Table);
        assert_eq!(result.bytes, vec![0x41]);
    }

    #[test]
    fn test_corrupt_table_falls_back() {
        let dir = tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        fs::write(layout.table(0), "garbage without a header").unwrap();
        fs::write(layout.report(0), REPORT).unwrap();

        let reconstructor = Reconstructor::new(layout, DecodeParams::default());
        let result = reconstructor.reconstruct_partition(0).unwrap();

        assert_eq!(result.source, ArtifactKind::Report);
        assert_eq!(result.bytes, vec![0x80]);
        assert_eq!(result.successful_samples, 1);
    }

    #[test]
    fn test_every_artifact_fails() {
        let dir = tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        fs::write(layout.table(0), "").unwrap();
        fs::write(layout.container(0), b"RIFF").unwrap();

        let reconstructor = Reconstructor::new(layout, DecodeParams::default());
        let err = reconstructor.reconstruct_partition(0).unwrap_err();

        assert!(matches!(
            err,
            SonarError::DecodeFailed {
                partition: 0,
                attempts: 2
            }
        ));
    }

    #[test]
    fn test_batch_continues_past_failures() {
        let dir = tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        fs::write(layout.table(0), table_text(&[(b'h', 0.9), (b'i', 0.9)])).unwrap();
        fs::write(layout.table(2), table_text(&[(b'!', 0.9)])).unwrap();
        let output = dir.path().join("dsonar_reconstructed_greeting.txt");

        let reconstructor = Reconstructor::new(layout, DecodeParams::default());
        let outcome = reconstructor.reconstruct_batch(3, None, &output).unwrap();

        assert_eq!(outcome.reconstructed_count(), 2);
        assert_eq!(outcome.failed_count(), 1);
        assert!(!outcome.success);
        assert_eq!(fs::read(&output).unwrap(), b"hi!".to_vec());
        assert_eq!(outcome.combined.unwrap().skipped, vec![1]);
    }

    #[test]
    fn test_batch_ignores_output_from_earlier_run() {
        let dir = tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        fs::write(layout.table(0), table_text(&[(b'a', 0.9)])).unwrap();
        fs::write(layout.table(2), table_text(&[(b'c', 0.9)])).unwrap();
        fs::write(layout.reconstructed_partition(1), b"STALE").unwrap();
        let output = dir.path().join("dsonar_reconstructed_abc.txt");

        let reconstructor = Reconstructor::new(layout.clone(), DecodeParams::default());
        let outcome = reconstructor.reconstruct_batch(3, None, &output).unwrap();

        assert_eq!(outcome.failed_count(), 1);
        assert_eq!(fs::read(&output).unwrap(), b"ac".to_vec());
        assert_eq!(outcome.combined.unwrap().skipped, vec![1]);
        assert!(!layout.reconstructed_partition(1).exists());
    }

    #[test]
    fn test_table_reconstruction_is_repeatable() {
        let dir = tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        fs::write(layout.table(0), table_text(&[(0x10, 0.9), (0xFE, 0.4), (0x00, 1.0)])).unwrap();

        let reconstructor = Reconstructor::new(layout, DecodeParams::default());
        let first = reconstructor.reconstruct_partition(0).unwrap();
        let second = reconstructor.reconstruct_partition(0).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.bytes, vec![0x10, 0xFE, 0x00]);
    }

    #[test]
    fn test_batch_validates_and_accepts_empty_partitions() {
        let dir = tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        fs::write(layout.table(0), table_text(&[(b'o', 0.9)])).unwrap();
        fs::write(layout.table(1), table_text(&[(b'k', 0.9)])).unwrap();
        let original = PartitionedFile::from_bytes(b"ok".to_vec(), 4).unwrap();
        let output = dir.path().join("dsonar_reconstructed_ok.txt");

        let reconstructor = Reconstructor::new(layout, DecodeParams::default());
        let outcome = reconstructor
            .reconstruct_batch(4, Some(&original), &output)
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.reconstructed_count(), 2);
        assert!(matches!(outcome.partitions[3], PartitionOutcome::Empty { partition: 3 }));
        match &outcome.partitions[0] {
            PartitionOutcome::Reconstructed { validation, .. } => {
                assert!(validation.as_ref().unwrap().exact);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_hex_preview() {
        assert_eq!(hex_preview(&[0x41, 0x0A]), "41 0A");
        assert_eq!(hex_preview(&[0u8; 12]), "00 00 00 00 00 00 00 00 00 00 ...");
        assert_eq!(hex_preview(&[]), "");
    }
}
