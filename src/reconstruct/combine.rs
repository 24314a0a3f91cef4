//! Partition Combiner
//!
//! Concatenates per-partition reconstructions, in index order, into one
//! output file. A missing partition leaves a gap in the output rather than
//! aborting the whole file.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::artifacts::ArtifactLayout;
use crate::error::{Result, SonarError};

/// What went into a combined output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineSummary {
    pub output: PathBuf,
    pub bytes_written: usize,
    /// Partition indices included, in order
    pub included: Vec<usize>,
    /// Partition indices whose reconstruction was missing or unreadable
    pub skipped: Vec<usize>,
}

/// Concatenate `dsonar_reconstructed_partition_<i>.bin` for every
/// `i < partition_count` found in `dir` into `output`
///
/// # Errors
/// * `EmptyResult` - no partition contributed any bytes; nothing is written
/// * `FileWriteError` - the output cannot be written
pub fn combine_partitions(
    dir: &Path,
    partition_count: usize,
    output: &Path,
) -> Result<CombineSummary> {
    let layout = ArtifactLayout::new(dir);
    let mut combined = Vec::new();
    let mut included = Vec::new();
    let mut skipped = Vec::new();

    for index in 0..partition_count {
        let path = layout.reconstructed_partition(index);
        match fs::read(&path) {
            Ok(bytes) => {
                combined.extend_from_slice(&bytes);
                included.push(index);
            }
            Err(e) => {
                warn!(
                    "Partition {} missing from combined output ({}): {}",
                    index,
                    path.display(),
                    e
                );
                skipped.push(index);
            }
        }
    }

    if combined.is_empty() {
        return Err(SonarError::EmptyResult {
            context: format!("{} reconstructed partitions", partition_count),
        });
    }

    fs::write(output, &combined).map_err(|e| SonarError::FileWriteError {
        path: output.to_path_buf(),
        source: e,
    })?;

    info!(
        "Combined {} partitions ({} bytes) into {}",
        included.len(),
        combined.len(),
        output.display()
    );

    Ok(CombineSummary {
        output: output.to_path_buf(),
        bytes_written: combined.len(),
        included,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_skips_missing_partition() {
        let dir = tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        fs::write(layout.reconstructed_partition(0), [0xAAu8; 10]).unwrap();
        fs::write(layout.reconstructed_partition(2), [0xBBu8; 5]).unwrap();
        let output = dir.path().join("combined.bin");

        let summary = combine_partitions(dir.path(), 3, &output).unwrap();

        assert_eq!(summary.bytes_written, 15);
        assert_eq!(summary.included, vec![0, 2]);
        assert_eq!(summary.skipped, vec![1]);

        let mut expected = vec![0xAA; 10];
        expected.extend_from_slice(&[0xBB; 5]);
        assert_eq!(fs::read(&output).unwrap(), expected);
    }

    #[test]
    fn test_nothing_to_combine() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("combined.bin");

        let err = combine_partitions(dir.path(), 4, &output).unwrap_err();
        assert!(matches!(err, SonarError::EmptyResult { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_empty_partitions_only() {
        let dir = tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path());
        fs::write(layout.reconstructed_partition(0), b"").unwrap();
        let output = dir.path().join("combined.bin");

        let err = combine_partitions(dir.path(), 1, &output).unwrap_err();
        assert!(matches!(err, SonarError::EmptyResult { .. }));
    }
}
