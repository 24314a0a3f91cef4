//! Artifact file naming
//!
//! Every artifact lives directly in one output directory and is named after
//! the zero-based partition it belongs to.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::decoders::ArtifactKind;

/// Prefix shared by every sonification artifact
pub const ARTIFACT_PREFIX: &str = "sonar_partition_";

/// Prefix of reconstructed outputs
pub const RECONSTRUCTED_PREFIX: &str = "dsonar_reconstructed_";

/// Paths of all artifacts under one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    dir: PathBuf,
}

impl ArtifactLayout {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ArtifactLayout { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of one artifact kind for a partition
    pub fn path(&self, kind: ArtifactKind, partition: usize) -> PathBuf {
        let name = match kind {
            ArtifactKind::Acoustic => format!("{}{}.wav", ARTIFACT_PREFIX, partition),
            ArtifactKind::Table => format!("{}{}_frequencies.csv", ARTIFACT_PREFIX, partition),
            ArtifactKind::Metadata => format!("{}{}_metadata.json", ARTIFACT_PREFIX, partition),
            ArtifactKind::Report => format!("{}{}_analysis.txt", ARTIFACT_PREFIX, partition),
        };
        self.dir.join(name)
    }

    pub fn container(&self, partition: usize) -> PathBuf {
        self.path(ArtifactKind::Acoustic, partition)
    }

    pub fn table(&self, partition: usize) -> PathBuf {
        self.path(ArtifactKind::Table, partition)
    }

    pub fn metadata(&self, partition: usize) -> PathBuf {
        self.path(ArtifactKind::Metadata, partition)
    }

    pub fn report(&self, partition: usize) -> PathBuf {
        self.path(ArtifactKind::Report, partition)
    }

    /// Reconstructed bytes of one partition
    pub fn reconstructed_partition(&self, partition: usize) -> PathBuf {
        self.dir
            .join(format!("{}partition_{}.bin", RECONSTRUCTED_PREFIX, partition))
    }

    /// Combined reconstruction of the original file
    pub fn combined_output(&self, original: &Path) -> PathBuf {
        let name = original
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        self.dir.join(format!("{}{}", RECONSTRUCTED_PREFIX, name))
    }

    /// Artifacts present on disk for a partition, highest priority first
    pub fn existing(&self, partition: usize) -> Vec<(ArtifactKind, PathBuf)> {
        ArtifactKind::PRIORITY
            .iter()
            .map(|&kind| (kind, self.path(kind, partition)))
            .filter(|(_, path)| path.is_file())
            .collect()
    }

    /// Number of partitions implied by the artifacts on disk
    ///
    /// One more than the highest partition index found, 0 when the
    /// directory holds no artifacts.
    pub fn discover_partition_count(&self) -> usize {
        WalkDir::new(&self.dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| partition_index(&entry.file_name().to_string_lossy()))
            .max()
            .map_or(0, |highest| highest + 1)
    }
}

/// Partition index of an artifact file name
fn partition_index(name: &str) -> Option<usize> {
    let rest = name.strip_prefix(ARTIFACT_PREFIX)?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let suffix = &rest[digits.len()..];
    if !matches!(
        suffix,
        ".wav" | "_frequencies.csv" | "_metadata.json" | "_analysis.txt"
    ) {
        return None;
    }
    digits.parse().ok()
}
