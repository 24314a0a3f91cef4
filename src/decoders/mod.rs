//! Format Decoders
//!
//! One decoder per artifact kind. Each turns a single file back into a
//! [`RecoveredSequence`] and knows nothing about the others; choosing
//! between artifacts is the reconstructor's job.

mod acoustic;
mod metadata;
mod report;
mod table;

pub use acoustic::{AcousticDecoder, ACOUSTIC_CONFIDENCE, MAX_DETECTABLE_HZ, MIN_DETECTABLE_HZ};
pub use metadata::MetadataDecoder;
pub use report::{ReportDecoder, REPORT_CONFIDENCE, SECTION_MARKER};
pub use table::{TableDecoder, TABLE_HEADER};

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec::DecodeParams;
use crate::error::{Result, SonarError};
use crate::sequence::RecoveredSequence;

/// Kinds of sonification artifact, in reconstruction priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Exact frequency table (CSV)
    Table,
    /// Engine metadata document
    Metadata,
    /// Rendered audio container
    Acoustic,
    /// Human-readable analysis report
    Report,
}

impl ArtifactKind {
    /// All kinds, highest priority first
    pub const PRIORITY: [ArtifactKind; 4] = [
        ArtifactKind::Table,
        ArtifactKind::Metadata,
        ArtifactKind::Acoustic,
        ArtifactKind::Report,
    ];

    /// Confidence a sample must exceed to count as successful
    ///
    /// `None` means every recovered sample counts.
    pub fn success_threshold(self) -> Option<f64> {
        match self {
            ArtifactKind::Table | ArtifactKind::Metadata => Some(0.5),
            ArtifactKind::Report => Some(0.6),
            ArtifactKind::Acoustic => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ArtifactKind::Table => "frequency table",
            ArtifactKind::Metadata => "metadata document",
            ArtifactKind::Acoustic => "audio container",
            ArtifactKind::Report => "analysis report",
        }
    }

    /// Decoder for this kind
    pub fn decoder(self) -> Box<dyn ArtifactDecoder> {
        match self {
            ArtifactKind::Table => Box::new(TableDecoder),
            ArtifactKind::Metadata => Box::new(MetadataDecoder),
            ArtifactKind::Acoustic => Box::new(AcousticDecoder),
            ArtifactKind::Report => Box::new(ReportDecoder),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Turns one artifact file into recovered samples
pub trait ArtifactDecoder {
    /// Which artifact kind this decoder reads
    fn kind(&self) -> ArtifactKind;

    /// Decode the artifact at `path`
    ///
    /// # Errors
    /// * `FileReadError` - the file cannot be read
    /// * `InvalidHeader` - the file is not this kind of artifact
    /// * `EmptyResult` - nothing could be recovered
    fn decode(&self, path: &Path, params: &DecodeParams) -> Result<RecoveredSequence>;
}

/// Read a text artifact, replacing invalid UTF-8 rather than failing
pub(crate) fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| SonarError::FileReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Fail with `EmptyResult` when a decoder recovered nothing
pub(crate) fn non_empty(seq: RecoveredSequence, kind: ArtifactKind) -> Result<RecoveredSequence> {
    if seq.is_empty() {
        Err(SonarError::EmptyResult {
            context: kind.label().to_string(),
        })
    } else {
        Ok(seq)
    }
}
