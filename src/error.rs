//! Error handling for Sonar
//!
//! Per-line and per-window failures are recovered where they happen;
//! per-file failures surface here so the reconstructor can fall back to
//! the next artifact.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Sonar operations
pub type Result<T> = std::result::Result<T, SonarError>;

/// Main error type for Sonar operations
#[derive(Error, Debug)]
pub enum SonarError {
    // Artifact Errors
    #[error("No sonification artifact found for partition {partition}")]
    ArtifactNotFound { partition: usize },

    #[error("Invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("No samples recovered from {context}")]
    EmptyResult { context: String },

    #[error("Every artifact for partition {partition} failed to decode ({attempts} tried)")]
    DecodeFailed { partition: usize, attempts: usize },

    // File Errors
    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write audio container: {path}")]
    AudioWrite {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    // Argument Errors
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SonarError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SonarError::ArtifactNotFound { .. } => "ARTIFACT_NOT_FOUND",
            SonarError::InvalidHeader { .. } => "INVALID_HEADER",
            SonarError::MalformedRecord { .. } => "MALFORMED_RECORD",
            SonarError::EmptyResult { .. } => "EMPTY_RESULT",
            SonarError::DecodeFailed { .. } => "DECODE_FAILED",
            SonarError::FileReadError { .. } => "FILE_READ_ERROR",
            SonarError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            SonarError::AudioWrite { .. } => "AUDIO_WRITE_ERROR",
            SonarError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            SonarError::Io(_) => "IO_ERROR",
            SonarError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if batch processing can continue past this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SonarError::ArtifactNotFound { .. }
                | SonarError::InvalidHeader { .. }
                | SonarError::MalformedRecord { .. }
                | SonarError::EmptyResult { .. }
                | SonarError::DecodeFailed { .. }
        )
    }

    /// Returns a suggested recovery action for this error
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::ArtifactNotFound { .. } => {
                "Run the sonar module first, or point --output-dir at the artifact directory"
            }
            Self::InvalidHeader { .. } => "The artifact may be truncated; regenerate it with the sonar module",
            Self::MalformedRecord { .. } => "The line was skipped; check the artifact for manual edits",
            Self::EmptyResult { .. } => "Check that encode and decode frequency parameters agree",
            Self::DecodeFailed { .. } => "Regenerate the frequency table, which decodes exactly",
            Self::InvalidArgument { .. } => "Run with --help for usage",
            _ => "Check the error details and try again",
        }
    }
}
