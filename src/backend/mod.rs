//! Playback backends
//!
//! A backend turns a tone sequence into artifacts on disk. Two
//! implementations exist:
//! - [`BuiltinRenderer`]: always available, writes only the audio container
//! - [`ArtifactEngine`]: harmonically rich container plus the frequency
//!   table, metadata document and analysis report
//!
//! A backend is only driven through a [`BackendSession`], which calls
//! [`PlaybackBackend::cleanup`] when dropped.

mod builtin;
mod engine;
pub mod writers;

pub use builtin::BuiltinRenderer;
pub use engine::{ArtifactEngine, ENGINE_NAME, ENGINE_VERSION, SUPPORTED_SAMPLE_RATES};

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::codec::DEFAULT_SAMPLE_RATE;
use crate::error::Result;
use crate::sequence::{ToneSample, ToneSequence};

/// Which backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Builtin,
    #[default]
    Engine,
}

impl BackendKind {
    pub fn create(self) -> Box<dyn PlaybackBackend> {
        match self {
            BackendKind::Builtin => Box::new(BuiltinRenderer::new()),
            BackendKind::Engine => Box::new(ArtifactEngine::new()),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Builtin => f.write_str("builtin"),
            BackendKind::Engine => f.write_str("engine"),
        }
    }
}

/// Settings a backend is initialised with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub sample_rate: u32,
    /// Output gain in 0.0..=1.0
    pub master_volume: f64,
    /// Sleep for each tone's duration while playing
    pub pacing: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            sample_rate: DEFAULT_SAMPLE_RATE,
            master_volume: 1.0,
            pacing: false,
        }
    }
}

/// Interface every playback backend implements
///
/// The report writers return `Ok(false)` when the backend does not
/// produce that artifact.
pub trait PlaybackBackend {
    /// Backend name for logs and console output
    fn name(&self) -> &str;

    /// Prepare for a session
    fn init(&mut self, config: &SessionConfig) -> Result<()>;

    /// Play a single tone
    fn play(&mut self, tone: &ToneSample) -> Result<()>;

    /// Play every tone in order
    fn play_all(&mut self, tones: &ToneSequence) -> Result<usize> {
        for tone in tones {
            self.play(tone)?;
        }
        Ok(tones.len())
    }

    /// Render the sequence into an audio container
    fn write_container(&mut self, path: &Path, tones: &ToneSequence) -> Result<()>;

    /// Write the frequency table
    fn write_table(&mut self, path: &Path, tones: &ToneSequence) -> Result<bool> {
        let _ = (path, tones);
        Ok(false)
    }

    /// Write the metadata document
    fn write_metadata(&mut self, path: &Path, tones: &ToneSequence) -> Result<bool> {
        let _ = (path, tones);
        Ok(false)
    }

    /// Write the analysis report
    fn write_report(&mut self, path: &Path, tones: &ToneSequence) -> Result<bool> {
        let _ = (path, tones);
        Ok(false)
    }

    /// Release whatever the session holds
    fn cleanup(&mut self);
}

/// An initialised backend, cleaned up on drop
pub struct BackendSession {
    backend: Box<dyn PlaybackBackend>,
}

impl BackendSession {
    /// Initialise `backend` for a session
    ///
    /// If initialisation fails the backend is still cleaned up.
    pub fn open(backend: Box<dyn PlaybackBackend>, config: &SessionConfig) -> Result<Self> {
        let mut session = BackendSession { backend };
        session.backend.init(config)?;
        Ok(session)
    }
}

impl Deref for BackendSession {
    type Target = dyn PlaybackBackend;

    fn deref(&self) -> &Self::Target {
        self.backend.as_ref()
    }
}

impl DerefMut for BackendSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.backend.as_mut()
    }
}

impl Drop for BackendSession {
    fn drop(&mut self) {
        self.backend.cleanup();
    }
}
