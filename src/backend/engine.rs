//! Artifact engine
//!
//! Full backend. Renders with harmonics and writes every companion
//! artifact the decoders can read back. All settings live in the
//! [`SessionConfig`] handed to `init`.

use std::path::Path;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use super::{writers, PlaybackBackend, SessionConfig};
use crate::container::{self, RenderOptions};
use crate::error::{Result, SonarError};
use crate::sequence::{ToneSample, ToneSequence};

/// Name recorded in the metadata document and analysis report
pub const ENGINE_NAME: &str = "SONAR Audio Engine";

/// Version recorded in the metadata document and analysis report
pub const ENGINE_VERSION: &str = "AudioEngine 1.0.0";

/// Sample rates the engine renders at
pub const SUPPORTED_SAMPLE_RATES: [u32; 4] = [22050, 44100, 48000, 96000];

#[derive(Debug, Default)]
pub struct ArtifactEngine {
    config: SessionConfig,
    initialized: bool,
    played: usize,
}

impl ArtifactEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(SonarError::InvalidArgument {
                reason: format!("{} used before init", ENGINE_NAME),
            })
        }
    }
}

impl PlaybackBackend for ArtifactEngine {
    fn name(&self) -> &str {
        ENGINE_NAME
    }

    fn init(&mut self, config: &SessionConfig) -> Result<()> {
        if !SUPPORTED_SAMPLE_RATES.contains(&config.sample_rate) {
            return Err(SonarError::InvalidArgument {
                reason: format!(
                    "{} does not support {} Hz (supported: {:?})",
                    ENGINE_NAME, config.sample_rate, SUPPORTED_SAMPLE_RATES
                ),
            });
        }

        let master_volume = config.master_volume.clamp(0.0, 1.0);
        if master_volume != config.master_volume {
            warn!(
                "Master volume {} clamped to {}",
                config.master_volume, master_volume
            );
        }

        self.config = SessionConfig {
            master_volume,
            ..*config
        };
        self.initialized = true;
        self.played = 0;
        info!(
            "{} initialised: {} Hz, volume {:.2}",
            ENGINE_VERSION, self.config.sample_rate, self.config.master_volume
        );
        Ok(())
    }

    fn play(&mut self, tone: &ToneSample) -> Result<()> {
        self.ensure_initialized()?;
        debug!(
            "Playing {:.2} Hz at {:.3} for {:.3} s",
            tone.frequency,
            tone.amplitude * self.config.master_volume,
            tone.duration
        );
        if self.config.pacing && tone.duration.is_finite() && tone.duration > 0.0 {
            thread::sleep(Duration::from_secs_f64(tone.duration));
        }
        self.played += 1;
        Ok(())
    }

    fn write_container(&mut self, path: &Path, tones: &ToneSequence) -> Result<()> {
        self.ensure_initialized()?;
        let options = RenderOptions {
            master_volume: self.config.master_volume,
            ..RenderOptions::rich()
        };
        let samples = container::write_tones(path, tones, self.config.sample_rate, &options)?;
        info!("Audio container written: {} ({} samples)", path.display(), samples);
        Ok(())
    }

    fn write_table(&mut self, path: &Path, tones: &ToneSequence) -> Result<bool> {
        self.ensure_initialized()?;
        writers::write_table(path, tones)?;
        info!("Frequency table written: {}", path.display());
        Ok(true)
    }

    fn write_metadata(&mut self, path: &Path, tones: &ToneSequence) -> Result<bool> {
        self.ensure_initialized()?;
        writers::write_metadata(path, tones, &self.config)?;
        info!("Metadata document written: {}", path.display());
        Ok(true)
    }

    fn write_report(&mut self, path: &Path, tones: &ToneSequence) -> Result<bool> {
        self.ensure_initialized()?;
        writers::write_report(path, tones)?;
        info!("Analysis report written: {}", path.display());
        Ok(true)
    }

    fn cleanup(&mut self) {
        if self.initialized {
            info!("{} shut down after {} tones", ENGINE_NAME, self.played);
        }
        self.initialized = false;
    }
}
