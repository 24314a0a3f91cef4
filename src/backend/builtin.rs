//! Built-in renderer
//!
//! Fallback backend: a plain sine per tone, no companion artifacts.

use std::path::Path;

use log::{debug, info};

use super::{PlaybackBackend, SessionConfig};
use crate::container::{self, RenderOptions};
use crate::error::Result;
use crate::sequence::{ToneSample, ToneSequence};

#[derive(Debug, Default)]
pub struct BuiltinRenderer {
    config: SessionConfig,
    played: usize,
}

impl BuiltinRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlaybackBackend for BuiltinRenderer {
    fn name(&self) -> &str {
        "Builtin Renderer"
    }

    fn init(&mut self, config: &SessionConfig) -> Result<()> {
        self.config = *config;
        self.played = 0;
        debug!("Builtin renderer ready at {} Hz", config.sample_rate);
        Ok(())
    }

    fn play(&mut self, tone: &ToneSample) -> Result<()> {
        debug!(
            "Tone 0x{:02X}: {:.2} Hz, amplitude {:.3}, {:.3} s",
            tone.source_byte, tone.frequency, tone.amplitude, tone.duration
        );
        self.played += 1;
        Ok(())
    }

    fn write_container(&mut self, path: &Path, tones: &ToneSequence) -> Result<()> {
        let options = RenderOptions {
            master_volume: self.config.master_volume,
            ..RenderOptions::default()
        };
        let samples = container::write_tones(path, tones, self.config.sample_rate, &options)?;
        info!("Wrote {} PCM samples to {}", samples, path.display());
        Ok(())
    }

    fn cleanup(&mut self) {
        debug!("Builtin renderer done after {} tones", self.played);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::EncodeParams;
    use crate::container::read_pcm;
    use tempfile::tempdir;

    #[test]
    fn test_writes_container_only() {
        let dir = tempdir().unwrap();
        let params = EncodeParams::default();
        let tones = ToneSequence::from_bytes(b"xyz", &params);

        let mut renderer = BuiltinRenderer::new();
        renderer.init(&SessionConfig::default()).unwrap();

        let path = dir.path().join("sonar_partition_0.wav");
        renderer.write_container(&path, &tones).unwrap();
        assert_eq!(read_pcm(&path).unwrap().samples.len(), 3 * params.samples_per_tone());

        let table = dir.path().join("table.csv");
        assert!(!renderer.write_table(&table, &tones).unwrap());
        assert!(!renderer.write_metadata(&table, &tones).unwrap());
        assert!(!renderer.write_report(&table, &tones).unwrap());
        assert!(!table.exists());
    }

    #[test]
    fn test_accepts_any_sample_rate() {
        let mut renderer = BuiltinRenderer::new();
        let config = SessionConfig {
            sample_rate: 11025,
            ..SessionConfig::default()
        };
        assert!(renderer.init(&config).is_ok());
    }
}
