//! Sonification (encode direction)
//!
//! Turns each partition into a tone sequence and drives a backend session
//! that plays it and leaves the artifacts on disk.

use std::path::PathBuf;

use log::{info, warn};

use crate::artifacts::ArtifactLayout;
use crate::backend::{BackendKind, BackendSession, SessionConfig};
use crate::codec::EncodeParams;
use crate::error::Result;
use crate::partition::PartitionedFile;
use crate::sequence::ToneSequence;

/// Tones listed in the frequency analysis
const ANALYSIS_PREVIEW: usize = 10;

/// What one partition produced
#[derive(Debug, Clone, PartialEq)]
pub struct SonifySummary {
    pub partition: usize,
    pub samples: usize,
    /// Artifacts written, container first
    pub artifacts: Vec<PathBuf>,
    /// Playback time in seconds
    pub duration: f64,
}

/// Encodes partitions through one backend
#[derive(Debug, Clone)]
pub struct Sonifier {
    layout: ArtifactLayout,
    params: EncodeParams,
    backend: BackendKind,
    master_volume: f64,
    pacing: bool,
}

impl Sonifier {
    pub fn new(layout: ArtifactLayout, params: EncodeParams, backend: BackendKind) -> Self {
        Sonifier {
            layout,
            params,
            backend,
            master_volume: 1.0,
            pacing: false,
        }
    }

    pub fn with_master_volume(mut self, master_volume: f64) -> Self {
        self.master_volume = master_volume;
        self
    }

    /// Sleep for each tone while playing
    pub fn with_pacing(mut self, pacing: bool) -> Self {
        self.pacing = pacing;
        self
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            sample_rate: self.params.sample_rate,
            master_volume: self.master_volume,
            pacing: self.pacing,
        }
    }

    /// Open the configured backend, falling back to the built-in renderer
    /// when the engine cannot start
    fn open_session(&self) -> Result<BackendSession> {
        let config = self.session_config();
        match BackendSession::open(self.backend.create(), &config) {
            Ok(session) => Ok(session),
            Err(e) if self.backend != BackendKind::Builtin => {
                warn!(
                    "{} backend unavailable ({}), using built-in renderer",
                    self.backend, e
                );
                BackendSession::open(BackendKind::Builtin.create(), &config)
            }
            Err(e) => Err(e),
        }
    }

    /// Sonify one partition
    ///
    /// An empty partition produces no artifacts.
    pub fn sonify_partition(&self, partition: usize, bytes: &[u8]) -> Result<SonifySummary> {
        let tones = ToneSequence::from_bytes(bytes, &self.params);
        let mut summary = SonifySummary {
            partition,
            samples: tones.len(),
            artifacts: Vec::new(),
            duration: 0.0,
        };

        if tones.is_empty() {
            info!("Partition {} is empty, nothing to sonify", partition);
            return Ok(summary);
        }

        let mut session = self.open_session()?;
        info!(
            "Sonifying partition {} ({} bytes) with {}",
            partition,
            bytes.len(),
            session.name()
        );

        session.play_all(&tones)?;

        let container = self.layout.container(partition);
        session.write_container(&container, &tones)?;
        summary.artifacts.push(container);

        let table = self.layout.table(partition);
        if session.write_table(&table, &tones)? {
            summary.artifacts.push(table);
        }
        let metadata = self.layout.metadata(partition);
        if session.write_metadata(&metadata, &tones)? {
            summary.artifacts.push(metadata);
        }
        let report = self.layout.report(partition);
        if session.write_report(&report, &tones)? {
            summary.artifacts.push(report);
        }

        summary.duration = tones.stats().map_or(0.0, |s| s.total_duration);
        print_frequency_analysis(&tones);

        Ok(summary)
    }

    /// Sonify every partition of a file in order
    pub fn sonify_file(&self, file: &PartitionedFile) -> Result<Vec<SonifySummary>> {
        file.partitions()
            .map(|(index, bytes)| self.sonify_partition(index, bytes))
            .collect()
    }
}

/// Print the first few tones and statistics for the whole sequence
fn print_frequency_analysis(tones: &ToneSequence) {
    println!();
    println!("Frequency Analysis:");
    for tone in tones.iter().take(ANALYSIS_PREVIEW) {
        println!(
            "Byte 0x{:02X} -> {:.2} Hz (Amp: {:.2})",
            tone.source_byte, tone.frequency, tone.amplitude
        );
    }
    if tones.len() > ANALYSIS_PREVIEW {
        println!("... {} more", tones.len() - ANALYSIS_PREVIEW);
    }

    if let Some(stats) = tones.stats() {
        println!();
        println!("Statistics:");
        println!("Average frequency: {:.2} Hz", stats.mean_frequency);
        println!(
            "Frequency range: {:.2} - {:.2} Hz",
            stats.min_frequency, stats.max_frequency
        );
        println!("Total audio duration: {:.2} seconds", stats.total_duration);
    }
}
