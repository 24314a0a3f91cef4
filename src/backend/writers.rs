//! Companion artifact writers
//!
//! Each writer produces exactly the layout its decoder in
//! [`crate::decoders`] reads.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::engine::{ENGINE_NAME, ENGINE_VERSION};
use super::SessionConfig;
use crate::decoders::{SECTION_MARKER, TABLE_HEADER};
use crate::error::{Result, SonarError};
use crate::sequence::ToneSequence;

// ============================================================================
// Frequency table
// ============================================================================

/// Render the frequency table
pub fn table_text(tones: &ToneSequence) -> String {
    let mut out = String::with_capacity(64 + tones.len() * 40);
    out.push_str(TABLE_HEADER);
    out.push('\n');
    for (i, tone) in tones.iter().enumerate() {
        let _ = writeln!(
            out,
            "{},0x{:02X},{},{:.2},{:.3},{:.3}",
            i, tone.source_byte, tone.source_byte, tone.frequency, tone.amplitude, tone.duration
        );
    }
    out
}

pub fn write_table(path: &Path, tones: &ToneSequence) -> Result<()> {
    write_text(path, &table_text(tones))
}

// ============================================================================
// Metadata document
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub master_volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleEntry {
    /// `0xHH`
    pub byte: String,
    pub frequency: f64,
    pub amplitude: f64,
    pub duration: f64,
}

/// Engine metadata document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub audio_engine: EngineInfo,
    pub audio_config: AudioConfig,
    pub generated_at: DateTime<Utc>,
    pub samples: Vec<SampleEntry>,
}

impl MetadataDocument {
    pub fn new(tones: &ToneSequence, config: &SessionConfig) -> Self {
        MetadataDocument {
            audio_engine: EngineInfo {
                name: ENGINE_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
            },
            audio_config: AudioConfig {
                sample_rate: config.sample_rate,
                master_volume: config.master_volume,
            },
            generated_at: Utc::now(),
            samples: tones
                .iter()
                .map(|t| SampleEntry {
                    byte: format!("0x{:02X}", t.source_byte),
                    frequency: round_to(t.frequency, 2),
                    amplitude: round_to(t.amplitude, 3),
                    duration: round_to(t.duration, 3),
                })
                .collect(),
        }
    }
}

pub fn write_metadata(path: &Path, tones: &ToneSequence, config: &SessionConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(&MetadataDocument::new(tones, config))?;
    write_text(path, &json)
}

// ============================================================================
// Analysis report
// ============================================================================

/// Render the analysis report
pub fn report_text(tones: &ToneSequence) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "SONAR Audio Analysis Report");
    let _ = writeln!(out, "===========================");
    let _ = writeln!(out);
    let _ = writeln!(out, "Generated by: {}", ENGINE_NAME);
    let _ = writeln!(out, "Version: {}", ENGINE_VERSION);
    let _ = writeln!(out);

    let Some(stats) = tones.stats() else {
        let _ = writeln!(out, "No samples.");
        return out;
    };

    let _ = writeln!(out, "Sample Statistics:");
    let _ = writeln!(out, "- Total samples: {}", stats.count);
    let _ = writeln!(out, "- Average frequency: {:.2} Hz", stats.mean_frequency);
    let _ = writeln!(
        out,
        "- Frequency range: {:.2} - {:.2} Hz",
        stats.min_frequency, stats.max_frequency
    );
    let _ = writeln!(out, "- Average amplitude: {:.3}", stats.mean_amplitude);
    let _ = writeln!(
        out,
        "- Amplitude range: {:.3} - {:.3}",
        stats.min_amplitude, stats.max_amplitude
    );
    let _ = writeln!(out, "- Total duration: {:.3} s", stats.total_duration);
    let _ = writeln!(out);

    let _ = writeln!(out, "{}:", SECTION_MARKER);
    let _ = writeln!(out, "Byte\tFreq(Hz)\tAmp\tDuration(s)");
    let _ = writeln!(out, "----\t--------\t---\t-----------");
    for tone in tones {
        let _ = writeln!(
            out,
            "0x{:02X}\t{:.2}\t\t{:.3}\t{:.3}",
            tone.source_byte, tone.frequency, tone.amplitude, tone.duration
        );
    }
    out
}

pub fn write_report(path: &Path, tones: &ToneSequence) -> Result<()> {
    write_text(path, &report_text(tones))
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).map_err(|e| SonarError::FileWriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
