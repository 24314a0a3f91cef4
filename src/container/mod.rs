//! Audio container writing and reading
//!
//! Sonification output is always mono 16-bit linear PCM with a canonical
//! 44-byte header. Writing and sample extraction go through `hound`; the
//! header check in [`ContainerHeader::parse`] is done by hand so a bad
//! container is rejected before any sample is read.

mod header;
mod render;

pub use header::{ContainerHeader, HEADER_LEN};
pub use render::{
    render_tones, tone_len, RenderOptions, OUTPUT_SCALE, SECOND_HARMONIC, THIRD_HARMONIC,
};

use std::fs;
use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{Result, SonarError};
use crate::sequence::ToneSequence;

/// Bit depth of every container this crate writes
pub const BITS_PER_SAMPLE: u16 = 16;

/// PCM samples and the header they were read with
#[derive(Debug, Clone, PartialEq)]
pub struct PcmData {
    pub header: ContainerHeader,
    /// First channel only, scaled to the 16-bit range
    pub samples: Vec<i16>,
}

/// Container format for a given sample rate
pub fn container_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

/// Write raw PCM samples into a container
///
/// # Errors
/// * `AudioWrite` - the file cannot be created or finalized
pub fn write_pcm(path: &Path, sample_rate: u32, samples: &[i16]) -> Result<()> {
    let audio_err = |source: hound::Error| SonarError::AudioWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = WavWriter::create(path, container_spec(sample_rate)).map_err(audio_err)?;
    for &sample in samples {
        writer.write_sample(sample).map_err(audio_err)?;
    }
    writer.finalize().map_err(audio_err)?;

    Ok(())
}

/// Render a tone sequence and write it as a container
///
/// Returns the number of PCM samples written.
pub fn write_tones(
    path: &Path,
    tones: &ToneSequence,
    sample_rate: u32,
    options: &RenderOptions,
) -> Result<usize> {
    let pcm = render_tones(tones, sample_rate, options);
    write_pcm(path, sample_rate, &pcm)?;
    Ok(pcm.len())
}

/// Read a container from disk
///
/// # Errors
/// * `FileReadError` - the file cannot be read
/// * `InvalidHeader` - the header fails validation or the sample data
///   cannot be decoded
pub fn read_pcm(path: &Path) -> Result<PcmData> {
    let bytes = fs::read(path).map_err(|e| SonarError::FileReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    read_pcm_bytes(&bytes)
}

/// Read a container held in memory
pub fn read_pcm_bytes(bytes: &[u8]) -> Result<PcmData> {
    let header = ContainerHeader::parse(bytes)?;

    let mut reader = WavReader::new(Cursor::new(bytes)).map_err(|e| SonarError::InvalidHeader {
        reason: format!("unreadable container: {}", e),
    })?;
    let spec = reader.spec();

    if spec.sample_format != SampleFormat::Int {
        return Err(SonarError::InvalidHeader {
            reason: "floating point containers are not produced by sonification".to_string(),
        });
    }

    let channels = spec.channels.max(1) as usize;
    let bits = spec.bits_per_sample;
    let samples = reader
        .samples::<i32>()
        .step_by(channels)
        .map(|s| s.map(|v| to_16_bit(v, bits)))
        .collect::<std::result::Result<Vec<i16>, _>>()
        .map_err(|e| SonarError::InvalidHeader {
            reason: format!("failed to read {}-bit samples: {}", bits, e),
        })?;

    Ok(PcmData { header, samples })
}

/// Rescale an integer sample of any supported depth to 16 bits
fn to_16_bit(value: i32, bits: u16) -> i16 {
    match bits {
        0..=16 => (value << (16 - bits)) as i16,
        _ => (value >> (bits - 16)) as i16,
    }
}
