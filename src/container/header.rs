//! Minimal container header parsing
//!
//! Only the fields the acoustic decoder needs are read, from their fixed
//! offsets in the canonical 44-byte PCM header.

use crate::error::{Result, SonarError};

/// Size of the canonical PCM header
pub const HEADER_LEN: usize = 44;

const RIFF_TAG: &[u8; 4] = b"RIFF";
const WAVE_TAG: &[u8; 4] = b"WAVE";

/// Format fields pulled from a container header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Size field of the RIFF chunk (file length - 8)
    pub riff_size: u32,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl ContainerHeader {
    /// Parse and validate the first 44 bytes of a container
    ///
    /// # Errors
    /// * `InvalidHeader` - fewer than 44 bytes, a tag mismatch, or a zero
    ///   channel count / sample rate
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(SonarError::InvalidHeader {
                reason: format!(
                    "container is {} bytes, header needs {}",
                    bytes.len(),
                    HEADER_LEN
                ),
            });
        }
        if &bytes[0..4] != RIFF_TAG {
            return Err(SonarError::InvalidHeader {
                reason: "missing RIFF tag".to_string(),
            });
        }
        if &bytes[8..12] != WAVE_TAG {
            return Err(SonarError::InvalidHeader {
                reason: "missing WAVE tag".to_string(),
            });
        }

        let header = ContainerHeader {
            riff_size: read_u32(bytes, 4),
            channels: read_u16(bytes, 22),
            sample_rate: read_u32(bytes, 24),
            byte_rate: read_u32(bytes, 28),
            block_align: read_u16(bytes, 32),
            bits_per_sample: read_u16(bytes, 34),
        };

        if header.channels == 0 || header.sample_rate == 0 {
            return Err(SonarError::InvalidHeader {
                reason: format!(
                    "unusable format: {} channels at {} Hz",
                    header.channels, header.sample_rate
                ),
            });
        }

        Ok(header)
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
