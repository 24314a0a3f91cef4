//! Codec parameters for both directions
//!
//! Encode and decode parameters must agree on `base_frequency` and
//! `frequency_range` for an exact round trip. A mismatch only degrades
//! the recovered bytes.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SonarError};

/// Lowest tone frequency in Hz (A3)
pub const DEFAULT_BASE_FREQUENCY: f64 = 220.0;

/// Width of the tone band in Hz (220 Hz - 2220 Hz)
pub const DEFAULT_FREQUENCY_RANGE: f64 = 2000.0;

/// Sample rate of rendered containers
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Duration of one tone in seconds (50 ms per byte)
pub const DEFAULT_SAMPLE_DURATION: f64 = 0.05;

/// Frequency matching tolerance in Hz
pub const DEFAULT_TOLERANCE: f64 = 5.0;

/// Forward (byte to tone) parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeParams {
    /// Frequency of byte 0x00 in Hz
    pub base_frequency: f64,
    /// Frequency span covered by 0x00..=0xFF in Hz
    pub frequency_range: f64,
    /// Container sample rate in Hz
    pub sample_rate: u32,
    /// Seconds per tone
    pub sample_duration: f64,
}

impl Default for EncodeParams {
    fn default() -> Self {
        EncodeParams {
            base_frequency: DEFAULT_BASE_FREQUENCY,
            frequency_range: DEFAULT_FREQUENCY_RANGE,
            sample_rate: DEFAULT_SAMPLE_RATE,
            sample_duration: DEFAULT_SAMPLE_DURATION,
        }
    }
}

impl EncodeParams {
    /// Highest frequency the mapping produces (byte 0xFF)
    pub fn max_frequency(&self) -> f64 {
        self.base_frequency + self.frequency_range
    }

    /// Number of PCM samples rendered per tone
    pub fn samples_per_tone(&self) -> usize {
        (self.sample_duration * self.sample_rate as f64) as usize
    }

    /// Decode parameters that invert this mapping exactly
    pub fn matching_decode(&self) -> DecodeParams {
        DecodeParams {
            base_frequency: self.base_frequency,
            frequency_range: self.frequency_range,
            window_duration: self.sample_duration,
            ..DecodeParams::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_positive("base_frequency", self.base_frequency)?;
        check_positive("frequency_range", self.frequency_range)?;
        check_positive("sample_duration", self.sample_duration)?;
        if self.sample_rate == 0 {
            return Err(SonarError::InvalidArgument {
                reason: "sample_rate must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Reverse (frequency to byte) parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeParams {
    /// Frequency of byte 0x00 in Hz
    pub base_frequency: f64,
    /// Frequency span covered by 0x00..=0xFF in Hz
    pub frequency_range: f64,
    /// Frequency matching tolerance in Hz
    pub tolerance: f64,
    /// Scale acoustic confidence by how far an estimate sits from a tone
    pub strict_mode: bool,
    /// Length of one acoustic analysis window in seconds
    pub window_duration: f64,
}

impl Default for DecodeParams {
    fn default() -> Self {
        DecodeParams {
            base_frequency: DEFAULT_BASE_FREQUENCY,
            frequency_range: DEFAULT_FREQUENCY_RANGE,
            tolerance: DEFAULT_TOLERANCE,
            strict_mode: false,
            window_duration: DEFAULT_SAMPLE_DURATION,
        }
    }
}

impl DecodeParams {
    /// Highest frequency that still maps inside the byte range
    pub fn max_frequency(&self) -> f64 {
        self.base_frequency + self.frequency_range
    }

    pub fn validate(&self) -> Result<()> {
        check_positive("base_frequency", self.base_frequency)?;
        check_positive("frequency_range", self.frequency_range)?;
        check_positive("window_duration", self.window_duration)?;
        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return Err(SonarError::InvalidArgument {
                reason: format!("tolerance must be non-negative, got {}", self.tolerance),
            });
        }
        Ok(())
    }
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SonarError::InvalidArgument {
            reason: format!("{} must be a positive number, got {}", name, value),
        })
    }
}
