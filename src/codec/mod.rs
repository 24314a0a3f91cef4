//! Frequency Codec
//!
//! Linear byte ↔ frequency mapping. Byte 0x00 maps to `base_frequency`,
//! byte 0xFF to `base_frequency + frequency_range`. Amplitude grows with
//! the byte value but never reaches silence.
//!
//! `decode(encode(b).frequency) == b` holds for every byte when both sides
//! use the same base frequency and range.

mod params;

pub use params::{
    DecodeParams, EncodeParams, DEFAULT_BASE_FREQUENCY, DEFAULT_FREQUENCY_RANGE,
    DEFAULT_SAMPLE_DURATION, DEFAULT_SAMPLE_RATE, DEFAULT_TOLERANCE,
};

/// Quietest amplitude a tone can have (byte 0x00)
pub const MIN_AMPLITUDE: f64 = 0.1;

/// A single mapped tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Frequency in Hz
    pub frequency: f64,
    /// Amplitude in 0.1..=1.0
    pub amplitude: f64,
}

/// Map a byte to its tone frequency and amplitude
pub fn encode(byte: u8, params: &EncodeParams) -> Tone {
    let normalized = byte as f64 / 255.0;
    Tone {
        frequency: params.base_frequency + normalized * params.frequency_range,
        amplitude: byte_to_amplitude(byte),
    }
}

/// Map a byte to its amplitude (0.1 to 1.0)
pub fn byte_to_amplitude(byte: u8) -> f64 {
    MIN_AMPLITUDE + (byte as f64 / 255.0) * (1.0 - MIN_AMPLITUDE)
}

/// Map a frequency back to the nearest byte
///
/// Frequencies below the band clamp to 0x00, above it to 0xFF. NaN is
/// treated as below the band.
pub fn decode(frequency: f64, params: &DecodeParams) -> u8 {
    if frequency.is_nan() || frequency < params.base_frequency {
        return 0;
    }
    if frequency > params.max_frequency() {
        return 255;
    }

    let normalized = (frequency - params.base_frequency) / params.frequency_range;
    (normalized * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Frequency of the tone a byte maps to under decode parameters
pub fn tone_frequency(byte: u8, params: &DecodeParams) -> f64 {
    params.base_frequency + (byte as f64 / 255.0) * params.frequency_range
}

/// Confidence that `actual` was meant to be `expected`
///
/// 1.0 within `tolerance`, falling linearly to 0.0 at ten times the
/// tolerance.
pub fn frequency_confidence(expected: f64, actual: f64, tolerance: f64) -> f64 {
    let error = (expected - actual).abs();
    if !error.is_finite() {
        return 0.0;
    }
    if error <= tolerance {
        return 1.0;
    }

    let falloff = tolerance * 9.0;
    if falloff <= 0.0 {
        return 0.0;
    }
    (1.0 - (error - tolerance) / falloff).clamp(0.0, 1.0)
}
