//! Sample Sequences
//!
//! Append-only, insertion-ordered containers for both directions. Order is
//! the byte offset order within a partition, so nothing here ever sorts or
//! removes.

mod stats;

pub use stats::ToneStats;

use crate::codec::{self, DecodeParams, EncodeParams, Tone};

// ============================================================================
// Forward direction
// ============================================================================

/// A tone derived from one source byte
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSample {
    pub source_byte: u8,
    /// Frequency in Hz
    pub frequency: f64,
    /// Amplitude in 0.1..=1.0
    pub amplitude: f64,
    /// Duration in seconds
    pub duration: f64,
}

impl ToneSample {
    pub fn from_byte(byte: u8, params: &EncodeParams) -> Self {
        let Tone {
            frequency,
            amplitude,
        } = codec::encode(byte, params);
        ToneSample {
            source_byte: byte,
            frequency,
            amplitude,
            duration: params.sample_duration,
        }
    }
}

/// Ordered tones for one partition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToneSequence {
    samples: Vec<ToneSample>,
}

impl ToneSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// One tone per byte, in byte order
    pub fn from_bytes(bytes: &[u8], params: &EncodeParams) -> Self {
        let samples = bytes
            .iter()
            .map(|&b| ToneSample::from_byte(b, params))
            .collect();
        ToneSequence { samples }
    }

    pub fn push(&mut self, sample: ToneSample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ToneSample> {
        self.samples.iter()
    }

    pub fn as_slice(&self) -> &[ToneSample] {
        &self.samples
    }

    /// Summary statistics, `None` when empty
    pub fn stats(&self) -> Option<ToneStats> {
        ToneStats::collect(&self.samples)
    }
}

impl<'a> IntoIterator for &'a ToneSequence {
    type Item = &'a ToneSample;
    type IntoIter = std::slice::Iter<'a, ToneSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

// ============================================================================
// Reverse direction
// ============================================================================

/// A byte recovered from some artifact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoveredSample {
    pub reconstructed_byte: u8,
    /// Frequency the byte was derived from, in Hz
    pub source_frequency: f64,
    /// Confidence in 0.0..=1.0
    pub confidence: f64,
    /// Position in the original byte sequence
    pub sequence_index: usize,
}

/// Ordered recovered samples for one partition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecoveredSequence {
    samples: Vec<RecoveredSample>,
}

impl RecoveredSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample whose byte is already known
    ///
    /// The sequence index is assigned from the current length; confidence
    /// is clamped into 0.0..=1.0.
    pub fn push(&mut self, byte: u8, source_frequency: f64, confidence: f64) {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        self.samples.push(RecoveredSample {
            reconstructed_byte: byte,
            source_frequency,
            confidence,
            sequence_index: self.samples.len(),
        });
    }

    /// Append a sample by inverse-mapping a frequency
    pub fn push_frequency(&mut self, frequency: f64, confidence: f64, params: &DecodeParams) -> u8 {
        let byte = codec::decode(frequency, params);
        self.push(byte, frequency, confidence);
        byte
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RecoveredSample> {
        self.samples.iter()
    }

    pub fn as_slice(&self) -> &[RecoveredSample] {
        &self.samples
    }

    /// Reconstructed bytes in sequence order
    pub fn to_bytes(&self) -> Vec<u8> {
        self.samples.iter().map(|s| s.reconstructed_byte).collect()
    }

    /// Mean confidence, 0.0 for an empty sequence
    pub fn mean_confidence(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let total: f64 = self.samples.iter().map(|s| s.confidence).sum();
        total / self.samples.len() as f64
    }

    /// Number of samples whose confidence is strictly above `threshold`
    pub fn count_above(&self, threshold: f64) -> usize {
        self.samples
            .iter()
            .filter(|s| s.confidence > threshold)
            .count()
    }
}

impl<'a> IntoIterator for &'a RecoveredSequence {
    type Item = &'a RecoveredSample;
    type IntoIter = std::slice::Iter<'a, RecoveredSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tone_sequence_preserves_order() {
        let params = EncodeParams::default();
        let seq = ToneSequence::from_bytes(b"SONAR", &params);

        assert_eq!(seq.len(), 5);
        let bytes: Vec<u8> = seq.iter().map(|s| s.source_byte).collect();
        assert_eq!(bytes, b"SONAR".to_vec());
        assert!(seq.iter().all(|s| s.duration == params.sample_duration));
    }

    #[test]
    fn test_recovered_sequence_indices() {
        let params = DecodeParams::default();
        let mut seq = RecoveredSequence::new();
        seq.push(0x41, 0.0, 0.9);
        seq.push_frequency(2220.0, 0.7, &params);
        seq.push(0x43, 0.0, 1.5);

        let indices: Vec<usize> = seq.iter().map(|s| s.sequence_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(seq.to_bytes(), vec![0x41, 0xFF, 0x43]);
        // clamped
        assert_relative_eq!(seq.as_slice()[2].confidence, 1.0);
    }

    #[test]
    fn test_confidence_statistics() {
        let mut seq = RecoveredSequence::new();
        assert_relative_eq!(seq.mean_confidence(), 0.0);

        seq.push(1, 0.0, 0.4);
        seq.push(2, 0.0, 0.6);
        seq.push(3, 0.0, 0.8);

        assert_relative_eq!(seq.mean_confidence(), 0.6, epsilon = 1e-12);
        assert_eq!(seq.count_above(0.5), 2);
        assert_eq!(seq.count_above(0.6), 1);
    }

    #[test]
    fn test_nan_confidence_is_zero() {
        let mut seq = RecoveredSequence::new();
        seq.push(9, 0.0, f64::NAN);
        assert_eq!(seq.as_slice()[0].confidence, 0.0);
    }
}
