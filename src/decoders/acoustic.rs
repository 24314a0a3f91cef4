//! Acoustic decoder
//!
//! Estimates each tone's frequency from the rendered audio by counting
//! zero crossings over one tone-length window. This is a heuristic, not
//! spectral analysis: harmonics and the attack/decay envelope bias the
//! count slightly, so recovered bytes may be off by one or two.

use std::path::Path;

use log::debug;

use super::{non_empty, ArtifactDecoder, ArtifactKind};
use crate::codec::{self, DecodeParams};
use crate::container::{self, PcmData};
use crate::error::{Result, SonarError};
use crate::sequence::RecoveredSequence;

/// Confidence assigned to every accepted window
pub const ACOUSTIC_CONFIDENCE: f64 = 0.7;

/// Lowest estimate treated as a tone rather than silence or noise
pub const MIN_DETECTABLE_HZ: f64 = 200.0;

/// Highest estimate treated as a tone
pub const MAX_DETECTABLE_HZ: f64 = 3000.0;

/// Smallest window that can carry a usable estimate
const MIN_WINDOW_SAMPLES: usize = 10;

#[derive(Debug, Default, Clone, Copy)]
pub struct AcousticDecoder;

impl AcousticDecoder {
    /// Decode a container held in memory
    pub fn decode_bytes(&self, bytes: &[u8], params: &DecodeParams) -> Result<RecoveredSequence> {
        self.decode_pcm(&container::read_pcm_bytes(bytes)?, params)
    }

    /// Decode already extracted PCM samples
    ///
    /// # Errors
    /// * `InvalidHeader` - the window would be shorter than 10 samples
    /// * `EmptyResult` - no window held a detectable tone
    pub fn decode_pcm(&self, pcm: &PcmData, params: &DecodeParams) -> Result<RecoveredSequence> {
        let sample_rate = pcm.header.sample_rate as f64;
        let window = (params.window_duration * sample_rate).round() as usize;
        if window < MIN_WINDOW_SAMPLES {
            return Err(SonarError::InvalidHeader {
                reason: format!(
                    "{} Hz with {} s windows leaves {} samples per window",
                    pcm.header.sample_rate, params.window_duration, window
                ),
            });
        }
        let window_secs = window as f64 / sample_rate;

        let mut seq = RecoveredSequence::new();
        let mut silent = 0usize;

        for block in pcm.samples.chunks_exact(window) {
            let estimate = (zero_crossings(block) as f64 / 2.0) / window_secs;
            if !(MIN_DETECTABLE_HZ..=MAX_DETECTABLE_HZ).contains(&estimate) {
                silent += 1;
                continue;
            }

            let confidence = if params.strict_mode {
                let expected = codec::tone_frequency(codec::decode(estimate, params), params);
                ACOUSTIC_CONFIDENCE
                    * codec::frequency_confidence(expected, estimate, params.tolerance)
            } else {
                ACOUSTIC_CONFIDENCE
            };
            seq.push_frequency(estimate, confidence, params);
        }

        debug!(
            "Acoustic analysis: {} windows of {} samples, {} tones, {} silent",
            pcm.samples.len() / window,
            window,
            seq.len(),
            silent
        );
        non_empty(seq, ArtifactKind::Acoustic)
    }
}

impl ArtifactDecoder for AcousticDecoder {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Acoustic
    }

    fn decode(&self, path: &Path, params: &DecodeParams) -> Result<RecoveredSequence> {
        self.decode_pcm(&container::read_pcm(path)?, params)
    }
}

/// Sign changes between consecutive samples (zero counts as positive)
fn zero_crossings(block: &[i16]) -> usize {
    block
        .windows(2)
        .filter(|pair| (pair[0] >= 0) != (pair[1] >= 0))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::EncodeParams;
    use crate::container::{write_pcm, ContainerHeader, RenderOptions};
    use crate::sequence::ToneSequence;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;
    use tempfile::tempdir;

    fn header(sample_rate: u32) -> ContainerHeader {
        ContainerHeader {
            riff_size: 36,
            channels: 1,
            sample_rate,
            byte_rate: sample_rate * 2,
            block_align: 2,
            bits_per_sample: 16,
        }
    }

    fn cosine(frequency: f64, len: usize, sample_rate: u32) -> Vec<i16> {
        (0..len)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                ((TAU * frequency * t).cos() * 0.8 * 32767.0).round() as i16
            })
            .collect()
    }

    #[test]
    fn test_single_tone_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sonar_partition_0.wav");
        write_pcm(&path, 44100, &cosine(1220.0, 2205, 44100)).unwrap();

        let seq = AcousticDecoder
            .decode(&path, &DecodeParams::default())
            .unwrap();

        assert_eq!(seq.len(), 1);
        let byte = seq.as_slice()[0].reconstructed_byte;
        assert!((127..=129).contains(&byte), "byte {}", byte);
        assert_relative_eq!(seq.as_slice()[0].confidence, ACOUSTIC_CONFIDENCE);
    }

    #[test]
    fn test_silence_skipped_without_index() {
        let mut samples = cosine(1220.0, 2205, 44100);
        samples.extend(std::iter::repeat(0).take(2205));
        samples.extend(cosine(1220.0, 2205, 44100));
        let pcm = PcmData {
            header: header(44100),
            samples,
        };

        let seq = AcousticDecoder
            .decode_pcm(&pcm, &DecodeParams::default())
            .unwrap();
        let indices: Vec<usize> = seq.iter().map(|s| s.sequence_index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_partial_window_ignored() {
        let mut samples = cosine(1220.0, 2205, 44100);
        samples.extend(cosine(1220.0, 1000, 44100));
        let pcm = PcmData {
            header: header(44100),
            samples,
        };

        let seq = AcousticDecoder
            .decode_pcm(&pcm, &DecodeParams::default())
            .unwrap();
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn test_all_silent_is_empty() {
        let pcm = PcmData {
            header: header(44100),
            samples: vec![0; 2205 * 3],
        };
        let err = AcousticDecoder
            .decode_pcm(&pcm, &DecodeParams::default())
            .unwrap_err();
        assert!(matches!(err, SonarError::EmptyResult { .. }));
    }

    #[test]
    fn test_tiny_window_rejected() {
        let pcm = PcmData {
            header: header(100),
            samples: vec![0; 100],
        };
        let err = AcousticDecoder
            .decode_pcm(&pcm, &DecodeParams::default())
            .unwrap_err();
        assert!(matches!(err, SonarError::InvalidHeader { .. }));
    }

    #[test]
    fn test_strict_mode_scales_confidence() {
        let pcm = PcmData {
            header: header(44100),
            samples: cosine(1220.0, 2205, 44100),
        };
        let params = DecodeParams {
            strict_mode: true,
            ..DecodeParams::default()
        };

        let seq = AcousticDecoder.decode_pcm(&pcm, &params).unwrap();
        let confidence = seq.as_slice()[0].confidence;
        assert!(confidence > 0.0 && confidence <= ACOUSTIC_CONFIDENCE);
    }

    #[test]
    fn test_rendered_sequence_round_trip() {
        let encode = EncodeParams::default();
        let bytes: Vec<u8> = (0..=255u8).collect();
        let tones = ToneSequence::from_bytes(&bytes, &encode);
        let pcm = PcmData {
            header: header(encode.sample_rate),
            samples: container::render_tones(&tones, encode.sample_rate, &RenderOptions::rich()),
        };

        let seq = AcousticDecoder
            .decode_pcm(&pcm, &encode.matching_decode())
            .unwrap();

        assert_eq!(seq.len(), bytes.len());
        for (recovered, &original) in seq.iter().zip(&bytes) {
            let error = (recovered.reconstructed_byte as i16 - original as i16).abs();
            assert!(error <= 2, "0x{:02X} came back as 0x{:02X}", original, recovered.reconstructed_byte);
        }
    }

    #[test]
    fn test_zero_crossings() {
        assert_eq!(zero_crossings(&[1, -1, 1, -1]), 3);
        assert_eq!(zero_crossings(&[0, 0, 5, 0]), 0);
        assert_eq!(zero_crossings(&[-3, 0, -3]), 2);
        assert_eq!(zero_crossings(&[]), 0);
    }
}
