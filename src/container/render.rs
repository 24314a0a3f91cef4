//! Tone synthesis
//!
//! Expands a tone sequence into 16-bit PCM. Each tone gets a linear
//! attack/decay envelope over its first and last 10 % so tone boundaries
//! do not click, and the oscillator phase runs on across tones.

use std::f64::consts::TAU;

use crate::sequence::{ToneSample, ToneSequence};

/// Fraction of full scale used for the summed waveform
pub const OUTPUT_SCALE: f64 = 0.8;

/// Weight of the second harmonic
pub const SECOND_HARMONIC: f64 = 0.3;

/// Weight of the third harmonic
pub const THIRD_HARMONIC: f64 = 0.1;

/// Fraction of a tone spent in attack (and again in decay)
const ENVELOPE_FRACTION: f64 = 0.1;

/// Synthesis options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Add 2nd and 3rd harmonics
    pub harmonics: bool,
    /// Apply the attack/decay envelope
    pub envelope: bool,
    /// Overall gain in 0.0..=1.0
    pub master_volume: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            harmonics: false,
            envelope: true,
            master_volume: 1.0,
        }
    }
}

impl RenderOptions {
    /// Harmonically rich rendering used by the artifact engine
    pub fn rich() -> Self {
        RenderOptions {
            harmonics: true,
            ..RenderOptions::default()
        }
    }
}

/// Number of PCM samples one tone occupies
pub fn tone_len(duration: f64, sample_rate: u32) -> usize {
    (duration * sample_rate as f64) as usize
}

/// Render a whole sequence into one PCM stream
pub fn render_tones(tones: &ToneSequence, sample_rate: u32, options: &RenderOptions) -> Vec<i16> {
    let total: usize = tones
        .iter()
        .map(|t| tone_len(t.duration, sample_rate))
        .sum();
    let mut pcm = Vec::with_capacity(total);

    let mut phase = 0.0;
    for tone in tones {
        render_tone(tone, sample_rate, phase, options, &mut pcm);
        phase = (phase + TAU * tone.frequency * tone.duration).rem_euclid(TAU);
    }

    pcm
}

/// Render one tone starting at `phase`, appending to `out`
fn render_tone(
    tone: &ToneSample,
    sample_rate: u32,
    phase: f64,
    options: &RenderOptions,
    out: &mut Vec<i16>,
) {
    let n = tone_len(tone.duration, sample_rate);
    let rate = sample_rate as f64;
    let amplitude = tone.amplitude * options.master_volume.clamp(0.0, 1.0);

    for i in 0..n {
        let t = i as f64 / rate;
        let angle = TAU * tone.frequency * t;

        let mut wave = (angle + phase).sin();
        if options.harmonics {
            wave += SECOND_HARMONIC * (2.0 * angle + phase).sin();
            wave += THIRD_HARMONIC * (3.0 * angle + phase).sin();
        }

        let envelope = if options.envelope {
            envelope_at(i, n)
        } else {
            1.0
        };

        out.push(to_pcm(amplitude * envelope * wave));
    }
}

/// Linear attack over the first 10 %, linear decay over the last 10 %
fn envelope_at(i: usize, n: usize) -> f64 {
    let edge = n as f64 * ENVELOPE_FRACTION;
    if edge <= 0.0 {
        return 1.0;
    }

    let i = i as f64;
    if i < edge {
        i / edge
    } else if i > n as f64 - edge {
        ((n as f64 - i) / edge).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Scale a -1.0..1.0 value to 16-bit PCM, clamping overshoot
fn to_pcm(value: f64) -> i16 {
    let scaled = (value * i16::MAX as f64 * OUTPUT_SCALE).round();
    scaled.clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::EncodeParams;

    #[test]
    fn test_length_matches_duration() {
        let params = EncodeParams::default();
        let tones = ToneSequence::from_bytes(&[0, 128, 255], &params);
        let pcm = render_tones(&tones, params.sample_rate, &RenderOptions::default());

        assert_eq!(pcm.len(), 3 * params.samples_per_tone());
    }

    #[test]
    fn test_envelope_starts_silent() {
        let params = EncodeParams::default();
        let tones = ToneSequence::from_bytes(&[200], &params);
        let pcm = render_tones(&tones, params.sample_rate, &RenderOptions::rich());

        assert_eq!(pcm[0], 0);
        // the body of the tone reaches well above the envelope edges
        let peak = pcm.iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert!(peak > 10_000, "peak {}", peak);
    }

    #[test]
    fn test_envelope_shape() {
        assert_eq!(envelope_at(0, 100), 0.0);
        assert_eq!(envelope_at(5, 100), 0.5);
        assert_eq!(envelope_at(50, 100), 1.0);
        assert!(envelope_at(99, 100) < 0.2);
        assert_eq!(envelope_at(0, 0), 1.0);
    }

    #[test]
    fn test_harmonics_clamped_into_range() {
        let params = EncodeParams::default();
        let tones = ToneSequence::from_bytes(&[255; 8], &params);
        let options = RenderOptions {
            harmonics: true,
            envelope: false,
            master_volume: 1.0,
        };
        let pcm = render_tones(&tones, params.sample_rate, &options);

        let peak = pcm.iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert!(peak > 26_000, "peak {}", peak);
    }

    #[test]
    fn test_phase_continues_across_tones() {
        // 10.25 cycles per tone: the second tone starts a quarter cycle in
        let params = EncodeParams {
            sample_duration: 0.01025,
            ..EncodeParams::default()
        };
        let mut tones = ToneSequence::new();
        for _ in 0..2 {
            tones.push(ToneSample {
                source_byte: 0,
                frequency: 1000.0,
                amplitude: 1.0,
                duration: params.sample_duration,
            });
        }
        let options = RenderOptions {
            harmonics: false,
            envelope: false,
            master_volume: 1.0,
        };
        let pcm = render_tones(&tones, params.sample_rate, &options);

        let n = tone_len(params.sample_duration, params.sample_rate);
        let expected_phase = (TAU * 1000.0 * params.sample_duration).rem_euclid(TAU);
        assert_eq!(pcm[n], to_pcm(expected_phase.sin()));
        assert_ne!(pcm[n], 0);
    }

    #[test]
    fn test_master_volume_scales_output() {
        let params = EncodeParams::default();
        let tones = ToneSequence::from_bytes(&[255], &params);
        let loud = render_tones(&tones, params.sample_rate, &RenderOptions::default());
        let quiet = render_tones(
            &tones,
            params.sample_rate,
            &RenderOptions {
                master_volume: 0.5,
                ..RenderOptions::default()
            },
        );

        let peak = |pcm: &[i16]| pcm.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
        assert!(peak(&quiet) < peak(&loud));
    }
}
