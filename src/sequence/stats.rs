//! Summary statistics over a tone sequence

use super::ToneSample;

/// Frequency and amplitude statistics for console output and reports
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneStats {
    pub count: usize,
    pub mean_frequency: f64,
    pub min_frequency: f64,
    pub max_frequency: f64,
    pub mean_amplitude: f64,
    pub min_amplitude: f64,
    pub max_amplitude: f64,
    /// Total playback time in seconds
    pub total_duration: f64,
}

impl ToneStats {
    pub(crate) fn collect(samples: &[ToneSample]) -> Option<Self> {
        let first = samples.first()?;

        let mut stats = ToneStats {
            count: 0,
            mean_frequency: 0.0,
            min_frequency: first.frequency,
            max_frequency: first.frequency,
            mean_amplitude: 0.0,
            min_amplitude: first.amplitude,
            max_amplitude: first.amplitude,
            total_duration: 0.0,
        };

        for sample in samples {
            stats.count += 1;
            stats.mean_frequency += sample.frequency;
            stats.mean_amplitude += sample.amplitude;
            stats.total_duration += sample.duration;
            stats.min_frequency = stats.min_frequency.min(sample.frequency);
            stats.max_frequency = stats.max_frequency.max(sample.frequency);
            stats.min_amplitude = stats.min_amplitude.min(sample.amplitude);
            stats.max_amplitude = stats.max_amplitude.max(sample.amplitude);
        }

        stats.mean_frequency /= stats.count as f64;
        stats.mean_amplitude /= stats.count as f64;
        Some(stats)
    }
}
