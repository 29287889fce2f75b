//! Spectral band-power stress classification.
//!
//! Classifies a sample sequence into a coarse three-level stress rating
//! from the ratio of beta-band to alpha-band power. The classifier runs
//! over every value it is given, invalid samples included; validity
//! filtering is deliberately left to other stages.

use crate::frame::types::{Channel, Sample};
use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};

/// Default acquisition sampling rate in Hz.
pub const DEFAULT_SAMPLING_RATE: f64 = 256.0;

/// Beta/alpha ratio above which the rating is High.
pub const DEFAULT_HIGH_RATIO: f64 = 1.5;

/// Beta/alpha ratio above which the rating is Medium.
pub const DEFAULT_MEDIUM_RATIO: f64 = 0.8;

/// Summed squared spectral magnitudes per named band, `[low, high)` Hz.
#[derive(Debug, Clone, Copy, Default)]
struct BandPowers {
    delta: f64, // [0.5, 4)
    theta: f64, // [4, 8)
    alpha: f64, // [8, 13)
    beta: f64,  // [13, 30)
}

impl BandPowers {
    fn total(&self) -> f64 {
        self.delta + self.theta + self.alpha + self.beta
    }
}

/// Coarse stress rating derived from spectral band powers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for StressLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StressLevel::Low => write!(f, "low"),
            StressLevel::Medium => write!(f, "medium"),
            StressLevel::High => write!(f, "high"),
        }
    }
}

/// Power spectrum of one channel, for visualization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spectrum {
    /// Frequency bin centers in Hz
    pub frequencies: Vec<f64>,
    /// Averaged power per bin
    pub power: Vec<f64>,
}

/// Band-power stress classifier.
#[derive(Debug, Clone)]
pub struct StressClassifier {
    sampling_rate: f64,
    high_ratio: f64,
    medium_ratio: f64,
}

impl Default for StressClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLING_RATE, DEFAULT_HIGH_RATIO, DEFAULT_MEDIUM_RATIO)
    }
}

impl StressClassifier {
    /// Create a classifier for a given sampling rate and ratio cut-points.
    ///
    /// The sampling rate is a property of the acquisition setup, not of any
    /// single frame.
    pub fn new(sampling_rate: f64, high_ratio: f64, medium_ratio: f64) -> Self {
        Self {
            sampling_rate,
            high_ratio,
            medium_ratio,
        }
    }

    /// Classify the stress level of a sample sequence.
    ///
    /// All values contribute, across channels and regardless of validity.
    pub fn classify(&self, samples: &[Sample]) -> StressLevel {
        let values: Vec<f64> = samples.iter().map(|s| s.value as f64).collect();
        if values.is_empty() {
            return StressLevel::Low;
        }

        let bands = self.band_powers(&values);
        let total_power = bands.total();
        if total_power == 0.0 {
            return StressLevel::Low;
        }

        let alpha = bands.alpha / total_power;
        let beta = bands.beta / total_power;
        let ratio = beta / alpha.max(1e-10);

        if ratio > self.high_ratio {
            StressLevel::High
        } else if ratio > self.medium_ratio {
            StressLevel::Medium
        } else {
            StressLevel::Low
        }
    }

    /// Power spectrum for one channel's valid samples, averaged over
    /// Hann-windowed segments of `window_size` with 50% overlap. Fewer
    /// than `window_size` samples yields an empty spectrum.
    pub fn channel_spectrum(
        &self,
        samples: &[Sample],
        channel: Channel,
        window_size: usize,
    ) -> Spectrum {
        let values: Vec<f64> = samples
            .iter()
            .filter(|s| s.channel == channel && s.valid)
            .map(|s| s.value as f64)
            .collect();

        if window_size < 2 || values.len() < window_size {
            return Spectrum::default();
        }

        let hann: Vec<f64> = (0..window_size)
            .map(|i| {
                0.5 * (1.0
                    - (2.0 * std::f64::consts::PI * i as f64 / (window_size - 1) as f64).cos())
            })
            .collect();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(window_size);

        let bins = window_size / 2 + 1;
        let mut power = vec![0.0f64; bins];
        let mut segments = 0usize;

        let step = (window_size / 2).max(1);
        let mut offset = 0;
        while offset + window_size <= values.len() {
            let mut buffer: Vec<Complex<f64>> = values[offset..offset + window_size]
                .iter()
                .zip(&hann)
                .map(|(&v, &w)| Complex::new(v * w, 0.0))
                .collect();
            fft.process(&mut buffer);

            for (bin, c) in buffer.iter().take(bins).enumerate() {
                power[bin] += c.norm_sqr() / window_size as f64;
            }
            segments += 1;
            offset += step;
        }

        for p in &mut power {
            *p /= segments as f64;
        }

        let bin_hz = self.sampling_rate / window_size as f64;
        Spectrum {
            frequencies: (0..bins).map(|k| k as f64 * bin_hz).collect(),
            power,
        }
    }

    /// Sum of squared spectral magnitudes per band, positive frequencies
    /// only.
    fn band_powers(&self, values: &[f64]) -> BandPowers {
        let n = values.len();
        let mut buffer: Vec<Complex<f64>> = values.iter().map(|&v| Complex::new(v, 0.0)).collect();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n);
        fft.process(&mut buffer);

        let bin_hz = self.sampling_rate / n as f64;
        let mut bands = BandPowers::default();

        // Bins past (n + 1) / 2 represent negative frequencies and can
        // never fall inside a band.
        for (k, c) in buffer.iter().enumerate().take((n + 1) / 2) {
            let freq = k as f64 * bin_hz;
            let power = c.norm_sqr();
            match freq {
                f if (0.5..4.0).contains(&f) => bands.delta += power,
                f if (4.0..8.0).contains(&f) => bands.theta += power,
                f if (8.0..13.0).contains(&f) => bands.alpha += power,
                f if (13.0..30.0).contains(&f) => bands.beta += power,
                _ => {}
            }
        }

        bands
    }
}
