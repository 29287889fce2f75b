//! Per-channel statistical spike detection.
//!
//! A spike is a contiguous run of samples exceeding a threshold derived
//! from the channel's own statistics (`mean + sigma * std`). Runs shorter
//! than the minimum duration are treated as noise; a run still open when
//! the sequence ends is dropped rather than emitted.

use crate::frame::types::{Channel, Event, Sample};
use serde_json::json;
use statrs::statistics::Statistics;

/// Default threshold distance from the mean, in standard deviations.
pub const DEFAULT_THRESHOLD_SIGMA: f64 = 3.0;

/// Default minimum spike duration in seconds.
pub const DEFAULT_MIN_DURATION_SECS: f64 = 0.1;

/// Statistical anomaly detector producing synthetic "spike" events.
#[derive(Debug, Clone)]
pub struct SpikeDetector {
    threshold_sigma: f64,
    min_duration_secs: f64,
}

impl Default for SpikeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_SIGMA, DEFAULT_MIN_DURATION_SECS)
    }
}

impl SpikeDetector {
    /// Create a detector with explicit threshold and duration tunables.
    pub fn new(threshold_sigma: f64, min_duration_secs: f64) -> Self {
        Self {
            threshold_sigma,
            min_duration_secs,
        }
    }

    /// Detect spikes on one channel.
    ///
    /// Operates on the chronological sub-sequence of `samples` belonging to
    /// `channel` with `valid == true`. The threshold is computed over that
    /// whole sub-sequence, run bodies included.
    pub fn detect(&self, samples: &[Sample], channel: Channel) -> Vec<Event> {
        let channel_samples: Vec<&Sample> = samples
            .iter()
            .filter(|s| s.channel == channel && s.valid)
            .collect();

        if channel_samples.is_empty() {
            return Vec::new();
        }

        let values: Vec<f64> = channel_samples.iter().map(|s| s.value as f64).collect();
        let mean = values.iter().mean();
        let std = values.iter().population_std_dev();
        let threshold = mean + self.threshold_sigma * std;

        let mut spikes = Vec::new();
        let mut spike_start: Option<f64> = None;

        for (i, sample) in channel_samples.iter().enumerate() {
            if (sample.value as f64) > threshold {
                if spike_start.is_none() {
                    spike_start = Some(sample.timestamp);
                }
            } else if let Some(start) = spike_start.take() {
                let duration = sample.timestamp - start;
                if duration >= self.min_duration_secs {
                    spikes.push(self.spike_event(channel, start, duration, threshold, &channel_samples, i));
                }
            }
        }

        // A run that never closes before the sub-sequence ends is dropped.
        spikes
    }

    fn spike_event(
        &self,
        channel: Channel,
        start: f64,
        duration: f64,
        threshold: f64,
        channel_samples: &[&Sample],
        closing_index: usize,
    ) -> Event {
        // Peak amplitude over the up-to-4 samples straddling the closing index
        let window =
            &channel_samples[closing_index.saturating_sub(2)..(closing_index + 2).min(channel_samples.len())];
        let amplitude = window.iter().map(|s| s.value).fold(f32::MIN, f32::max);

        let mut metadata = serde_json::Map::new();
        metadata.insert("amplitude".to_string(), json!(amplitude));
        metadata.insert("threshold".to_string(), json!(threshold));

        Event {
            timestamp: start,
            kind: "spike".to_string(),
            channel: Some(channel),
            duration,
            metadata,
        }
    }
}
