//! Assembly of the aggregate view handed to streaming consumers.
//!
//! A view combines per-channel traces of valid samples, the union of
//! frame-borne events with freshly detected spikes, a stress rating, and
//! summary statistics. It serializes directly to the JSON shape the
//! transport layer streams to consumers.

use crate::analysis::spikes::SpikeDetector;
use crate::analysis::stress::{StressClassifier, StressLevel};
use crate::config::CoreConfig;
use crate::frame::types::{Channel, Event, Sample};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// One point of a channel trace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChannelPoint {
    pub timestamp: f64,
    pub value: f32,
}

/// Valid samples grouped per channel, in arrival order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelBuckets {
    pub fp1: Vec<ChannelPoint>,
    pub fp2: Vec<ChannelPoint>,
    pub c3: Vec<ChannelPoint>,
    pub c4: Vec<ChannelPoint>,
}

impl ChannelBuckets {
    /// The trace for one channel.
    pub fn bucket(&self, channel: Channel) -> &[ChannelPoint] {
        match channel {
            Channel::Fp1 => &self.fp1,
            Channel::Fp2 => &self.fp2,
            Channel::C3 => &self.c3,
            Channel::C4 => &self.c4,
        }
    }

    fn bucket_mut(&mut self, channel: Channel) -> &mut Vec<ChannelPoint> {
        match channel {
            Channel::Fp1 => &mut self.fp1,
            Channel::Fp2 => &mut self.fp2,
            Channel::C3 => &mut self.c3,
            Channel::C4 => &mut self.c4,
        }
    }
}

/// Summary statistics over a sample sequence.
///
/// The distribution fields are present only when at least one valid
/// sample exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalStats {
    pub total_samples: usize,
    pub valid_samples: usize,
    pub invalid_samples: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// The aggregate view served to streaming consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamView {
    pub channels: ChannelBuckets,
    pub events: Vec<Event>,
    pub stress_level: StressLevel,
    pub stats: SignalStats,
}

/// Combines preprocessed samples, spike detection, and stress
/// classification into a [`StreamView`].
#[derive(Debug, Clone, Default)]
pub struct ViewAssembler {
    spikes: SpikeDetector,
    stress: StressClassifier,
}

impl ViewAssembler {
    /// Create an assembler from explicit components.
    pub fn new(spikes: SpikeDetector, stress: StressClassifier) -> Self {
        Self { spikes, stress }
    }

    /// Create an assembler with the tunables of a [`CoreConfig`].
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(
            SpikeDetector::new(config.spike_threshold_sigma, config.spike_min_duration_secs),
            StressClassifier::new(
                config.sampling_rate,
                config.stress_high_ratio,
                config.stress_medium_ratio,
            ),
        )
    }

    /// Assemble the aggregate view.
    ///
    /// Invalid samples are dropped from the channel traces but still
    /// count in `stats` and still feed the stress classifier. Spikes are
    /// re-detected per channel over the full input and unioned with the
    /// caller-supplied events.
    pub fn assemble(&self, samples: &[Sample], events: &[Event]) -> StreamView {
        let mut channels = ChannelBuckets::default();
        for sample in samples.iter().filter(|s| s.valid) {
            channels.bucket_mut(sample.channel).push(ChannelPoint {
                timestamp: sample.timestamp,
                value: sample.value,
            });
        }

        let mut all_events = events.to_vec();
        for channel in Channel::ALL {
            all_events.extend(self.spikes.detect(samples, channel));
        }

        StreamView {
            channels,
            events: all_events,
            stress_level: self.stress.classify(samples),
            stats: signal_stats(samples),
        }
    }
}

fn signal_stats(samples: &[Sample]) -> SignalStats {
    let values: Vec<f64> = samples
        .iter()
        .filter(|s| s.valid)
        .map(|s| s.value as f64)
        .collect();

    let mut stats = SignalStats {
        total_samples: samples.len(),
        valid_samples: values.len(),
        invalid_samples: samples.len() - values.len(),
        ..SignalStats::default()
    };

    if !values.is_empty() {
        stats.mean = Some(values.iter().mean());
        stats.std = Some(values.iter().population_std_dev());
        stats.min = Some(values.iter().cloned().fold(f64::INFINITY, f64::min));
        stats.max = Some(values.iter().cloned().fold(f64::NEG_INFINITY, f64::max));
    }

    stats
}
