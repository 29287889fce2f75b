//! Signal analysis for decoded telemetry.
//!
//! This module contains:
//! - Validity preprocessing (saturation filtering)
//! - Per-channel statistical spike detection
//! - Spectral band-power stress classification
//! - Assembly of the aggregate view served to consumers

pub mod preprocess;
pub mod spikes;
pub mod stress;
pub mod view;

// Re-export commonly used types
pub use preprocess::{preprocess, preprocess_with_limit, DEFAULT_SATURATION_LIMIT};
pub use spikes::{SpikeDetector, DEFAULT_MIN_DURATION_SECS, DEFAULT_THRESHOLD_SIGMA};
pub use stress::{Spectrum, StressClassifier, StressLevel, DEFAULT_SAMPLING_RATE};
pub use view::{ChannelBuckets, ChannelPoint, SignalStats, StreamView, ViewAssembler};
