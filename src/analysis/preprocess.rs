//! Validity filtering for decoded samples.
//!
//! The only preprocessing applied to raw samples is a saturation check:
//! readings whose magnitude exceeds the plausible range of the acquisition
//! hardware are flagged invalid. Timestamps and channels are never touched,
//! and the sequence keeps its length and order.

use crate::frame::types::Sample;

/// Magnitude above which a reading is treated as amplifier saturation.
pub const DEFAULT_SATURATION_LIMIT: f32 = 10_000.0;

/// Apply the default saturation filter.
pub fn preprocess(samples: Vec<Sample>) -> Vec<Sample> {
    preprocess_with_limit(samples, DEFAULT_SATURATION_LIMIT)
}

/// Flag samples with `|value| > saturation_limit` as invalid. Every other
/// field is left untouched; already-invalid samples stay invalid.
pub fn preprocess_with_limit(mut samples: Vec<Sample>, saturation_limit: f32) -> Vec<Sample> {
    for sample in &mut samples {
        if sample.value.abs() > saturation_limit {
            sample.valid = false;
        }
    }
    samples
}
