//! Binary telemetry frame decoding.
//!
//! This module owns the one bit-exact contract in the crate: the wire
//! layout of a telemetry frame and its decoding into typed samples and
//! events.

pub mod parser;
pub mod types;

// Re-export commonly used items
pub use parser::{frame_digest, frame_header, parse_frame, FrameError};
pub use types::{
    Channel, Event, FrameHeader, Sample, DIGEST_LEN, HEADER_LEN, MIN_FRAME_LEN,
};
