//! Wire-level types for the binary telemetry frame format.
//!
//! A frame carries a fixed 32-byte header, a block of little-endian f32
//! samples, a length-prefixed JSON event block, and a 16-byte integrity
//! digest. These types are what the parser produces and every later
//! pipeline stage consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Length of the fixed frame header in bytes.
pub const HEADER_LEN: usize = 32;

/// Length of the trailing integrity digest in bytes.
pub const DIGEST_LEN: usize = 16;

/// Smallest well-formed frame: header plus digest, zero samples and events.
pub const MIN_FRAME_LEN: usize = HEADER_LEN + DIGEST_LEN;

/// Acquisition channel for one electrode site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Fp1,
    Fp2,
    C3,
    C4,
}

impl Channel {
    /// All channels in wire-index order.
    pub const ALL: [Channel; 4] = [Channel::Fp1, Channel::Fp2, Channel::C3, Channel::C4];

    /// Map a wire channel index to a channel. Total over u8; indices
    /// outside 0..=3 have no channel.
    pub fn from_index(index: u8) -> Option<Channel> {
        match index {
            0 => Some(Channel::Fp1),
            1 => Some(Channel::Fp2),
            2 => Some(Channel::C3),
            3 => Some(Channel::C4),
            _ => None,
        }
    }

    /// The wire index of this channel.
    pub fn index(&self) -> u8 {
        match self {
            Channel::Fp1 => 0,
            Channel::Fp2 => 1,
            Channel::C3 => 2,
            Channel::C4 => 3,
        }
    }

    /// Lowercase channel name as used in serialized views.
    pub fn name(&self) -> &'static str {
        match self {
            Channel::Fp1 => "fp1",
            Channel::Fp2 => "fp2",
            Channel::C3 => "c3",
            Channel::C4 => "c4",
        }
    }
}

/// One scalar reading for one channel at one point in time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds since the epoch, derived from the frame start timestamp
    /// and the sample's position at the frame's sampling rate
    pub timestamp: f64,
    /// Channel the reading belongs to
    pub channel: Channel,
    /// Raw reading value
    pub value: f32,
    /// Cleared by preprocessing when the reading is implausible
    #[serde(default = "default_valid")]
    pub valid: bool,
}

fn default_valid() -> bool {
    true
}

impl Sample {
    /// Create a valid sample.
    pub fn new(timestamp: f64, channel: Channel, value: f32) -> Self {
        Self {
            timestamp,
            channel,
            value,
            valid: true,
        }
    }
}

/// A discrete, named occurrence: embedded in a frame's event block or
/// synthesized by spike detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Seconds since the epoch
    pub timestamp: f64,
    /// Event tag, e.g. "spike" or an annotation from the acquisition side
    #[serde(rename = "type")]
    pub kind: String,
    /// Channel attribution, if any
    #[serde(default)]
    pub channel: Option<Channel>,
    /// Duration in seconds; zero for instantaneous events
    #[serde(default)]
    pub duration: f64,
    /// Open string-keyed payload carried alongside the event
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Event {
    /// Create an instantaneous event with no channel attribution.
    pub fn new(timestamp: f64, kind: impl Into<String>) -> Self {
        Self {
            timestamp,
            kind: kind.into(),
            channel: None,
            duration: 0.0,
            metadata: serde_json::Map::new(),
        }
    }
}

/// Decoded frame header.
///
/// All multi-byte fields are little-endian on the wire; the session id is
/// an 11-byte ASCII tag, trimmed of padding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameHeader {
    pub magic: [u8; 4],
    pub version: u16,
    pub channel_count: u8,
    pub total_samples: u32,
    pub sampling_rate: u16,
    pub start_timestamp: f64,
    pub session_id: String,
}

impl FrameHeader {
    /// Byte length of the sample block this header announces.
    pub fn sample_block_len(&self) -> usize {
        self.total_samples as usize * self.channel_count as usize * 4
    }

    /// Frame start as a UTC datetime, for display. None if the wire
    /// timestamp is not representable.
    pub fn start_datetime(&self) -> Option<DateTime<Utc>> {
        let secs = self.start_timestamp.floor();
        let nanos = ((self.start_timestamp - secs) * 1e9) as u32;
        DateTime::<Utc>::from_timestamp(secs as i64, nanos)
    }
}
