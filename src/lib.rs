//! NeuroStream Core - bio-signal telemetry decoding, analysis, and
//! stream buffering.
//!
//! This library ingests hexadecimal-encoded binary telemetry frames,
//! decodes them into typed samples and discrete events, validates frame
//! integrity, filters and classifies the signal, and maintains a bounded,
//! time-windowed buffer per streaming session.
//!
//! # Guarantees
//!
//! - **Never throws on bad input**: frame decoding degrades to the richest
//!   partial result obtainable and records a diagnostic, it never returns
//!   an error to the caller
//! - **Bit-exact wire format**: header offsets, endianness, and field
//!   widths are reproduced exactly as acquisition devices emit them
//! - **Atomic buffer mutation**: append, capacity trim, and event pruning
//!   happen under one lock; no reader observes a half-updated buffer
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      NeuroStream Core                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │ FrameParser │──▶│ Preprocess  │──▶│   Spikes +  │       │
//! │  │ (hex frame) │   │ (validity)  │   │   Stress    │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │         │                 │                  │              │
//! │         ▼                 ▼                  ▼              │
//! │  ┌─────────────┐                     ┌─────────────┐       │
//! │  │StreamBuffer │                     │ StreamView  │       │
//! │  │ (per sess.) │                     │ (assembled) │       │
//! │  └─────────────┘                     └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use neurostream_core::{parse_frame, preprocess, StreamBuffer, ViewAssembler};
//!
//! # async fn demo(hex_frame: &str) {
//! let (samples, events) = parse_frame(hex_frame);
//! let samples = preprocess(samples);
//!
//! let buffer = StreamBuffer::default();
//! buffer.add(&samples, &events).await;
//!
//! let (windowed_samples, windowed_events) = buffer.window(10.0).await;
//! let view = ViewAssembler::default().assemble(&windowed_samples, &windowed_events);
//! println!("stress: {}", view.stress_level);
//! # }
//! ```

pub mod analysis;
pub mod buffer;
pub mod config;
pub mod frame;
pub mod pipeline;

// Re-export key types at crate root for convenience
pub use analysis::{
    preprocess, preprocess_with_limit, ChannelBuckets, ChannelPoint, SignalStats, Spectrum,
    SpikeDetector, StreamView, StressClassifier, StressLevel, ViewAssembler,
};
pub use buffer::{StreamBuffer, DEFAULT_MAX_SAMPLES};
pub use config::{ConfigError, CoreConfig};
pub use frame::{
    frame_digest, frame_header, parse_frame, Channel, Event, FrameError, FrameHeader, Sample,
};
pub use pipeline::process_hex_frame;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
