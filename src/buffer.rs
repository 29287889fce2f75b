//! Bounded, time-windowed accumulation of streaming telemetry.
//!
//! One [`StreamBuffer`] exists per active session, owned by the
//! surrounding service layer. Multiple producers (one-shot requests, a
//! persistent stream, push messages) may feed the same buffer
//! concurrently; every operation takes one exclusive lock for its full
//! extent, so append, trim, and event pruning are observed atomically.

use crate::frame::types::{Event, Sample};
use tokio::sync::Mutex;

/// Default sample capacity of a session buffer.
pub const DEFAULT_MAX_SAMPLES: usize = 10_000;

#[derive(Debug, Default)]
struct BufferState {
    samples: Vec<Sample>,
    events: Vec<Event>,
}

/// Bounded accumulator of samples and events for one session.
///
/// Invariants held after every mutation:
/// - at most `max_samples` samples, oldest evicted first, arrival order
///   preserved
/// - every retained event has `timestamp >= samples[0].timestamp`, or no
///   events at all when no samples remain
#[derive(Debug)]
pub struct StreamBuffer {
    max_samples: usize,
    state: Mutex<BufferState>,
}

impl Default for StreamBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SAMPLES)
    }
}

impl StreamBuffer {
    /// Create a buffer holding at most `max_samples` samples.
    pub fn new(max_samples: usize) -> Self {
        Self {
            max_samples,
            state: Mutex::new(BufferState::default()),
        }
    }

    /// The sample capacity of this buffer.
    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    /// Append samples and events, evicting from the front once over
    /// capacity and pruning events older than the surviving samples.
    pub async fn add(&self, samples: &[Sample], events: &[Event]) {
        let mut state = self.state.lock().await;

        state.samples.extend_from_slice(samples);
        state.events.extend_from_slice(events);

        if state.samples.len() > self.max_samples {
            let excess = state.samples.len() - self.max_samples;
            state.samples.drain(..excess);
        }

        match state.samples.first().map(|s| s.timestamp) {
            Some(cutoff) => state.events.retain(|e| e.timestamp >= cutoff),
            None => state.events.clear(),
        }
    }

    /// Extract the trailing time window of `duration` seconds.
    ///
    /// The window ends at the newest sample's timestamp. Returns copies of
    /// all samples with `timestamp >= end - duration` and all events with
    /// a timestamp inside `[end - duration, end]`. An empty buffer yields
    /// empty results for any duration.
    pub async fn window(&self, duration: f64) -> (Vec<Sample>, Vec<Event>) {
        let state = self.state.lock().await;

        let end = match state.samples.last() {
            Some(last) => last.timestamp,
            None => return (Vec::new(), Vec::new()),
        };
        let start = end - duration;

        let samples = state
            .samples
            .iter()
            .filter(|s| s.timestamp >= start)
            .copied()
            .collect();
        let events = state
            .events
            .iter()
            .filter(|e| e.timestamp >= start && e.timestamp <= end)
            .cloned()
            .collect();

        (samples, events)
    }

    /// Drop all buffered samples and events.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.samples.clear();
        state.events.clear();
    }

    /// Number of currently buffered samples.
    pub async fn len(&self) -> usize {
        self.state.lock().await.samples.len()
    }

    /// Whether the buffer currently holds no samples.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::types::Channel;

    fn sample(timestamp: f64, value: f32) -> Sample {
        Sample::new(timestamp, Channel::Fp1, value)
    }

    #[tokio::test]
    async fn test_add_and_window() {
        let buffer = StreamBuffer::default();
        let samples: Vec<Sample> = (0..10).map(|i| sample(i as f64, i as f32)).collect();
        let events = vec![Event::new(5.0, "marker")];

        buffer.add(&samples, &events).await;

        let (window_samples, window_events) = buffer.window(4.0).await;
        // Window is [5.0, 9.0]
        assert_eq!(window_samples.len(), 5);
        assert_eq!(window_samples[0].timestamp, 5.0);
        assert_eq!(window_events.len(), 1);
    }

    #[tokio::test]
    async fn test_fifo_eviction_keeps_last_cap_in_order() {
        let buffer = StreamBuffer::new(5);
        for i in 0..8 {
            buffer.add(&[sample(i as f64, i as f32)], &[]).await;
        }

        let (samples, _) = buffer.window(f64::MAX).await;
        assert_eq!(samples.len(), 5);
        let values: Vec<f32> = samples.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[tokio::test]
    async fn test_events_pruned_with_evicted_samples() {
        let buffer = StreamBuffer::new(3);
        let early_event = Event::new(0.0, "early");
        let late_event = Event::new(9.0, "late");
        buffer
            .add(&[sample(0.0, 0.0), sample(1.0, 1.0)], &[early_event])
            .await;
        buffer
            .add(
                &[sample(8.0, 8.0), sample(9.0, 9.0), sample(10.0, 10.0)],
                &[late_event],
            )
            .await;

        let (samples, events) = buffer.window(f64::MAX).await;
        assert_eq!(samples[0].timestamp, 8.0);
        // The event at 0.0 predates every surviving sample
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, "late");
    }

    #[tokio::test]
    async fn test_empty_buffer_window() {
        let buffer = StreamBuffer::default();
        let (samples, events) = buffer.window(10.0).await;
        assert!(samples.is_empty());
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_duration_yields_tail_sample_only() {
        let buffer = StreamBuffer::default();
        buffer
            .add(&[sample(1.0, 1.0), sample(2.0, 2.0)], &[])
            .await;

        let (samples, _) = buffer.window(0.0).await;
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].timestamp, 2.0);

        let (samples, _) = buffer.window(-5.0).await;
        assert!(samples.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let buffer = StreamBuffer::default();
        buffer.add(&[sample(0.0, 1.0)], &[Event::new(0.0, "m")]).await;
        buffer.clear().await;

        assert!(buffer.is_empty().await);
        let (samples, events) = buffer.window(10.0).await;
        assert!(samples.is_empty());
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_empty_add_on_empty_buffer_drops_events() {
        let buffer = StreamBuffer::default();
        buffer.add(&[], &[Event::new(1.0, "orphan")]).await;

        let (_, events) = buffer.window(10.0).await;
        assert!(events.is_empty());
        assert!(buffer.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_adds_respect_cap() {
        use std::sync::Arc;

        let buffer = Arc::new(StreamBuffer::new(100));
        let mut handles = Vec::new();
        for task in 0..8 {
            let buffer = Arc::clone(&buffer);
            handles.push(tokio::spawn(async move {
                for i in 0..50 {
                    let t = (task * 50 + i) as f64;
                    buffer.add(&[sample(t, t as f32)], &[]).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(buffer.len().await, 100);
    }
}
