//! End-to-end processing of one hex-encoded frame.
//!
//! Ties the stages together the way the surrounding service layer uses
//! them: decode, preprocess, optionally feed a session buffer, assemble
//! the consumer view.

use crate::analysis::preprocess::preprocess;
use crate::analysis::view::{StreamView, ViewAssembler};
use crate::buffer::StreamBuffer;
use crate::frame::parser::parse_frame;

/// Process one hex frame with default-configured components.
///
/// When `buffer` is given, the preprocessed samples and frame events are
/// appended to it before the view is assembled, so a later window query
/// sees this frame's data.
pub async fn process_hex_frame(hex_data: &str, buffer: Option<&StreamBuffer>) -> StreamView {
    let (samples, events) = parse_frame(hex_data);
    let samples = preprocess(samples);

    if let Some(buffer) = buffer {
        buffer.add(&samples, &events).await;
    }

    ViewAssembler::default().assemble(&samples, &events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_garbage_input_yields_empty_view() {
        let view = process_hex_frame("zzzz", None).await;
        assert_eq!(view.stats.total_samples, 0);
        assert!(view.events.is_empty());
    }

    #[tokio::test]
    async fn test_buffer_receives_frame_data() {
        let buffer = StreamBuffer::default();
        // Not a valid frame; the buffer must simply stay consistent
        process_hex_frame("00", Some(&buffer)).await;
        assert!(buffer.is_empty().await);
    }
}
