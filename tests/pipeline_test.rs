//! Integration tests for the frame-to-view pipeline

use neurostream_core::{
    frame_digest, parse_frame, preprocess, process_hex_frame, Channel, StreamBuffer, StressLevel,
    ViewAssembler,
};

/// Assemble a well-formed hex frame. Each row holds one value per channel.
fn build_frame(
    session_id: &str,
    sampling_rate: u16,
    start_timestamp: f64,
    rows: &[Vec<f32>],
    events_json: &str,
) -> String {
    let channel_count = rows.first().map(|r| r.len()).unwrap_or(4) as u8;

    let mut body = Vec::new();
    body.extend_from_slice(b"NEUR");
    body.extend_from_slice(&1u16.to_le_bytes());
    body.push(channel_count);
    body.extend_from_slice(&(rows.len() as u32).to_le_bytes());
    body.extend_from_slice(&sampling_rate.to_le_bytes());
    body.extend_from_slice(&start_timestamp.to_le_bytes());
    let mut id = [b' '; 11];
    id[..session_id.len()].copy_from_slice(session_id.as_bytes());
    body.extend_from_slice(&id);

    for row in rows {
        for value in row {
            body.extend_from_slice(&value.to_le_bytes());
        }
    }

    body.extend_from_slice(&(events_json.len() as u32).to_le_bytes());
    body.extend_from_slice(events_json.as_bytes());

    let digest = frame_digest(&body);
    body.extend_from_slice(&digest);
    hex::encode(body)
}

#[tokio::test]
async fn test_frame_to_view_round_trip() {
    let rows = vec![vec![1.0f32, 2.0, 3.0, 4.0], vec![5.0, 6.0, 7.0, 8.0]];
    let events_json =
        r#"{"events":[{"timestamp":10.0,"type":"annotation","channel":1,"duration":0.5}]}"#;
    let hex = build_frame("SESSION-7", 256, 10.0, &rows, events_json);

    let buffer = StreamBuffer::default();
    let view = process_hex_frame(&hex, Some(&buffer)).await;

    // Every channel received both rows
    for channel in Channel::ALL {
        assert_eq!(view.channels.bucket(channel).len(), 2);
    }
    assert_eq!(view.channels.fp1[0].value, 1.0);
    assert_eq!(view.channels.c4[1].value, 8.0);

    assert_eq!(view.events.len(), 1);
    assert_eq!(view.events[0].kind, "annotation");
    assert_eq!(view.events[0].channel, Some(Channel::Fp2));

    assert_eq!(view.stats.total_samples, 8);
    assert_eq!(view.stats.valid_samples, 8);

    // The buffer saw the same frame
    let (samples, events) = buffer.window(60.0).await;
    assert_eq!(samples.len(), 8);
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_corrupted_digest_is_non_fatal_end_to_end() {
    let rows = vec![vec![1.0f32, 2.0, 3.0, 4.0]];
    let hex = build_frame("SESSION-7", 256, 0.0, &rows, "{\"events\":[]}");

    let mut raw = hex::decode(&hex).unwrap();
    let last = raw.len() - 1;
    raw[last] ^= 0xff;

    let view = process_hex_frame(&hex::encode(raw), None).await;
    assert_eq!(view.stats.total_samples, 4);
    assert_eq!(view.channels.fp1.len(), 1);
}

#[tokio::test]
async fn test_saturated_values_flagged_through_pipeline() {
    let rows = vec![
        vec![1.0f32, 2.0, 3.0, 4.0],
        vec![20_000.0, 5.0, 6.0, 7.0],
    ];
    let hex = build_frame("SESSION-7", 256, 0.0, &rows, "{\"events\":[]}");

    let view = process_hex_frame(&hex, None).await;

    assert_eq!(view.stats.total_samples, 8);
    assert_eq!(view.stats.valid_samples, 7);
    assert_eq!(view.stats.invalid_samples, 1);
    // The saturated fp1 reading is absent from its trace
    assert_eq!(view.channels.fp1.len(), 1);
    assert_eq!(view.channels.fp2.len(), 2);
}

#[tokio::test]
async fn test_beta_dominant_frame_rates_elevated() {
    // Single-channel frame carrying a pure 20 Hz sinusoid at 256 Hz
    let rows: Vec<Vec<f32>> = (0..512)
        .map(|i| {
            let t = i as f64 / 256.0;
            vec![(100.0 * (2.0 * std::f64::consts::PI * 20.0 * t).sin()) as f32]
        })
        .collect();
    let hex = build_frame("SESSION-7", 256, 0.0, &rows, "{\"events\":[]}");

    let view = process_hex_frame(&hex, None).await;
    assert_ne!(view.stress_level, StressLevel::Low);
}

#[tokio::test]
async fn test_window_query_after_many_frames() {
    let buffer = StreamBuffer::new(1000);

    // Four one-second frames of 256 samples each, consecutive in time
    for frame_index in 0..4 {
        let rows: Vec<Vec<f32>> = (0..256).map(|i| vec![i as f32]).collect();
        let hex = build_frame(
            "SESSION-7",
            256,
            frame_index as f64,
            &rows,
            "{\"events\":[]}",
        );
        process_hex_frame(&hex, Some(&buffer)).await;
    }

    // Capacity kept the newest 1000 of 1024 samples
    assert_eq!(buffer.len().await, 1000);

    // A one-second window reaches back exactly one frame
    let (samples, _) = buffer.window(1.0).await;
    let newest = samples.last().unwrap().timestamp;
    assert!(samples.iter().all(|s| newest - s.timestamp <= 1.0));
    assert_eq!(samples.len(), 257);
}

#[tokio::test]
async fn test_concurrent_producers_share_one_session_buffer() {
    use std::sync::Arc;

    let buffer = Arc::new(StreamBuffer::default());
    let mut handles = Vec::new();

    for producer in 0..4 {
        let buffer = Arc::clone(&buffer);
        handles.push(tokio::spawn(async move {
            let rows: Vec<Vec<f32>> = (0..64).map(|i| vec![i as f32]).collect();
            let hex = build_frame(
                "SESSION-7",
                256,
                producer as f64 * 10.0,
                &rows,
                "{\"events\":[]}",
            );
            process_hex_frame(&hex, Some(&buffer)).await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(buffer.len().await, 4 * 64);
}

#[tokio::test]
async fn test_windowed_reassembly_matches_direct_path() {
    let rows = vec![vec![1.0f32, 2.0, 3.0, 4.0]];
    let hex = build_frame("SESSION-7", 256, 100.0, &rows, "{\"events\":[]}");

    let (samples, events) = parse_frame(&hex);
    let samples = preprocess(samples);

    let buffer = StreamBuffer::default();
    buffer.add(&samples, &events).await;
    let (window_samples, window_events) = buffer.window(10.0).await;

    let direct = ViewAssembler::default().assemble(&samples, &events);
    let windowed = ViewAssembler::default().assemble(&window_samples, &window_events);

    assert_eq!(
        serde_json::to_value(&direct).unwrap(),
        serde_json::to_value(&windowed).unwrap()
    );
}
