use super::*;

fn frame(w: u32, h: u32) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: vec![0; (w * h * 4) as usize],
        premultiplied: true,
    }
}

fn cfg(w: u32, h: u32) -> SinkConfig {
    SinkConfig {
        width: w,
        height: h,
        frame_rate: 30.0,
        quality: 1.0,
        total_frames: 3,
    }
}

#[test]
fn in_memory_sink_captures_frames_in_order() {
    let mut sink = InMemorySink::new();
    assert!(sink.push_frame(FrameIndex(0), &frame(2, 2)).is_err());

    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2)).unwrap();
    sink.push_frame(FrameIndex(2), &frame(2, 2)).unwrap();
    assert!(matches!(
        sink.push_frame(FrameIndex(2), &frame(2, 2)),
        Err(MotionError::Encode(_))
    ));
    assert!(matches!(
        sink.push_frame(FrameIndex(3), &frame(3, 2)),
        Err(MotionError::Validation(_))
    ));
    sink.end().unwrap();

    assert!(sink.is_finished());
    let indices: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(indices, vec![0, 2]);
}

#[test]
fn abort_discards_captured_frames() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(1, 1)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(1, 1)).unwrap();
    sink.abort();
    assert!(sink.frames().is_empty());
    assert!(!sink.is_finished());
}
