use super::*;

fn frame(v: u8) -> FrameRGBA {
    FrameRGBA {
        width: 1,
        height: 1,
        data: vec![v, v, v, 255],
        premultiplied: true,
    }
}

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 1,
        height: 1,
        fps: Fps::new(30, 1).unwrap(),
    }
}

#[test]
fn in_memory_sink_captures_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame(1)).unwrap();
    sink.push_frame(FrameIndex(2), &frame(2)).unwrap();
    sink.end().unwrap();

    assert!(sink.is_ended());
    assert_eq!(sink.config(), Some(&cfg()));
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 2]);
}

#[test]
fn out_of_order_push_is_rejected() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(3), &frame(1)).unwrap();
    assert!(sink.push_frame(FrameIndex(3), &frame(1)).is_err());
    assert!(sink.push_frame(FrameIndex(1), &frame(1)).is_err());
    assert_eq!(sink.frames().len(), 1);
}

#[test]
fn frames_of_another_size_are_rejected() {
    let big = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![0; 8],
        premultiplied: true,
    };

    let mut mem = InMemorySink::new();
    mem.begin(cfg()).unwrap();
    let err = mem.push_frame(FrameIndex(0), &big).unwrap_err();
    assert!(err.to_string().contains("2x1"), "{err}");
    assert!(mem.frames().is_empty());

    let dir = std::env::temp_dir().join(format!("mixdeck_png_size_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let mut png = PngSequenceSink::new(&dir);
    png.begin(cfg()).unwrap();
    assert!(png.push_frame(FrameIndex(0), &big).is_err());
    assert!(!png.path_for(FrameIndex(0)).exists());
    assert_eq!(png.written(), 0);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn begin_resets_capture() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(5), &frame(1)).unwrap();
    sink.end().unwrap();
    sink.begin(cfg()).unwrap();
    assert!(sink.frames().is_empty());
    assert!(!sink.is_ended());
    sink.push_frame(FrameIndex(0), &frame(1)).unwrap();
}

#[test]
fn png_sequence_writes_numbered_files() {
    let dir = std::env::temp_dir().join(format!("mixdeck_png_seq_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(7), &frame(200)).unwrap();
    sink.end().unwrap();

    let path = sink.path_for(FrameIndex(7));
    assert!(path.ends_with("frame_000007.png"));
    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [200, 200, 200, 255]);
    assert_eq!(sink.written(), 1);
    let _ = std::fs::remove_dir_all(&dir);
}
