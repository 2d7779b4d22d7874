use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

fn red(w: u32, h: u32) -> SourceFrame {
    SourceFrame::solid(w, h, Rgba8Premul::opaque(255, 0, 0)).unwrap()
}

#[test]
fn source_frame_validates_buffer_len() {
    assert!(SourceFrame::new(2, 2, Arc::new(vec![0; 15])).is_err());
    assert!(SourceFrame::new(0, 2, Arc::new(vec![])).is_err());
    let f = SourceFrame::new(2, 2, Arc::new(vec![0; 16])).unwrap();
    assert_eq!((f.width(), f.height()), (2, 2));
    assert!(f.same_buffer(&f.clone()));
}

#[test]
fn straight_frames_are_premultiplied() {
    let f = SourceFrame::from_straight_rgba8(1, 1, vec![200, 100, 50, 0]).unwrap();
    assert_eq!(f.rgba8_premul(), &[0, 0, 0, 0]);
}

#[test]
fn pending_image_becomes_ready_when_loaded() {
    let (img, loader) = StillImage::pending();
    assert!(!img.is_frame_ready());
    assert!(img.current_frame().is_none());
    assert_eq!(img.natural_size(), None);

    assert!(loader.complete(red(4, 3)));
    assert!(img.is_frame_ready());
    assert_eq!(img.natural_size(), Some((4, 3)));
}

#[test]
fn loader_completion_after_release_is_refused() {
    let (mut img, loader) = StillImage::pending();
    img.release();
    assert!(!loader.complete(red(1, 1)));
    assert!(!img.is_frame_ready());
}

#[test]
fn release_hooks_run_once() {
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    let mut img = StillImage::loaded(red(1, 1)).with_release_hook(move || {
        h.fetch_add(1, Ordering::SeqCst);
    });
    img.release();
    img.release();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(img.current_frame().is_none());
}

#[test]
fn frame_slot_tracks_latest_frame_and_closes_on_release() {
    let (mut slot, feed) = FrameSlot::new();
    assert!(!slot.is_frame_ready());

    assert!(feed.push(red(2, 2)));
    let second = red(3, 3);
    assert!(feed.clone().push(second.clone()));
    assert_eq!(feed.frames_pushed(), 2);
    assert!(slot.current_frame().unwrap().same_buffer(&second));

    slot.release();
    assert!(feed.is_closed());
    assert!(!feed.push(red(1, 1)));
    assert!(!slot.is_frame_ready());
}

#[test]
fn frame_feed_works_across_threads() {
    let (slot, feed) = FrameSlot::new();
    std::thread::spawn(move || {
        feed.push(red(8, 8));
    })
    .join()
    .unwrap();
    assert_eq!(slot.natural_size(), Some((8, 8)));
}
