//! Pixel sources that back webcam, screen, video, image and background layers.
//!
//! Capture, decoding and permission handling happen outside the engine. A layer only ever asks its
//! binding two questions per frame: "is a frame ready?" and "give me the current frame". Both must
//! be cheap and side-effect free.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{MixdeckError, MixdeckResult};

/// One immutable premultiplied RGBA8 frame. Cloning shares the pixel buffer.
#[derive(Clone, Debug)]
pub struct SourceFrame {
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
}

impl SourceFrame {
    /// Wrap premultiplied RGBA8 bytes, tightly packed and row-major.
    pub fn new(width: u32, height: u32, rgba8_premul: Arc<Vec<u8>>) -> MixdeckResult<Self> {
        if width == 0 || height == 0 {
            return Err(MixdeckError::validation("source frame must be non-empty"));
        }
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if rgba8_premul.len() != expected {
            return Err(MixdeckError::validation(format!(
                "source frame byte len mismatch: expected {expected}, got {}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul,
        })
    }

    /// Build a frame from straight (non-premultiplied) RGBA8 bytes.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> MixdeckResult<Self> {
        crate::assets::decode::premultiply_rgba8_in_place(&mut rgba);
        Self::new(width, height, Arc::new(rgba))
    }

    /// A frame filled with a single color.
    pub fn solid(width: u32, height: u32, color: Rgba8Premul) -> MixdeckResult<Self> {
        let n = (width as usize).saturating_mul(height as usize);
        let mut bytes = Vec::with_capacity(n.saturating_mul(4));
        for _ in 0..n {
            bytes.extend_from_slice(&color.to_array());
        }
        Self::new(width, height, Arc::new(bytes))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Premultiplied RGBA8 bytes.
    pub fn rgba8_premul(&self) -> &[u8] {
        &self.rgba8_premul
    }

    /// Return `true` when both frames share the same pixel buffer.
    pub fn same_buffer(&self, other: &SourceFrame) -> bool {
        Arc::ptr_eq(&self.rgba8_premul, &other.rgba8_premul)
    }
}

/// Uniform view over anything that supplies pixels to a layer.
///
/// A binding is owned exclusively by its layer. `release` is invoked exactly when the layer is
/// removed from the store (or dropped) and must free whatever external resource the binding holds.
pub trait SourceBinding: Send {
    /// Whether a decodable frame is available right now.
    fn is_frame_ready(&self) -> bool;

    /// The current frame, if any. Must not block.
    fn current_frame(&self) -> Option<SourceFrame>;

    /// Release external resources. Called at most once per binding by the engine.
    fn release(&mut self) {}

    /// Intrinsic size of the source, if known.
    fn natural_size(&self) -> Option<(u32, u32)> {
        self.current_frame().map(|f| (f.width(), f.height()))
    }
}

type ReleaseHook = Box<dyn FnOnce() + Send>;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
struct StillState {
    frame: Option<SourceFrame>,
    released: bool,
}

/// A static image (image, logo, still background).
///
/// Images may be created before their bytes finish loading; the layer is skipped by the compositor
/// until the paired [`ImageLoader`] completes.
pub struct StillImage {
    state: Arc<Mutex<StillState>>,
    on_release: Option<ReleaseHook>,
}

/// Completion handle for a pending [`StillImage`].
pub struct ImageLoader {
    state: Arc<Mutex<StillState>>,
}

impl StillImage {
    /// An image that is ready immediately.
    pub fn loaded(frame: SourceFrame) -> Self {
        Self {
            state: Arc::new(Mutex::new(StillState {
                frame: Some(frame),
                released: false,
            })),
            on_release: None,
        }
    }

    /// Decode encoded raster bytes (PNG, JPEG, ...).
    pub fn decode(bytes: &[u8]) -> MixdeckResult<Self> {
        Ok(Self::loaded(crate::assets::decode::decode_image(bytes)?))
    }

    /// Rasterize SVG bytes at `scale` times their intrinsic size.
    pub fn svg(bytes: &[u8], scale: f32) -> MixdeckResult<Self> {
        Ok(Self::loaded(crate::assets::decode::rasterize_svg(
            bytes, scale,
        )?))
    }

    /// An image whose pixels arrive later through the returned loader.
    pub fn pending() -> (Self, ImageLoader) {
        let state = Arc::new(Mutex::new(StillState::default()));
        (
            Self {
                state: Arc::clone(&state),
                on_release: None,
            },
            ImageLoader { state },
        )
    }

    /// Run `hook` when the owning layer is removed.
    pub fn with_release_hook(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_release = Some(Box::new(hook));
        self
    }
}

impl ImageLoader {
    /// Deliver the decoded image. Returns `false` if the layer was already removed.
    pub fn complete(self, frame: SourceFrame) -> bool {
        let mut st = lock(&self.state);
        if st.released {
            return false;
        }
        st.frame = Some(frame);
        true
    }

    /// Decode and deliver encoded raster bytes.
    pub fn complete_encoded(self, bytes: &[u8]) -> MixdeckResult<bool> {
        let frame = crate::assets::decode::decode_image(bytes)?;
        Ok(self.complete(frame))
    }
}

impl SourceBinding for StillImage {
    fn is_frame_ready(&self) -> bool {
        let st = lock(&self.state);
        !st.released && st.frame.is_some()
    }

    fn current_frame(&self) -> Option<SourceFrame> {
        let st = lock(&self.state);
        if st.released {
            return None;
        }
        st.frame.clone()
    }

    fn release(&mut self) {
        {
            let mut st = lock(&self.state);
            st.released = true;
            st.frame = None;
        }
        if let Some(hook) = self.on_release.take() {
            hook();
        }
    }
}

#[derive(Debug, Default)]
struct SlotState {
    latest: Option<SourceFrame>,
    frames_pushed: u64,
    closed: bool,
}

/// Latest-frame mailbox for live sources (webcam, screen share, playing video).
///
/// A capture thread owns the [`FrameFeed`] and pushes frames at its own pace; the compositor reads
/// whatever frame is newest at tick time.
pub struct FrameSlot {
    state: Arc<Mutex<SlotState>>,
    on_release: Option<ReleaseHook>,
}

/// Producer side of a [`FrameSlot`]. Cheap to clone and `Send`.
#[derive(Clone)]
pub struct FrameFeed {
    state: Arc<Mutex<SlotState>>,
}

impl FrameSlot {
    /// Create an empty slot and its producer handle.
    pub fn new() -> (Self, FrameFeed) {
        let state = Arc::new(Mutex::new(SlotState::default()));
        (
            Self {
                state: Arc::clone(&state),
                on_release: None,
            },
            FrameFeed { state },
        )
    }

    /// Run `hook` when the owning layer is removed (stop capture tracks, disconnect audio).
    pub fn with_release_hook(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_release = Some(Box::new(hook));
        self
    }
}

impl FrameFeed {
    /// Publish a new frame. Returns `false` once the consuming layer is gone, signalling the
    /// producer to stop capturing.
    pub fn push(&self, frame: SourceFrame) -> bool {
        let mut st = lock(&self.state);
        if st.closed {
            return false;
        }
        st.latest = Some(frame);
        st.frames_pushed = st.frames_pushed.saturating_add(1);
        true
    }

    /// Whether the consuming layer has been removed.
    pub fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }

    /// Total frames accepted so far.
    pub fn frames_pushed(&self) -> u64 {
        lock(&self.state).frames_pushed
    }
}

impl SourceBinding for FrameSlot {
    fn is_frame_ready(&self) -> bool {
        let st = lock(&self.state);
        !st.closed && st.latest.is_some()
    }

    fn current_frame(&self) -> Option<SourceFrame> {
        let st = lock(&self.state);
        if st.closed {
            return None;
        }
        st.latest.clone()
    }

    fn release(&mut self) {
        {
            let mut st = lock(&self.state);
            st.closed = true;
            st.latest = None;
        }
        if let Some(hook) = self.on_release.take() {
            hook();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/mod.rs"]
mod tests;
