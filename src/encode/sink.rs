use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{MixdeckError, MixdeckResult};
use crate::render::cpu::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Nominal output frame rate.
    pub fps: Fps,
}

/// Consumer of composited frames, e.g. a preview window or a stream encoder.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order between
/// one `begin` and the matching `end`, with frames of the size announced in `begin`.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> MixdeckResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> MixdeckResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> MixdeckResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Whether `end` was called after the last `begin`.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> MixdeckResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> MixdeckResult<()> {
        check_order(self.frames.last().map(|(i, _)| *i), idx)?;
        check_size(self.cfg.as_ref(), frame)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> MixdeckResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Writes each frame as `frame_000000.png` (straight alpha) into a directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    last: Option<FrameIndex>,
    written: usize,
}

impl PngSequenceSink {
    /// Sink writing into `dir`, created on `begin` if missing.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            last: None,
            written: 0,
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of files written since `begin`.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Path a given frame is written to.
    pub fn path_for(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("frame_{:06}.png", idx.0))
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> MixdeckResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;
        tracing::debug!(dir = %self.dir.display(), width = cfg.width, height = cfg.height, "png sequence begin");
        self.cfg = Some(cfg);
        self.last = None;
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> MixdeckResult<()> {
        check_order(self.last, idx)?;
        check_size(self.cfg.as_ref(), frame)?;
        let path = self.path_for(idx);
        write_png(&path, frame)?;
        self.last = Some(idx);
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> MixdeckResult<()> {
        tracing::debug!(frames = self.written, "png sequence end");
        Ok(())
    }
}

/// Encode `frame` as a straight-alpha PNG at `path`.
pub fn write_png(path: &Path, frame: &FrameRGBA) -> MixdeckResult<()> {
    let straight = frame.to_straight();
    image::save_buffer_with_format(
        path,
        &straight.data,
        straight.width,
        straight.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

fn check_order(last: Option<FrameIndex>, idx: FrameIndex) -> MixdeckResult<()> {
    match last {
        Some(prev) if idx.0 <= prev.0 => Err(MixdeckError::validation(format!(
            "frame {} pushed after frame {}",
            idx.0, prev.0
        ))),
        _ => Ok(()),
    }
}

fn check_size(cfg: Option<&SinkConfig>, frame: &FrameRGBA) -> MixdeckResult<()> {
    match cfg {
        Some(cfg) if (frame.width, frame.height) != (cfg.width, cfg.height) => {
            Err(MixdeckError::validation(format!(
                "frame is {}x{}, sink was configured for {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
