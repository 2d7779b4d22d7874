use std::time::Duration;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{MixdeckError, MixdeckResult};
use crate::render::cpu::CpuSurface;
use crate::studio::Studio;

/// Totals for one [`FrameTicker::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Frames pushed to the sink.
    pub frames: u64,
    /// Sum of painted layers over all frames.
    pub layers_painted: u64,
    /// Sum of layers skipped because their source had no frame.
    pub layers_not_ready: u64,
}

/// Drives render ticks at a fixed rate on a synthetic clock and streams frames into a sink.
///
/// Stands in for the host's display-refresh scheduler in headless use: tick `i` renders at
/// `start + fps.frame_time(i)`.
#[derive(Clone, Copy, Debug)]
pub struct FrameTicker {
    fps: Fps,
    start: Duration,
}

impl FrameTicker {
    /// Ticker starting its clock at `start`.
    pub fn new(fps: Fps, start: Duration) -> Self {
        Self { fps, start }
    }

    /// Tick rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Clock reading of tick `idx`.
    pub fn clock_at(&self, idx: FrameIndex) -> Duration {
        self.start.saturating_add(self.fps.frame_time(idx))
    }

    /// Render `frames` ticks of `studio` without edits between them.
    pub fn run(
        &self,
        studio: &mut Studio,
        surface: &mut CpuSurface,
        sink: &mut dyn FrameSink,
        frames: u64,
    ) -> MixdeckResult<TickStats> {
        self.run_with(studio, surface, sink, frames, |_, _, _| {})
    }

    /// Render `frames` ticks, calling `before_tick` ahead of each so the host can apply input.
    ///
    /// Every edit made in `before_tick` for frame N is visible in frame N. Changing the
    /// resolution mid-run is an error, since the sink was configured for the starting canvas.
    #[tracing::instrument(level = "debug", skip_all, fields(frames = frames))]
    pub fn run_with(
        &self,
        studio: &mut Studio,
        surface: &mut CpuSurface,
        sink: &mut dyn FrameSink,
        frames: u64,
        mut before_tick: impl FnMut(&mut Studio, FrameIndex, Duration),
    ) -> MixdeckResult<TickStats> {
        if frames == 0 {
            return Err(MixdeckError::validation("frame count must be > 0"));
        }

        let canvas = studio.canvas();
        sink.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.fps,
        })?;

        let mut stats = TickStats::default();
        for i in 0..frames {
            let idx = FrameIndex(i);
            let now = self.clock_at(idx);
            before_tick(studio, idx, now);
            if studio.canvas() != canvas {
                return Err(MixdeckError::validation(format!(
                    "canvas changed to {}x{} during frame {}; the sink was configured for {}x{}",
                    studio.canvas().width,
                    studio.canvas().height,
                    i,
                    canvas.width,
                    canvas.height
                )));
            }

            let frame_stats = studio.render_frame(surface, now)?;
            sink.push_frame(idx, &surface.frame())?;

            stats.frames += 1;
            stats.layers_painted += frame_stats.painted as u64;
            stats.layers_not_ready += frame_stats.not_ready as u64;
        }

        sink.end()?;
        tracing::debug!(?stats, "ticker finished");
        Ok(stats)
    }
}

/// Frames-per-second counter refreshed once per second of clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct FpsMeter {
    window_start: Option<Duration>,
    frames: u32,
    last: Option<u32>,
}

impl FpsMeter {
    /// A meter with no samples.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame at `now`. Returns the new reading when a one-second window closes.
    pub fn tick(&mut self, now: Duration) -> Option<u32> {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;
        if now.saturating_sub(start) >= Duration::from_secs(1) {
            self.last = Some(self.frames);
            self.frames = 0;
            self.window_start = Some(now);
            return self.last;
        }
        None
    }

    /// Most recent reading.
    pub fn fps(&self) -> Option<u32> {
        self.last
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/ticker.rs"]
mod tests;
