use crate::foundation::core::FrameIndex;
use crate::foundation::error::{MotionError, MotionResult};
use crate::render::frame::FrameRGBA;

/// Configuration handed to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames per second.
    pub frame_rate: f64,
    /// Encoder quality in `[0, 1]`.
    pub quality: f64,
    /// Number of frames that will be pushed.
    pub total_frames: u64,
}

/// Consumer of rendered frames.
///
/// `push_frame` is called in strictly increasing [`FrameIndex`] order between `begin` and `end`.
/// After `abort` the sink must release its resources and never produce output.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> MotionResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> MotionResult<()>;
    /// Called once after the last frame; flushes any buffered encoding work.
    fn end(&mut self) -> MotionResult<()>;
    /// Stop early and discard partial output.
    fn abort(&mut self) {}
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    finished: bool,
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

    /// `true` once `end` ran.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> MotionResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> MotionResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| MotionError::encode("in-memory sink not started"))?;
        if let Some((last, _)) = self.frames.last()
            && idx.0 <= last.0
        {
            return Err(MotionError::encode(
                "in-memory sink received out-of-order frame index",
            ));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(MotionError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> MotionResult<()> {
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.frames.clear();
        self.finished = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
