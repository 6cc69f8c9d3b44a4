use std::io::Cursor;

use anyhow::Context;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{MotionError, MotionResult};
use crate::render::frame::FrameRGBA;

/// Encode a frame as a PNG with straight alpha.
pub fn encode_png(frame: &FrameRGBA) -> MotionResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.to_straight_rgba8())
        .ok_or_else(|| MotionError::encode("frame data does not match width*height*4"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

/// Sink serializing every frame to PNG independently.
#[derive(Debug, Default)]
pub struct PngSequenceSink {
    frames: Vec<Vec<u8>>,
    started: bool,
}

impl PngSequenceSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoded frames in order.
    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    /// Take the encoded frames, leaving the sink empty.
    pub fn take_frames(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.frames)
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> MotionResult<()> {
        self.frames.clear();
        self.frames
            .reserve(usize::try_from(cfg.total_frames).unwrap_or(0).min(1 << 16));
        self.started = true;
        Ok(())
    }

    fn push_frame(&mut self, _idx: FrameIndex, frame: &FrameRGBA) -> MotionResult<()> {
        if !self.started {
            return Err(MotionError::encode("png sequence sink not started"));
        }
        let png = encode_png(frame)
            .map_err(|e| MotionError::encode(format!("png frame {}: {e}", self.frames.len())))?;
        self.frames.push(png);
        Ok(())
    }

    fn end(&mut self) -> MotionResult<()> {
        self.started = false;
        Ok(())
    }

    fn abort(&mut self) {
        self.frames.clear();
        self.started = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
