use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{MotionError, MotionResult};

/// Output container requested by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// VP9 in a WebM container, produced by `ffmpeg`.
    #[default]
    Webm,
    /// Animated GIF, produced by `ffmpeg`.
    Gif,
    /// One PNG per frame.
    PngSequence,
}

impl ExportFormat {
    /// `true` for formats that stream into a video encoder.
    pub fn is_video(self) -> bool {
        matches!(self, Self::Webm | Self::Gif)
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Gif => "gif",
            Self::PngSequence => "png",
        }
    }
}

fn default_quality() -> f64 {
    0.8
}

/// Output dimensions, time grid and encoding knobs of one export.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Frames per second.
    pub frame_rate: f64,
    /// Duration in seconds.
    pub duration: f64,
    /// Output container.
    #[serde(default)]
    pub format: ExportFormat,
    /// Encoder quality in `[0, 1]`; higher is better.
    #[serde(default = "default_quality")]
    pub quality: f64,
}

impl RenderConfig {
    /// Configuration with the default format and quality.
    pub fn new(width: u32, height: u32, frame_rate: f64, duration: f64) -> Self {
        Self {
            width,
            height,
            frame_rate,
            duration,
            format: ExportFormat::default(),
            quality: default_quality(),
        }
    }

    /// Set the output format.
    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    /// Check the configuration and return the raster canvas it describes.
    pub fn validate(&self) -> MotionResult<Canvas> {
        let canvas = Canvas::new(self.width, self.height)?;
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(MotionError::validation(format!(
                "frameRate must be finite and > 0, got {}",
                self.frame_rate
            )));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(MotionError::validation(format!(
                "duration must be finite and >= 0, got {}",
                self.duration
            )));
        }
        Ok(canvas)
    }

    /// Number of frames on the time grid: `ceil(duration * frameRate)`.
    ///
    /// A small epsilon absorbs float noise, so `0.1 s * 30 fps` is 3 frames rather than 4.
    /// Invalid configurations have no frames.
    pub fn total_frames(&self) -> u64 {
        if self.validate().is_err() {
            return 0;
        }
        let exact = self.duration * self.frame_rate;
        (exact - 1e-9).ceil().max(0.0) as u64
    }

    /// Sample time of frame `idx`, in seconds.
    pub fn frame_time(&self, idx: FrameIndex) -> f64 {
        idx.0 as f64 / self.frame_rate
    }

    /// [`RenderConfig::quality`] clamped to `[0, 1]` (`NaN` reads as the default).
    pub fn clamped_quality(&self) -> f64 {
        if self.quality.is_nan() {
            default_quality()
        } else {
            self.quality.clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/config.rs"]
mod tests;
