use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::assets::source::AssetSource;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::png::PngSequenceSink;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::export::config::{ExportFormat, RenderConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{MotionError, MotionResult};
use crate::render::frame::{FrameRenderer, Scene};
use crate::scene::project::{FontRef, Project};

/// Export state machine.
///
/// `Idle -> Preloading -> Rendering -> Encoding -> Completed`; `Error` and `Cancelled` are terminal
/// and reachable from any non-terminal state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportStatus {
    /// Nothing has started yet.
    #[default]
    Idle,
    /// Decoding image assets.
    Preloading,
    /// Rendering frames and feeding the sink.
    Rendering,
    /// Flushing the sink after the last frame.
    Encoding,
    /// Output is complete.
    Completed,
    /// The export failed.
    Error,
    /// The export was cancelled.
    Cancelled,
}

impl ExportStatus {
    /// `true` for `Completed`, `Error` and `Cancelled`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error | Self::Cancelled)
    }
}

/// Progress event emitted on every state change and after every frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportProgress {
    /// Current state.
    pub status: ExportStatus,
    /// Frames rendered so far.
    pub current_frame: u64,
    /// Frames on the export's time grid.
    pub total_frames: u64,
    /// `current_frame / total_frames` in percent.
    pub percentage: f64,
    /// Seconds left, extrapolated linearly from the frame rate observed so far.
    pub estimated_time_remaining: Option<f64>,
    /// Human-readable detail.
    pub message: String,
}

/// Shared flag used to stop a running export from another thread or callback.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The driver stops before the next frame.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// `true` once `cancel` was called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Encoder knobs for video output.
#[derive(Clone, Debug)]
pub struct EncoderOptions {
    /// Write the video to this file instead of returning it in memory.
    pub out_path: Option<PathBuf>,
    /// Overwrite `out_path` if it exists.
    pub overwrite: bool,
    /// Matte color used to flatten alpha (straight RGBA8).
    pub bg_rgba: [u8; 4],
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            out_path: None,
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// Driver-side options that are not part of the document.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Yield the thread after this many frames; `0` never yields.
    pub yield_every: u32,
    /// Video encoder settings.
    pub encoder: EncoderOptions,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            yield_every: 1,
            encoder: EncoderOptions::default(),
        }
    }
}

/// Result of [`export_project`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutput {
    /// One PNG per frame, in frame order.
    Sequence(Vec<Vec<u8>>),
    /// Encoded video bytes.
    Video(Vec<u8>),
    /// The video was written to this path.
    File(PathBuf),
}

/// Renders a scene frame by frame into a [`FrameSink`].
///
/// Every run builds its own [`FrameRenderer`], so the image cache never outlives the export and
/// never leaks into a preview renderer.
#[derive(Debug, Default)]
pub struct ExportDriver {
    options: ExportOptions,
    cancel: CancelToken,
    status: ExportStatus,
}

struct Progress<'p> {
    total: u64,
    done: u64,
    started: Instant,
    on_progress: &'p mut dyn FnMut(&ExportProgress),
}

impl Progress<'_> {
    fn emit(&mut self, status: ExportStatus, done: u64, message: String) {
        self.done = done;
        let percentage = if self.total == 0 {
            if status == ExportStatus::Completed {
                100.0
            } else {
                0.0
            }
        } else {
            done as f64 / self.total as f64 * 100.0
        };
        let estimated_time_remaining = (done > 0).then(|| {
            let per_frame = self.started.elapsed().as_secs_f64() / done as f64;
            per_frame * self.total.saturating_sub(done) as f64
        });
        (self.on_progress)(&ExportProgress {
            status,
            current_frame: done,
            total_frames: self.total,
            percentage,
            estimated_time_remaining,
            message,
        });
    }
}

impl ExportDriver {
    /// Driver with `options` and its own cancel token.
    pub fn new(options: ExportOptions) -> Self {
        Self {
            options,
            cancel: CancelToken::new(),
            status: ExportStatus::Idle,
        }
    }

    /// Use `token` for cancellation instead of the driver's own.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this driver's runs.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// State reached by the last run.
    pub fn status(&self) -> ExportStatus {
        self.status
    }

    /// Driver options.
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Render every frame of `config`'s time grid into `sink`.
    ///
    /// Images are decoded before the first frame and a failed decode aborts the export. On error
    /// or cancellation the sink is aborted so no partial output escapes; cancellation returns
    /// [`MotionError::Cancelled`].
    #[tracing::instrument(
        skip_all,
        fields(
            width = config.width,
            height = config.height,
            frame_rate = config.frame_rate,
            format = ?config.format,
        )
    )]
    pub fn run(
        &mut self,
        config: &RenderConfig,
        scene: &Scene<'_>,
        fonts: &[FontRef],
        source: &dyn AssetSource,
        sink: &mut dyn FrameSink,
        on_progress: &mut dyn FnMut(&ExportProgress),
    ) -> MotionResult<()> {
        self.status = ExportStatus::Idle;
        let mut progress = Progress {
            total: config.total_frames(),
            done: 0,
            started: Instant::now(),
            on_progress,
        };

        let result = self.run_inner(config, scene, fonts, source, sink, &mut progress);
        match &result {
            Ok(()) => {}
            Err(MotionError::Cancelled) => {
                sink.abort();
                self.status = ExportStatus::Cancelled;
                tracing::info!("export cancelled");
                let done = progress.done;
                progress.emit(ExportStatus::Cancelled, done, "export cancelled".to_owned());
            }
            Err(e) => {
                sink.abort();
                self.status = ExportStatus::Error;
                tracing::error!(error = %e, "export failed");
                let done = progress.done;
                progress.emit(ExportStatus::Error, done, e.to_string());
            }
        }
        result
    }

    fn run_inner(
        &mut self,
        config: &RenderConfig,
        scene: &Scene<'_>,
        fonts: &[FontRef],
        source: &dyn AssetSource,
        sink: &mut dyn FrameSink,
        progress: &mut Progress<'_>,
    ) -> MotionResult<()> {
        let canvas = config.validate()?;
        let total = progress.total;
        if total == 0 && config.format.is_video() {
            return Err(MotionError::validation(
                "video export needs at least one frame (duration is zero)",
            ));
        }
        tracing::info!(total_frames = total, "export started");

        self.status = ExportStatus::Preloading;
        progress.emit(self.status, 0, "preloading assets".to_owned());
        let mut renderer = FrameRenderer::new(canvas)?;
        renderer.load_fonts(fonts, source)?;
        renderer.preload(scene.elements, source)?;
        self.check_cancelled()?;

        sink.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            frame_rate: config.frame_rate,
            quality: config.clamped_quality(),
            total_frames: total,
        })?;

        self.status = ExportStatus::Rendering;
        progress.emit(self.status, 0, format!("rendering {total} frames"));
        for i in 0..total {
            self.check_cancelled()?;
            let idx = FrameIndex(i);
            let time = config.frame_time(idx);
            let frame = renderer.render_frame(scene, time)?;
            sink.push_frame(idx, &frame)?;
            tracing::debug!(frame = i, time, "frame rendered");
            progress.emit(self.status, i + 1, format!("rendered frame {}/{total}", i + 1));

            let every = u64::from(self.options.yield_every);
            if every > 0 && (i + 1).is_multiple_of(every) {
                std::thread::yield_now();
            }
        }
        self.check_cancelled()?;

        self.status = ExportStatus::Encoding;
        progress.emit(self.status, total, "finalizing output".to_owned());
        sink.end()?;
        renderer.cleanup();

        self.status = ExportStatus::Completed;
        tracing::info!(
            frames = total,
            elapsed_ms = progress.started.elapsed().as_millis() as u64,
            "export completed"
        );
        progress.emit(self.status, total, "export completed".to_owned());
        Ok(())
    }

    fn check_cancelled(&self) -> MotionResult<()> {
        if self.cancel.is_cancelled() {
            Err(MotionError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Export `project` in its configured format.
///
/// `png-sequence` collects one PNG per frame; `webm` and `gif` stream through the system ffmpeg,
/// into memory or into `options.encoder.out_path`.
pub fn export_project(
    project: &Project,
    source: &dyn AssetSource,
    driver: &mut ExportDriver,
    on_progress: &mut dyn FnMut(&ExportProgress),
) -> MotionResult<ExportOutput> {
    let scene = project.scene();
    match project.config.format {
        ExportFormat::PngSequence => {
            let mut sink = PngSequenceSink::new();
            driver.run(
                &project.config,
                &scene,
                &project.fonts,
                source,
                &mut sink,
                on_progress,
            )?;
            Ok(ExportOutput::Sequence(sink.take_frames()))
        }
        format @ (ExportFormat::Webm | ExportFormat::Gif) => {
            let enc = &driver.options().encoder;
            let opts = FfmpegSinkOpts {
                format,
                out_path: enc.out_path.clone(),
                overwrite: enc.overwrite,
                bg_rgba: enc.bg_rgba,
                binary: None,
            };
            let mut sink = FfmpegSink::new(opts.clone());
            driver.run(
                &project.config,
                &scene,
                &project.fonts,
                source,
                &mut sink,
                on_progress,
            )?;
            match opts.out_path {
                Some(path) => Ok(ExportOutput::File(path)),
                None => sink
                    .take_output()
                    .map(ExportOutput::Video)
                    .ok_or_else(|| MotionError::encode("ffmpeg produced no output")),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/driver.rs"]
mod tests;
