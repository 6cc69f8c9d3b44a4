use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::export::config::ExportFormat;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{MotionError, MotionResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGBA;

/// Environment variable overriding the `ffmpeg` binary.
pub const FFMPEG_ENV: &str = "MOTIONBOARD_FFMPEG";

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Container to produce; must be a video format.
    pub format: ExportFormat,
    /// Write to this file instead of collecting the output in memory.
    pub out_path: Option<PathBuf>,
    /// Overwrite `out_path` if it exists.
    pub overwrite: bool,
    /// Matte color used to flatten alpha (straight RGBA8).
    pub bg_rgba: [u8; 4],
    /// Binary to spawn; `None` uses [`ffmpeg_binary`].
    pub binary: Option<PathBuf>,
}

impl FfmpegSinkOpts {
    /// Collect `format` output in memory, flattened over black.
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            out_path: None,
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
            binary: None,
        }
    }

    /// Write to `path` instead of memory.
    pub fn with_out_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.out_path = Some(path.into());
        self
    }

    /// Spawn `bin` instead of the configured ffmpeg.
    pub fn with_binary(mut self, bin: impl Into<PathBuf>) -> Self {
        self.binary = Some(bin.into());
        self
    }
}

type Drain = JoinHandle<std::io::Result<Vec<u8>>>;

/// Sink that spawns the system `ffmpeg` and streams raw frames to its stdin.
///
/// With no output path the encoded container is read back from ffmpeg's stdout.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_drain: Option<Drain>,
    stderr_drain: Option<Drain>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    output: Option<Vec<u8>>,
    // Set once ffmpeg may have started writing `out_path`; cleared on success.
    partial_file: Option<PathBuf>,
}

impl FfmpegSink {
    /// Create a sink; nothing is spawned until `begin`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stdout_drain: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
            output: None,
            partial_file: None,
        }
    }

    /// Take the encoded bytes collected from stdout after a successful `end`.
    pub fn take_output(&mut self) -> Option<Vec<u8>> {
        self.output.take()
    }

    fn kill(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        for drain in [self.stdout_drain.take(), self.stderr_drain.take()]
            .into_iter()
            .flatten()
        {
            let _ = drain.join();
        }
        self.cfg = None;
        self.output = None;
        self.discard_partial_file();
    }

    fn discard_partial_file(&mut self) {
        let Some(path) = self.partial_file.take() else {
            return;
        };
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::debug!(path = %path.display(), "removed partial output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove partial output")
            }
        }
    }
}

/// Crf for libvpx-vp9 from a `[0, 1]` quality: 1.0 maps to 10, 0.0 to 63.
pub(crate) fn vp9_crf(quality: f64) -> u32 {
    let q = if quality.is_finite() {
        quality.clamp(0.0, 1.0)
    } else {
        0.8
    };
    (63.0 - q * 53.0).round() as u32
}

fn codec_args(format: ExportFormat, quality: f64) -> MotionResult<Vec<String>> {
    let args: Vec<String> = match format {
        ExportFormat::Webm => vec![
            "-c:v".into(),
            "libvpx-vp9".into(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            // yuv420p needs even dimensions.
            "-vf".into(),
            "pad=ceil(iw/2)*2:ceil(ih/2)*2".into(),
            "-crf".into(),
            vp9_crf(quality).to_string(),
            "-b:v".into(),
            "0".into(),
            "-f".into(),
            "webm".into(),
        ],
        ExportFormat::Gif => vec![
            "-vf".into(),
            "split[a][b];[a]palettegen[p];[b][p]paletteuse".into(),
            "-loop".into(),
            "0".into(),
            "-f".into(),
            "gif".into(),
        ],
        ExportFormat::PngSequence => {
            return Err(MotionError::validation(
                "ffmpeg sink only encodes video formats (webm, gif)",
            ));
        }
    };
    Ok(args)
}

fn spawn_drain<R: Read + Send + 'static>(mut r: R) -> Drain {
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        r.read_to_end(&mut bytes)?;
        Ok(bytes)
    })
}

fn join_drain(drain: Option<Drain>, what: &str) -> MotionResult<Vec<u8>> {
    match drain {
        Some(handle) => handle
            .join()
            .map_err(|_| MotionError::encode(format!("ffmpeg {what} drain thread panicked")))?
            .map_err(|e| MotionError::encode(format!("ffmpeg {what} read failed: {e}"))),
        None => Ok(Vec::new()),
    }
}

/// Wait for ffmpeg and return its stdout; a non-zero exit reports stderr.
fn wait_for_exit(
    mut child: Child,
    stdout_drain: Option<Drain>,
    stderr_drain: Option<Drain>,
) -> MotionResult<Vec<u8>> {
    let status = child
        .wait()
        .map_err(|e| MotionError::encode(format!("failed to wait for ffmpeg to finish: {e}")))?;
    let stdout_bytes = join_drain(stdout_drain, "stdout")?;
    let stderr_bytes = join_drain(stderr_drain, "stderr")?;

    if !status.success() {
        let stderr = String::from_utf8_lossy(&stderr_bytes);
        return Err(MotionError::encode(format!(
            "ffmpeg exited with status {}: {}",
            status,
            stderr.trim()
        )));
    }
    Ok(stdout_bytes)
}

impl FrameSink for FfmpegSink {
    #[tracing::instrument(skip_all, fields(format = ?self.opts.format))]
    fn begin(&mut self, cfg: SinkConfig) -> MotionResult<()> {
        if !cfg.frame_rate.is_finite() || cfg.frame_rate <= 0.0 {
            return Err(MotionError::validation("frame rate must be finite and > 0"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(MotionError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        let codec = codec_args(self.opts.format, cfg.quality)?;

        if let Some(path) = &self.opts.out_path {
            ensure_parent_dir(path)?;
            if !self.opts.overwrite && path.exists() {
                return Err(MotionError::validation(format!(
                    "output file '{}' already exists",
                    path.display()
                )));
            }
        }

        let bin = self.opts.binary.clone().unwrap_or_else(ffmpeg_binary);
        let mut cmd = Command::new(&bin);
        cmd.stdin(Stdio::piped()).stderr(Stdio::piped());
        cmd.stdout(if self.opts.out_path.is_some() {
            Stdio::null()
        } else {
            Stdio::piped()
        });
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });

        // Input: raw RGBA8 frames, flattened over the matte in push_frame.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &format!("{}", cfg.frame_rate),
            "-i",
            "pipe:0",
            "-an",
        ]);
        cmd.args(&codec);
        match &self.opts.out_path {
            Some(path) => cmd.arg(path),
            None => cmd.arg("pipe:1"),
        };

        let mut child = cmd.spawn().map_err(|e| {
            MotionError::encode(format!(
                "failed to spawn '{}' (is ffmpeg installed? set {FFMPEG_ENV} to override): {e}",
                bin.display()
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| MotionError::encode("failed to open ffmpeg stdin"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MotionError::encode("failed to open ffmpeg stderr"))?;
        self.stderr_drain = Some(spawn_drain(stderr));
        self.stdout_drain = child.stdout.take().map(spawn_drain);

        tracing::debug!(bin = %bin.display(), "spawned ffmpeg");
        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.partial_file = self.opts.out_path.clone();
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.output = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> MotionResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| MotionError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(MotionError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(MotionError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.premultiplied {
            flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.opts.bg_rgba)?;
        } else {
            let mut premul = frame.data.clone();
            crate::foundation::math::premultiply_rgba8_in_place(&mut premul);
            flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &premul, self.opts.bg_rgba)?;
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(MotionError::encode("ffmpeg sink is already finalized"));
        };
        use std::io::Write as _;
        stdin
            .write_all(&self.scratch)
            .map_err(|e| MotionError::encode(format!("failed to write frame to ffmpeg stdin: {e}")))
    }

    fn end(&mut self) -> MotionResult<()> {
        drop(self.stdin.take());
        let child = self
            .child
            .take()
            .ok_or_else(|| MotionError::encode("ffmpeg sink not started"))?;

        let finished = wait_for_exit(child, self.stdout_drain.take(), self.stderr_drain.take());
        let stdout_bytes = match finished {
            Ok(bytes) => bytes,
            Err(e) => {
                self.cfg = None;
                self.discard_partial_file();
                return Err(e);
            }
        };

        self.partial_file = None;
        self.cfg = None;
        if self.opts.out_path.is_none() {
            self.output = Some(stdout_bytes);
        }
        Ok(())
    }

    fn abort(&mut self) {
        self.kill();
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() || self.partial_file.is_some() {
            self.kill();
        }
    }
}

/// Flatten premultiplied RGBA8 over an opaque matte.
pub(crate) fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> MotionResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(MotionError::validation(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

/// Binary to invoke: `$MOTIONBOARD_FFMPEG`, else `ffmpeg` on `PATH`.
pub fn ffmpeg_binary() -> PathBuf {
    std::env::var_os(FFMPEG_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("ffmpeg"))
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> MotionResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when the configured `ffmpeg` can be invoked.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new(ffmpeg_binary())
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
