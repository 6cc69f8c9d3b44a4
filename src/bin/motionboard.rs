use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "motionboard", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Export the whole animation (webm/gif need `ffmpeg` on PATH).
    Export(ExportArgs),
    /// Print the resolved element list at a time as JSON.
    Resolve(ResolveArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Time in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Directory image and font paths are relative to (defaults to the project's directory).
    #[arg(long)]
    assets: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output video file, or output directory for png-sequence.
    #[arg(long)]
    out: PathBuf,

    /// Override the project's output format.
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// Matte color used to flatten alpha for video output.
    #[arg(long, default_value = "#000000")]
    bg: String,

    /// Directory image and font paths are relative to (defaults to the project's directory).
    #[arg(long)]
    assets: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ResolveArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Time in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Webm,
    Gif,
    PngSequence,
}

impl From<FormatChoice> for motionboard::ExportFormat {
    fn from(v: FormatChoice) -> Self {
        match v {
            FormatChoice::Webm => Self::Webm,
            FormatChoice::Gif => Self::Gif,
            FormatChoice::PngSequence => Self::PngSequence,
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Export(args) => cmd_export(args),
        Command::Resolve(args) => cmd_resolve(args),
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn assets_root(in_path: &Path, explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| {
        in_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf()
    })
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let project = motionboard::Project::from_path(&args.in_path)?;
    let canvas = project.config.validate()?;
    let source = motionboard::FsAssetSource::new(assets_root(&args.in_path, args.assets));

    let mut renderer = motionboard::FrameRenderer::new(canvas)?;
    renderer.load_fonts(&project.fonts, &source)?;
    renderer.preload(&project.elements, &source)?;
    let frame = renderer.render_frame(&project.scene(), args.time)?;

    let png = motionboard::encode_png(&frame)?;
    motionboard::ensure_parent_dir(&args.out)?;
    std::fs::write(&args.out, png).with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut project = motionboard::Project::from_path(&args.in_path)?;
    if let Some(format) = args.format {
        project.config.format = format.into();
    }
    let bg_rgba = motionboard::parse_paint(&args.bg)
        .with_context(|| format!("invalid --bg color '{}'", args.bg))?;
    let source = motionboard::FsAssetSource::new(assets_root(&args.in_path, args.assets));

    let video_out = project.config.format.is_video().then(|| args.out.clone());
    let mut driver = motionboard::ExportDriver::new(motionboard::ExportOptions {
        yield_every: 0,
        encoder: motionboard::EncoderOptions {
            out_path: video_out,
            overwrite: true,
            bg_rgba,
        },
    });

    let mut last_percent = -1i64;
    let mut on_progress = |p: &motionboard::ExportProgress| {
        let percent = p.percentage.floor() as i64;
        if p.status != motionboard::ExportStatus::Rendering || percent / 10 != last_percent / 10 {
            tracing::info!(
                status = ?p.status,
                frame = p.current_frame,
                total = p.total_frames,
                eta_s = p.estimated_time_remaining.unwrap_or(0.0),
                "{}",
                p.message
            );
        }
        last_percent = percent;
    };

    match motionboard::export_project(&project, &source, &mut driver, &mut on_progress)? {
        motionboard::ExportOutput::Sequence(frames) => {
            std::fs::create_dir_all(&args.out)
                .with_context(|| format!("create output dir '{}'", args.out.display()))?;
            for (i, png) in frames.iter().enumerate() {
                let path = args.out.join(format!("frame_{i:05}.png"));
                std::fs::write(&path, png)
                    .with_context(|| format!("write png '{}'", path.display()))?;
            }
            eprintln!("wrote {} frames to {}", frames.len(), args.out.display());
        }
        motionboard::ExportOutput::Video(bytes) => {
            motionboard::ensure_parent_dir(&args.out)?;
            std::fs::write(&args.out, bytes)
                .with_context(|| format!("write video '{}'", args.out.display()))?;
            eprintln!("wrote {}", args.out.display());
        }
        motionboard::ExportOutput::File(path) => eprintln!("wrote {}", path.display()),
    }
    Ok(())
}

fn cmd_resolve(args: ResolveArgs) -> anyhow::Result<()> {
    let project = motionboard::Project::from_path(&args.in_path)?;
    let resolved = motionboard::resolve_scene(&project.elements, &project.animations, args.time);
    let json = serde_json::to_string_pretty(&resolved).context("serialize resolved elements")?;
    println!("{json}");
    Ok(())
}
