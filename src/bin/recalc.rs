use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "recalc", version, about = "Render the recalculate-on-change explainer")]
struct Cli {
    /// Log more (repeat for trace output).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the whole story as an MP4 (requires `ffmpeg` on PATH) or a PNG sequence.
    Render(RenderArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Print the graph layout and colors as JSON.
    Graph(GraphArgs),
}

#[derive(Args, Debug, Default)]
struct ConfigArgs {
    /// Render configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Frames per second (integer).
    #[arg(long)]
    fps: Option<u32>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Output MP4 path.
    #[arg(long, conflicts_with = "frames_dir", required_unless_present = "frames_dir")]
    out: Option<PathBuf>,

    /// Write numbered PNG frames into this directory instead of an MP4.
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args, Debug)]
struct GraphArgs {
    /// Report colors after the whole timeline has played.
    #[arg(long)]
    at_end: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Graph(args) => cmd_graph(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<recalc::RenderConfig> {
    let mut cfg = match &args.config {
        Some(path) => recalc::RenderConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => recalc::RenderConfig::default(),
    };
    if let Some(width) = args.width {
        cfg.canvas.width = width;
    }
    if let Some(height) = args.height {
        cfg.canvas.height = height;
    }
    if let Some(fps) = args.fps {
        cfg.fps = recalc::Fps::new(fps, 1)?;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    let bg_rgba = cfg.background_rgba8();
    let session = recalc::RenderSession::new(cfg)?;

    let (stats, wrote) = match (args.out, args.frames_dir) {
        (_, Some(dir)) => {
            let mut sink = recalc::PngSequenceSink::new(&dir, bg_rgba);
            (session.render_all(&mut sink)?, dir)
        }
        (Some(out), None) => {
            if !recalc::is_ffmpeg_on_path() {
                anyhow::bail!("ffmpeg not found on PATH; use --frames-dir to write PNG frames");
            }
            let opts = recalc::FfmpegSinkOpts {
                bg_rgba,
                ..recalc::FfmpegSinkOpts::new(&out)
            };
            let mut sink = recalc::FfmpegSink::new(opts);
            (session.render_all(&mut sink)?, out)
        }
        (None, None) => anyhow::bail!("pass --out or --frames-dir"),
    };

    eprintln!(
        "wrote {} ({} frames, {:.2}s)",
        wrote.display(),
        stats.frames,
        stats.duration_secs
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    let bg_rgba = cfg.background_rgba8();
    let session = recalc::RenderSession::new(cfg)?;
    let frame = session.render_frame(recalc::FrameIndex(args.frame))?;

    recalc::ensure_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.flattened(bg_rgba),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_graph(args: GraphArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    let fps = cfg.fps;
    let session = recalc::RenderSession::new(cfg)?;
    let mut story = session.story()?;

    if args.at_end {
        let mut timeline = recalc::Timeline::new(story.script()?, fps);
        timeline.run_to_end(&mut story.scene)?;
    }

    let snapshot = story.graph.snapshot(&story.scene)?;
    for warning in &snapshot.warnings {
        tracing::warn!("{warning}");
    }
    let json = serde_json::to_string_pretty(&snapshot).context("serialize graph snapshot")?;
    println!("{json}");
    Ok(())
}
