use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

use slidereel::{Config, FfmpegMuxer, RunPaths, RunRequest, WorkArea};

#[derive(Parser, Debug)]
#[command(name = "slidereel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (`POST /generate`, `GET /`).
    Serve(ServeArgs),
    /// Build a slideshow from a local image folder (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct ServeArgs {
    #[command(flatten)]
    config: Config,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Folder of images; played in filename order.
    #[arg(long)]
    images: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Seconds each image stays on screen.
    #[arg(long, default_value = slidereel::DEFAULT_SWITCH_TIME)]
    switch_time: String,

    /// Optional soundtrack, cut to the video's length.
    #[arg(long)]
    audio: Option<PathBuf>,

    /// `ffmpeg` executable.
    #[arg(long, env = "SLIDEREEL_FFMPEG", default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Scratch root for intermediate files (defaults to the system temp dir).
    #[arg(long, env = "SLIDEREEL_WORK_ROOT")]
    work_root: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve(args) => cmd_serve(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slidereel=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    runtime.block_on(slidereel::server::serve(args.config))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let root = args
        .work_root
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("slidereel"));
    let work = WorkArea::create(&root)?;
    let paths = RunPaths {
        images_dir: args.images.clone(),
        ..RunPaths::in_work_area(&work)
    };

    let final_path = slidereel::run(
        &RunRequest {
            paths: &paths,
            switch_time: &args.switch_time,
            audio: args.audio.as_deref(),
            ffmpeg: &args.ffmpeg,
        },
        &FfmpegMuxer::new(args.ffmpeg.clone()),
    )?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::copy(&final_path, &args.out)
        .with_context(|| format!("write video '{}'", args.out.display()))?;
    work.close()?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
