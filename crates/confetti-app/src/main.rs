use std::path::PathBuf;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use confetti_platform::Result;
use confetti_render::{FileImageLoader, FileShaderSource, RecordingDevice};

mod config;
mod driver;

use crate::config::AppConfig;
use crate::driver::FrameDriver;

#[derive(Parser, Debug)]
#[command(name = "confetti")]
#[command(about = "Runs a particle effect through the headless renderer", long_about = None)]
#[command(version)]
struct Args {
    /// App config (TOML); built-in defaults are used when omitted
    config: Option<PathBuf>,

    /// Overrides the number of frames to run
    #[arg(short, long)]
    frames: Option<u32>,
}

fn main() {
    // Init logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let args = Args::parse();
    info!("Confetti starting");
    if let Err(e) = run_app(args) {
        eprintln!("Confetti error: {e}");
        std::process::exit(1);
    }
}

/// Loads the config named on the command line (or the defaults) and runs the
/// headless frame loop.
fn run_app(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading app config");
            AppConfig::load(path)?
        }
        None => AppConfig::default(),
    };
    if let Some(frames) = args.frames {
        config.frames = frames;
    }

    let shaders = FileShaderSource::new(&config.shader_dir);
    let mut driver = FrameDriver::new(&config, RecordingDevice::new(), &shaders, &FileImageLoader)?;
    let stats = driver.run(config.frames, config.frame_dt)?;
    info!(
        frames = stats.frames,
        quads = stats.quads,
        alive = driver.system().alive_count(),
        renderer = ?driver.renderer().state(),
        "Confetti finished"
    );
    Ok(())
}
