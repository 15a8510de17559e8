use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, Level};

use keyframe_strip::{config::Config, KeyframePipeline};

#[derive(Parser)]
#[command(
    name = "keyframe-strip",
    version,
    about = "Extract a video's key frames into one side-by-side image",
    long_about = "Keyframe-Strip runs ffmpeg to dump every intra-coded frame of a video, then concatenates the frames horizontally into a single image. Paths come from the configuration file."
)]
struct Cli {
    /// Configuration file (optional; built-in defaults otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting Keyframe-Strip v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(&config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    let pipeline = KeyframePipeline::new(config);
    match pipeline.run().await {
        Ok(report) => {
            info!("Key frame strip saved to: {:?}", report.output);
            Ok(())
        }
        Err(e) => {
            error!("{} failed: {}", e.step(), e);
            Err(anyhow::anyhow!("{} failed: {}", e.step(), e.user_message()))
        }
    }
}
