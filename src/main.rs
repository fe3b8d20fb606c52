//! Boardsub - Trello-driven audio subtitling
//!
//! Entry point: loads the configuration, sets up logging and runs the
//! requested command against the board or a local file.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{Level, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use boardsub::cli::{Args, Commands};
use boardsub::config::Config;
use boardsub::error::BoardsubError;
use boardsub::workflow::Workflow;
use boardsub::workspace::Workspace;

const DEFAULT_CONFIG: &str = "config.toml";
const LOG_FILE: &str = "boardsub.log";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let mut config = Config::from_file(&config_path)?;

    if let Commands::Process { output_dir: Some(dir), .. } = &args.command {
        config.workspace.root = dir.clone();
    }
    if let Commands::Watch { interval: Some(secs) } = &args.command {
        config.poll.interval_secs = *secs;
    }

    let workspace = Workspace::new(&config.workspace.root);
    workspace.prepare().await?;

    let _guard = setup_logging(args.verbose, &workspace.log_dir())?;
    info!("Starting boardsub with {}", config_path.display());

    let workflow = Workflow::new(config)?;

    match args.command {
        Commands::Watch { .. } => {
            tokio::select! {
                result = workflow.run_forever() => result?,
                _ = tokio::signal::ctrl_c() => info!("Interrupted, stopping"),
            }
        }
        Commands::Once => {
            let outcome = workflow.run_cycle().await?;
            println!("{}", outcome);
        }
        Commands::Process { input, .. } => {
            if !input.exists() {
                return Err(BoardsubError::FileNotFound(input.display().to_string()).into());
            }

            let outputs = workflow.generator().generate(&input, workflow.workspace()).await?;
            println!("Transcript:  {}", outputs.transcript.display());
            println!("Translation: {}", outputs.translation.display());
            println!("Video:       {}", outputs.video.display());
        }
        Commands::Check => {
            let generator = workflow.generator();
            let mut healthy = true;

            match generator.media().check_availability().await {
                Ok(()) => println!("ffmpeg/ffprobe: ok"),
                Err(e) => {
                    healthy = false;
                    println!("ffmpeg/ffprobe: {}", e);
                }
            }
            match generator.transcriber().check_availability().await {
                Ok(()) => println!("whisper: ok"),
                Err(e) => {
                    healthy = false;
                    println!("whisper: {}", e);
                }
            }

            if !healthy {
                warn!("Some external tools are unavailable");
                anyhow::bail!("external tool check failed");
            }
        }
    }

    Ok(())
}

/// Log to the console and to a daily-rotated file under the workspace
fn setup_logging(verbose: bool, log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = rolling::daily(log_dir, LOG_FILE);
    let (non_blocking_file, guard) = non_blocking(file_appender);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join(LOG_FILE).display()
    );

    Ok(guard)
}
