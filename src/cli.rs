use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path (defaults to ./config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll the board forever, processing one card per cycle
    Watch {
        /// Seconds between polls, overriding the config file
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Run a single poll cycle and report what happened
    Once,

    /// Produce transcript, translation and subtitled video for a local audio file
    Process {
        /// Input audio file
        #[arg(short, long)]
        input: PathBuf,

        /// Workspace directory for outputs, overriding the config file
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Check that ffmpeg, ffprobe and whisper can be run
    Check,
}
