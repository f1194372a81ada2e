// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "booth")]
#[command(about = "Effects camera booth — live capture with baked-in visual effects")]
#[command(version)]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available effects
    Effects,

    /// Take a photo
    Photo {
        /// Effect id to bake in (from 'booth effects')
        #[arg(short, long)]
        effect: Option<String>,

        /// Output directory (default: ~/Pictures/booth)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Image file streamed as the capture source instead of the
        /// synthetic pattern
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Caption stored with the capture
        #[arg(short, long)]
        caption: Option<String>,
    },

    /// Record a video
    Video {
        /// Effect id to bake in (from 'booth effects')
        #[arg(short, long)]
        effect: Option<String>,

        /// Recording duration in seconds (capped at 30)
        #[arg(short, long, default_value = "5")]
        duration: u64,

        /// Output directory (default: ~/Videos/booth)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Image file streamed as the capture source instead of the
        /// synthetic pattern
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Caption stored with the capture
        #[arg(short, long)]
        caption: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=booth=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Effects => cli::list_effects(),
        Commands::Photo {
            effect,
            output,
            source,
            caption,
        } => cli::take_photo(effect, output, source, caption),
        Commands::Video {
            effect,
            duration,
            output,
            source,
            caption,
        } => cli::record_video(effect, duration, output, source, caption),
    }
}
