//! ShortClip CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sclip_media::{check_ffmpeg, check_ffprobe, remux_sweep, ExtractedWindow};
use sclip_models::timestamp::parse_timestamp;
use sclip_worker::{process_clip, run_batch, run_batch_upload, PipelineConfig};

#[derive(Parser)]
#[command(name = "sclip", about = "Short-form clip production pipeline", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Produce a single clip from a source video.
    Clip {
        /// Source video file.
        #[arg(long)]
        input: PathBuf,
        /// Output directory for the numbered clip files.
        #[arg(long, default_value = "clips")]
        output_dir: PathBuf,
        /// Pin the window start (HH:MM:SS, MM:SS or seconds) instead of
        /// drawing a random one. Requires --length.
        #[arg(long, requires = "length")]
        start: Option<String>,
        /// Pin the window length in seconds.
        #[arg(long, requires = "start")]
        length: Option<f64>,
    },
    /// Process every new source under the input folders sequentially.
    Batch {
        /// Root containing `*Input` folders.
        #[arg(long, default_value = ".")]
        input_root: PathBuf,
        /// Root for produced clips.
        #[arg(long, default_value = "clips")]
        output_root: PathBuf,
    },
    /// Remux MKV sources to MP4 in place.
    Remux {
        /// Directory to sweep.
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Maximum folder depth.
        #[arg(long, default_value_t = 3)]
        depth: usize,
    },
    /// Upload finished clips with their metadata sidecars.
    Upload {
        /// Clips directory holding per-source subfolders.
        #[arg(long)]
        clips_dir: PathBuf,
        /// Number of clips to upload this run.
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let cli = Cli::parse();

    if let Err(e) = check_ffmpeg().and_then(|_| check_ffprobe()) {
        error!("{}", e);
        std::process::exit(1);
    }

    let config = PipelineConfig::from_env();

    let result = run(cli.command, &config).await;
    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command, config: &PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Clip {
            input,
            output_dir,
            start,
            length,
        } => {
            let window = match (start, length) {
                (Some(start), Some(length)) => Some(ExtractedWindow {
                    start: parse_timestamp(&start)?,
                    length,
                }),
                _ => None,
            };
            let outcome = process_clip(&input, &output_dir, window, config).await?;
            info!(
                index = outcome.index,
                path = %outcome.final_path.display(),
                "Done"
            );
        }
        Command::Batch {
            input_root,
            output_root,
        } => {
            let report = run_batch(&input_root, &output_root, config).await?;
            info!(
                folders = report.folders,
                processed = report.processed,
                failed = report.failed,
                "Batch complete"
            );
            if report.processed == 0 && report.failed > 0 {
                return Err("every clip in the batch failed".into());
            }
        }
        Command::Remux { root, depth } => {
            let remuxed = remux_sweep(&root, depth).await?;
            info!(count = remuxed.len(), "Remux sweep complete");
        }
        Command::Upload { clips_dir, count } => {
            let sent = run_batch_upload(&clips_dir, count, config).await?;
            info!(uploaded = sent, "Upload run complete");
        }
    }
    Ok(())
}
