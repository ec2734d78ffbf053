//! tagsync - audio tag inspection and maintenance CLI

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tagsync_common::config::{load_config, LoggingConfig};
use tagsync_core::services::{library_scanner, LibraryScanner};
use tagsync_core::AudioTagService;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for tagsync
#[derive(Parser, Debug)]
#[command(name = "tagsync")]
#[command(about = "Read, normalize and strip audio file tags")]
#[command(version)]
struct Args {
    /// Config file (overrides TAGSYNC_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "tagsync_core=trace"
    #[arg(long, global = true, env = "TAGSYNC_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the canonical tag of a file as JSON
    Read { file: PathBuf },
    /// Print parsed track info of a file as JSON
    Info { file: PathBuf },
    /// Remove MusicBrainz identifiers from a file
    StripMb { file: PathBuf },
    /// Remove every tag from a file
    StripAll { file: PathBuf },
    /// Embed an image as the file's front cover
    EmbedCover { file: PathBuf, image: PathBuf },
    /// Read every audio file under a folder and summarize
    Scan { folder: PathBuf },
}

fn init_logging(cli_level: Option<&str>, logging: &LoggingConfig) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&logging.level))?,
    };

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn scan(service: AudioTagService, folder: &Path) -> Result<()> {
    let folder = folder.to_path_buf();
    let report = tokio::task::spawn_blocking(move || -> Result<_> {
        let files = LibraryScanner::new(service.registry()).scan(&folder)?;
        Ok(library_scanner::read_all(service.registry(), &files))
    })
    .await
    .context("Scan task panicked")??;

    for (format, count) in &report.by_format {
        println!("{:>10}  {}", format, count);
    }
    println!("{} files, {} unreadable", report.files.len(), report.error_count);
    for file in report.files.iter().filter(|f| !f.tag.is_valid) {
        println!("  unreadable: {}", file.path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    init_logging(args.log_level.as_deref(), &config.logging)?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting tagsync");

    let service = AudioTagService::default();

    match args.command {
        Command::Read { file } => print_json(&service.read_audio_tag(&file))?,
        Command::Info { file } => print_json(&service.read_tags(&file))?,
        Command::StripMb { file } => {
            let track_file = tagsync_common::models::TrackFile::new(file);
            if service.remove_musicbrainz_tags(&track_file)? {
                println!("Removed MusicBrainz tags from {}", track_file.path.display());
            } else {
                println!("No MusicBrainz tags in {}", track_file.path.display());
            }
        }
        Command::StripAll { file } => {
            service.remove_all_tags(&file)?;
            println!("Removed all tags from {}", file.display());
        }
        Command::EmbedCover { file, image } => {
            service
                .embed_cover(&file, &image)
                .with_context(|| format!("Failed to embed {}", image.display()))?;
            println!("Embedded {} into {}", image.display(), file.display());
        }
        Command::Scan { folder } => scan(service, &folder).await?,
    }

    Ok(())
}
