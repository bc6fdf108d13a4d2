//! WebVTT HLS segmenter
//!
//! Splits a WebVTT file into fixed-length HLS subtitle segments and writes
//! them next to a VOD playlist referencing them.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webvtt_segment::config::AppConfig;
use webvtt_segment::config_file::ConfigFile;
use webvtt_segment::error::{Result, VttError};
use webvtt_segment::playlist::HlsPackage;
use webvtt_segment::segment::segment_cues;
use webvtt_segment::subtitle::parse;

/// Application name
const APP_NAME: &str = "webvtt-segment";

/// Segment writes logged at each end of the list
const PRINT_RANGE: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "webvtt-segment")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// WebVTT file to segment
    input: PathBuf,

    /// Target duration for each segment in seconds [default: 10]
    #[arg(short = 't', long, allow_negative_numbers = true)]
    target_duration: Option<f64>,

    /// Output directory for segments and playlist [default: ./]
    #[arg(short = 'o', long = "output-directory")]
    output_directory: Option<PathBuf>,

    /// Name for the generated m3u8 playlist [default: playlist.m3u8]
    #[arg(short = 'p', long)]
    playlist_filename: Option<String>,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Chatty output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Errors only
    #[arg(short = 's', long)]
    silent: bool,

    /// MPEG-TS time mapped to local time zero in every segment [default: 900000]
    #[arg(long)]
    mpegts_offset: Option<u64>,

    /// Print the segmentation as JSON instead of writing files
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = load_config(&args);
    let level = log_level(&args, config.as_ref().ok());
    init_logging(&level);

    let result = config.and_then(|config| run(&args, &config));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Merge the config file, if any, with command line overrides
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => ConfigFile::from_file(path)?.into_app_config(),
        None => AppConfig::default(),
    };

    if let Some(secs) = args.target_duration {
        config.segment.target_duration_secs = secs;
    }
    if let Some(offset) = args.mpegts_offset {
        config.segment.mpegts_offset = offset;
    }
    if let Some(dir) = &args.output_directory {
        config.output.output_dir = dir.clone();
    }
    if let Some(name) = &args.playlist_filename {
        config.output.playlist_filename = name.clone();
    }

    config.validate()?;
    Ok(config)
}

fn log_level(args: &Args, config: Option<&AppConfig>) -> String {
    if args.silent {
        "error".to_string()
    } else if args.verbose {
        "debug".to_string()
    } else {
        config
            .map(|c| c.log_level.clone())
            .unwrap_or_else(|| "info".to_string())
    }
}

/// Initialize logging with tracing
fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("webvtt_segment={}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(args: &Args, config: &AppConfig) -> Result<()> {
    tracing::debug!(
        "{} v{}: output directory {}, target duration {}",
        APP_NAME,
        env!("CARGO_PKG_VERSION"),
        config.output.output_dir.display(),
        config.segment.target_duration_secs
    );

    let content = read_input(&args.input)?;

    let vtt = parse(&content, config.parser.into())?;
    if !vtt.valid {
        tracing::warn!(
            errors = vtt.errors.len(),
            "Input has malformed cues, segmenting the {} valid ones",
            vtt.cues.len()
        );
    }

    let segments = segment_cues(&vtt.cues, config.segment.target_duration_secs)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&segments)?);
        return Ok(());
    }

    let package = HlsPackage::from_segments(&segments, config.segment.mpegts_offset);

    std::fs::create_dir_all(&config.output.output_dir)?;
    write_playlist(&package, &config.output.playlist_path())?;
    write_segments(&package, &config.output.output_dir)?;

    Ok(())
}

/// Read the input as UTF-8, dropping a leading byte order mark
fn read_input(path: &Path) -> Result<String> {
    tracing::debug!("Trying to read {}", path.display());

    if !path.is_file() {
        return Err(VttError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a file", path.display()),
        )));
    }

    let content = std::fs::read_to_string(path)?;
    Ok(match content.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

fn write_playlist(package: &HlsPackage, path: &Path) -> Result<()> {
    tracing::debug!(
        "Writing {} bytes (utf-8) to: {}",
        package.playlist.len(),
        path.display()
    );
    std::fs::write(path, &package.playlist)?;
    Ok(())
}

fn write_segments(package: &HlsPackage, output_dir: &Path) -> Result<()> {
    let count = package.segments.len();
    tracing::debug!("Writing {} segments to {}", count, output_dir.display());

    let mut write_ellipsis = true;
    for (index, segment) in package.segments.iter().enumerate() {
        let target = output_dir.join(&segment.filename);

        if let Err(e) = std::fs::write(&target, &segment.content) {
            tracing::error!(
                "Failed writing {}. Wrote {} segments",
                segment.filename,
                index
            );
            return Err(e.into());
        }

        if index < PRINT_RANGE || index + PRINT_RANGE >= count {
            tracing::debug!("Wrote segment {} to {}", index + 1, target.display());
        } else if write_ellipsis {
            tracing::debug!("...");
            write_ellipsis = false;
        }
    }

    tracing::debug!("Finished writing segments");
    Ok(())
}
