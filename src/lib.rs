//! WebVTT parsing, compiling and HLS subtitle segmentation.
//!
//! ```no_run
//! use webvtt_segment::HlsPackage;
//!
//! let input = std::fs::read_to_string("subs.vtt")?;
//! let package = HlsPackage::from_input(&input, 10.0, 900_000)?;
//! std::fs::write("playlist.m3u8", &package.playlist)?;
//! for segment in &package.segments {
//!     std::fs::write(&segment.filename, &segment.content)?;
//! }
//! # Ok::<(), webvtt_segment::VttError>(())
//! ```

macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).unwrap())
    }};
}

pub mod config;
pub mod config_file;
pub mod error;
pub mod playlist;
pub mod segment;
pub mod subtitle;

#[cfg(test)]
pub(crate) mod tests;

pub use config::AppConfig;
pub use config_file::ConfigFile;
pub use error::{CompilerError, ParserError, Result, VttError};
pub use playlist::{hls_segment, hls_segment_playlist, HlsPackage, HlsSegment};
pub use segment::{segment, segment_cues, Segment, Segmenter};
pub use subtitle::{compile, parse, Cue, HeaderMeta, ParserOptions, Vtt};
