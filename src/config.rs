//! Segmenter configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, VttError};
use crate::playlist::DEFAULT_MPEGTS_OFFSET;
use crate::segment::DEFAULT_SEGMENT_LENGTH;
use crate::subtitle::ParserOptions;

/// Default playlist file name
pub const DEFAULT_PLAYLIST_FILENAME: &str = "playlist.m3u8";

/// Segment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Target segment duration in seconds
    pub target_duration_secs: f64,

    /// MPEG-TS time written to each segment's X-TIMESTAMP-MAP
    pub mpegts_offset: u64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            target_duration_secs: DEFAULT_SEGMENT_LENGTH,
            mpegts_offset: DEFAULT_MPEGTS_OFFSET,
        }
    }
}

impl SegmentConfig {
    /// Reject durations the segmenter cannot work with
    pub fn validate(&self) -> Result<()> {
        let secs = self.target_duration_secs;
        if !(secs.is_finite() && secs > 0.0) {
            return Err(VttError::InvalidSegmentLength(secs));
        }
        Ok(())
    }
}

/// Output location configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the playlist and segment files
    pub output_dir: PathBuf,

    /// Playlist file name inside `output_dir`
    pub playlist_filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./"),
            playlist_filename: DEFAULT_PLAYLIST_FILENAME.to_string(),
        }
    }
}

impl OutputConfig {
    /// Full path of the playlist file
    pub fn playlist_path(&self) -> PathBuf {
        self.output_dir.join(&self.playlist_filename)
    }
}

/// Parser configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    pub strict: bool,
    pub meta: bool,
    pub process_meta: bool,
    pub convert_to_ms: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserOptions::default().into()
    }
}

impl From<ParserOptions> for ParserConfig {
    fn from(options: ParserOptions) -> Self {
        Self {
            strict: options.strict,
            meta: options.meta,
            process_meta: options.process_meta,
            convert_to_ms: options.convert_to_ms,
        }
    }
}

impl From<ParserConfig> for ParserOptions {
    fn from(config: ParserConfig) -> Self {
        Self {
            meta: config.meta,
            strict: config.strict,
            process_meta: config.process_meta,
            convert_to_ms: config.convert_to_ms,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Segment configuration
    pub segment: SegmentConfig,

    /// Output configuration
    pub output: OutputConfig,

    /// Parser configuration
    pub parser: ParserConfig,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            segment: SegmentConfig::default(),
            output: OutputConfig::default(),
            parser: ParserConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Check every section
    pub fn validate(&self) -> Result<()> {
        self.segment.validate()?;
        if self.output.playlist_filename.is_empty() {
            return Err(VttError::Config("playlist filename is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.segment.target_duration_secs, 10.0);
        assert_eq!(config.segment.mpegts_offset, 900_000);
        assert_eq!(config.output.output_dir, PathBuf::from("./"));
        assert_eq!(config.output.playlist_filename, "playlist.m3u8");
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parser_config_matches_options() {
        let options: ParserOptions = ParserConfig::default().into();
        assert_eq!(options, ParserOptions::default());
    }

    #[test]
    fn test_segment_config_validate() {
        for secs in [0.0, -4.0, f64::NAN, f64::INFINITY] {
            let config = SegmentConfig {
                target_duration_secs: secs,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(VttError::InvalidSegmentLength(_))
            ));
        }
        let config = SegmentConfig {
            target_duration_secs: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_playlist_filename_rejected() {
        let mut config = AppConfig::default();
        config.output.playlist_filename.clear();
        assert!(matches!(config.validate(), Err(VttError::Config(_))));
    }

    #[test]
    fn test_playlist_path() {
        let output = OutputConfig {
            output_dir: PathBuf::from("/tmp/out"),
            playlist_filename: "subs.m3u8".to_string(),
        };
        assert_eq!(output.playlist_path(), PathBuf::from("/tmp/out/subs.m3u8"));
    }
}
