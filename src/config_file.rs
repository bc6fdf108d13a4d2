//! Configuration file support
//!
//! Loads segmenter configuration from TOML files. Every section and field
//! is optional; missing values fall back to [`AppConfig::default`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{AppConfig, OutputConfig, ParserConfig, SegmentConfig};
use crate::error::{Result, VttError};

/// Configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Segment settings
    pub segment: Option<SegmentSettings>,
    /// Output settings
    pub output: Option<OutputSettings>,
    /// Parser settings
    pub parser: Option<ParserSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentSettings {
    /// Target segment duration in seconds
    pub target_duration_secs: Option<f64>,
    /// X-TIMESTAMP-MAP MPEGTS value
    pub mpegts_offset: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Output directory
    pub output_dir: Option<PathBuf>,
    /// Playlist file name
    pub playlist_filename: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParserSettings {
    pub strict: Option<bool>,
    pub meta: Option<bool>,
    pub process_meta: Option<bool>,
    pub convert_to_ms: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| VttError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| VttError::Config(e.to_string()))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Convert to AppConfig, filling defaults
    pub fn into_app_config(self) -> AppConfig {
        let defaults = AppConfig::default();

        let segment = self.segment.unwrap_or_default();
        let output = self.output.unwrap_or_default();
        let parser = self.parser.unwrap_or_default();

        AppConfig {
            segment: SegmentConfig {
                target_duration_secs: segment
                    .target_duration_secs
                    .unwrap_or(defaults.segment.target_duration_secs),
                mpegts_offset: segment
                    .mpegts_offset
                    .unwrap_or(defaults.segment.mpegts_offset),
            },
            output: OutputConfig {
                output_dir: output.output_dir.unwrap_or(defaults.output.output_dir),
                playlist_filename: output
                    .playlist_filename
                    .unwrap_or(defaults.output.playlist_filename),
            },
            parser: ParserConfig {
                strict: parser.strict.unwrap_or(defaults.parser.strict),
                meta: parser.meta.unwrap_or(defaults.parser.meta),
                process_meta: parser.process_meta.unwrap_or(defaults.parser.process_meta),
                convert_to_ms: parser.convert_to_ms.unwrap_or(defaults.parser.convert_to_ms),
            },
            log_level: self
                .logging
                .and_then(|l| l.level)
                .unwrap_or(defaults.log_level),
        }
    }
}
