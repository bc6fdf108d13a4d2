//! Playlist generation module
//!
//! This module packages segmented subtitles for HLS:
//! - WebVTT segment files carrying an `X-TIMESTAMP-MAP` header
//! - The VOD subtitle variant playlist (`playlist.m3u8`)

pub mod variant;

pub use variant::{
    calculate_target_duration, generate_segment_files, generate_subtitle_playlist, hls_segment,
    hls_segment_playlist, segment_filename, HlsPackage, HlsSegment, DEFAULT_MPEGTS_OFFSET,
};
