//! Subtitle variant playlist generator
//!
//! Renders segmenter output as self-contained WebVTT segment files and the
//! VOD `.m3u8` playlist that references them. Both are produced from one
//! segmentation so declared durations always match the files.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::segment::{segment, Segment};
use crate::subtitle::timestamp::printable_timestamp;
use crate::subtitle::Cue;

/// Default MPEG-TS presentation time anchoring local cue time zero
pub const DEFAULT_MPEGTS_OFFSET: u64 = 900_000;

/// One WebVTT segment file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HlsSegment {
    pub filename: String,
    pub content: String,
}

/// Segment files and the playlist referencing them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HlsPackage {
    pub segments: Vec<HlsSegment>,
    pub playlist: String,
}

impl HlsPackage {
    /// Render a package from an existing segmentation
    pub fn from_segments(segments: &[Segment], start_offset: u64) -> Self {
        Self {
            segments: generate_segment_files(segments, start_offset),
            playlist: generate_subtitle_playlist(segments),
        }
    }

    /// Parse, segment once, and render both outputs
    pub fn from_input(input: &str, segment_length: f64, start_offset: u64) -> Result<Self> {
        let segments = segment(input, segment_length)?;
        tracing::debug!(
            segments = segments.len(),
            segment_length,
            start_offset,
            "Packaging subtitle segments"
        );
        Ok(Self::from_segments(&segments, start_offset))
    }
}

/// Generate the WebVTT segment files for a document
pub fn hls_segment(input: &str, segment_length: f64, start_offset: u64) -> Result<Vec<HlsSegment>> {
    let segments = segment(input, segment_length)?;
    Ok(generate_segment_files(&segments, start_offset))
}

/// Generate the playlist for a document
pub fn hls_segment_playlist(input: &str, segment_length: f64) -> Result<String> {
    let segments = segment(input, segment_length)?;
    Ok(generate_subtitle_playlist(&segments))
}

/// Segment file name for the segment at `index`
pub fn segment_filename(index: usize) -> String {
    format!("{}.vtt", index)
}

/// Render every segment as a WebVTT file
pub fn generate_segment_files(segments: &[Segment], start_offset: u64) -> Vec<HlsSegment> {
    segments
        .iter()
        .enumerate()
        .map(|(index, segment)| HlsSegment {
            filename: segment_filename(index),
            content: generate_segment_content(segment, start_offset),
        })
        .collect()
}

fn generate_segment_content(segment: &Segment, start_offset: u64) -> String {
    let cues: Vec<String> = segment.cues.iter().map(printable_cue).collect();

    let mut output = String::new();
    output.push_str("WEBVTT\n");
    output.push_str(&format!(
        "X-TIMESTAMP-MAP=MPEGTS:{},LOCAL:00:00:00.000\n",
        start_offset
    ));
    output.push('\n');
    output.push_str(&cues.join("\n\n"));
    output.push('\n');

    output
}

fn printable_cue(cue: &Cue) -> String {
    let mut lines = Vec::with_capacity(3);

    if let Some(identifier) = cue.identifier() {
        lines.push(identifier.to_string());
    }

    // The space after the end timestamp is always written, some players
    // drop cues whose timing line ends right after the timestamp.
    lines.push(format!(
        "{} --> {} {}",
        printable_timestamp(cue.start),
        printable_timestamp(cue.end),
        cue.styles().unwrap_or_default()
    ));

    lines.push(cue.text.clone());

    lines.join("\n")
}

/// Generate the subtitle variant playlist
pub fn generate_subtitle_playlist(segments: &[Segment]) -> String {
    let mut output = String::new();

    // Header
    output.push_str("#EXTM3U\n");
    output.push_str(&format!(
        "#EXT-X-TARGETDURATION:{}\n",
        calculate_target_duration(segments)
    ));
    output.push_str("#EXT-X-VERSION:3\n");
    output.push_str("#EXT-X-MEDIA-SEQUENCE:0\n");
    output.push_str("#EXT-X-PLAYLIST-TYPE:VOD\n");

    // Segment entries
    for (index, segment) in segments.iter().enumerate() {
        output.push_str(&format!("#EXTINF:{:.5},\n", segment.duration));
        output.push_str(&segment_filename(index));
        output.push('\n');
    }

    // End list
    output.push_str("#EXT-X-ENDLIST\n");

    output
}

/// Calculate target duration from segments
///
/// The longest duration is rounded to the nearest integer, not up, so a
/// 10.4s segment yields 10. Existing consumers depend on this value.
pub fn calculate_target_duration(segments: &[Segment]) -> u64 {
    let max_duration = segments
        .iter()
        .map(|s| s.duration)
        .fold(0.0f64, |a, b| a.max(b));

    max_duration.round() as u64
}
