//! Segmentation module
//!
//! This module splits a cue timeline into fixed-length HLS segments.

pub mod segmenter;

pub use segmenter::{
    segment, segment_cues, CueContext, Segment, Segmenter, SegmenterState,
    DEFAULT_SEGMENT_LENGTH,
};
