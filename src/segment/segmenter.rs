//! Cue segmenter
//!
//! Partitions a chronologically ordered cue list into contiguous windows of
//! a target length in one pass. A cue that straddles a boundary is carried
//! over and repeated as the first cue of the next segment. Segment durations
//! always sum to the end time of the last cue.
//!
//! The pass is a fold over [`SegmenterState`]: every cue is fed to
//! [`SegmenterState::step`] together with its [`CueContext`], and a step
//! emits at most one closed [`Segment`].

use serde::{Deserialize, Serialize};

use crate::error::{Result, VttError};
use crate::subtitle::timestamp::round_to;
use crate::subtitle::{parse, Cue, ParserOptions};

/// Default target segment length in seconds
pub const DEFAULT_SEGMENT_LENGTH: f64 = 10.0;

/// A window of the timeline and the cues shown during it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Duration in seconds
    pub duration: f64,
    /// Cues active in this window, never empty
    pub cues: Vec<Cue>,
}

/// Timeline facts about one cue relative to its neighbours
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueContext {
    pub first: bool,
    pub last: bool,
    /// Cue length; for the first cue this includes the lead-in from zero
    pub cue_length: f64,
    /// Gap since the previous cue ended, negative when cues overlap
    pub silence: f64,
    /// Start of the following cue, infinite for the last cue
    pub next_start: f64,
}

impl CueContext {
    /// Build the context of `cues[index]`
    pub fn new(cues: &[Cue], index: usize) -> Self {
        let cue = &cues[index];
        let first = index == 0;
        let last = index + 1 == cues.len();

        Self {
            first,
            last,
            cue_length: if first { cue.end } else { cue.duration() },
            silence: if first {
                0.0
            } else {
                cue.start - cues[index - 1].end
            },
            next_start: if last {
                f64::INFINITY
            } else {
                cues[index + 1].start
            },
        }
    }
}

/// Accumulator threaded through the segmentation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmenterState {
    /// Sum of closed segment durations: the segment-boundary clock
    total_elapsed: f64,
    /// Running span of the open segment, silence included
    current_duration: f64,
    /// Cue straddling the last boundary, replayed into the next segment
    queued: Option<Cue>,
    /// Cues of the open segment
    open: Vec<Cue>,
}

impl SegmenterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_elapsed(&self) -> f64 {
        self.total_elapsed
    }

    pub fn current_duration(&self) -> f64 {
        self.current_duration
    }

    pub fn queued(&self) -> Option<&Cue> {
        self.queued.as_ref()
    }

    pub fn open_cues(&self) -> &[Cue] {
        &self.open
    }

    /// Feed one cue into the state, returning the segment it closes, if any
    pub fn step(&mut self, cue: &Cue, ctx: CueContext, segment_length: f64) -> Option<Segment> {
        self.current_duration += ctx.cue_length + ctx.silence;

        if let Some(queued) = self.queued.take() {
            self.current_duration += queued.end - self.total_elapsed;
            self.open.push(queued);
        }

        self.open.push(cue.clone());

        let straddles = ctx.next_start - cue.end < segment_length
            && ctx.silence < segment_length
            && self.current_duration > segment_length;

        let close = should_segment(
            self.total_elapsed,
            segment_length,
            ctx.next_start,
            ctx.silence,
        );

        tracing::trace!(
            start = cue.start,
            end = cue.end,
            first = ctx.first,
            last = ctx.last,
            cue_length = ctx.cue_length,
            silence = ctx.silence,
            next_start = ctx.next_start,
            total_elapsed = self.total_elapsed,
            current_duration = self.current_duration,
            close,
            straddles,
            "segmenter step"
        );

        if !close {
            return None;
        }

        let duration = segment_duration(
            ctx.last,
            cue.end,
            segment_length,
            self.current_duration,
            self.total_elapsed,
        );

        self.total_elapsed += duration;
        self.current_duration = 0.0;
        if straddles {
            self.queued = Some(cue.clone());
        }

        Some(Segment {
            duration,
            cues: std::mem::take(&mut self.open),
        })
    }
}

/// Segmenter for a fixed target length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segmenter {
    segment_length: f64,
}

impl Segmenter {
    /// Create a segmenter, rejecting non-positive or non-finite lengths
    pub fn new(segment_length: f64) -> Result<Self> {
        if !(segment_length.is_finite() && segment_length > 0.0) {
            return Err(VttError::InvalidSegmentLength(segment_length));
        }
        Ok(Self { segment_length })
    }

    pub fn segment_length(&self) -> f64 {
        self.segment_length
    }

    /// Segment cues that are already sorted by start time
    pub fn segment_cues(&self, cues: &[Cue]) -> Vec<Segment> {
        let mut state = SegmenterState::new();
        let mut segments = Vec::new();

        for (index, cue) in cues.iter().enumerate() {
            let ctx = CueContext::new(cues, index);
            segments.extend(state.step(cue, ctx, self.segment_length));
        }

        tracing::debug!(
            cues = cues.len(),
            segments = segments.len(),
            total_duration = state.total_elapsed(),
            "Segmented cues"
        );

        segments
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self {
            segment_length: DEFAULT_SEGMENT_LENGTH,
        }
    }
}

/// Parse a WebVTT document with default options and segment its cues
pub fn segment(input: &str, segment_length: f64) -> Result<Vec<Segment>> {
    let segmenter = Segmenter::new(segment_length)?;
    let vtt = parse(input, ParserOptions::default())?;
    Ok(segmenter.segment_cues(&vtt.cues))
}

/// Segment an already parsed cue list
pub fn segment_cues(cues: &[Cue], segment_length: f64) -> Result<Vec<Segment>> {
    Ok(Segmenter::new(segment_length)?.segment_cues(cues))
}

/// Round `n` up to the next multiple of `length` strictly above it
fn align_to_segment_length(n: f64, length: f64) -> f64 {
    n + length - (n % length)
}

/// Decide whether the open segment closes after the current cue
///
/// It closes when the next cue starts at least one segment length after the
/// boundary clock, unless a long silence still leaves the next cue inside
/// the window that silence reaches into.
fn should_segment(total_elapsed: f64, segment_length: f64, next_start: f64, silence: f64) -> bool {
    let aligned_silence = align_to_segment_length(silence, segment_length);
    let next_cue_in_next_segment =
        silence <= segment_length || aligned_silence + total_elapsed < next_start;

    next_cue_in_next_segment && next_start - total_elapsed >= segment_length
}

/// Duration of the segment being closed
///
/// The last segment absorbs whatever remains up to the final cue's end.
/// A segment that ran long pushes its overflow up to a whole multiple of
/// the segment length.
fn segment_duration(
    last_cue: bool,
    end: f64,
    segment_length: f64,
    current_duration: f64,
    total_elapsed: f64,
) -> f64 {
    if last_cue {
        round_to(end - total_elapsed, 2)
    } else if current_duration > segment_length {
        align_to_segment_length(current_duration - segment_length, segment_length)
    } else {
        segment_length.round()
    }
}
