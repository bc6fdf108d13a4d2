use thiserror::Error;

/// Errors raised while parsing WebVTT text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    /// Text after the `WEBVTT` signature is not separated by a space or tab
    #[error("Header comment must start with a space or tab")]
    InvalidHeaderComment,

    /// Header metadata is present but metadata was not requested
    #[error("Missing blank line after signature")]
    MalformedSignature,

    /// A single-line block without a timing line
    #[error("Cue identifier cannot be standalone (cue #{0})")]
    StandaloneCue(usize),

    /// Neither of the first two lines of a block holds a timing line
    #[error("Cue identifier needs to be followed by timestamp (cue #{0})")]
    IdentifierNoTimestamp(usize),

    /// The timing line does not hold two valid timestamps
    #[error("Invalid cue timestamp (cue #{0})")]
    InvalidCueTimestamp(usize),

    /// End time is not after the start time
    #[error("Cue cannot have end time less than or equal to start time (cue #{0})")]
    EndsBeforeStarts(usize),

    /// End time is before the start time, reported by the tolerant parser
    #[error("End must be greater or equal to start when not strict (cue #{0})")]
    EndBeforeStartLenient(usize),
}

impl ParserError {
    /// Index of the offending cue block, if the error is local to one
    pub fn cue_index(&self) -> Option<usize> {
        match self {
            ParserError::InvalidHeaderComment | ParserError::MalformedSignature => None,
            ParserError::StandaloneCue(i)
            | ParserError::IdentifierNoTimestamp(i)
            | ParserError::InvalidCueTimestamp(i)
            | ParserError::EndsBeforeStarts(i)
            | ParserError::EndBeforeStartLenient(i) => Some(*i),
        }
    }
}

/// Errors raised while compiling a cue model back to WebVTT text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompilerError {
    #[error("Input must be valid")]
    InvalidInput,

    #[error("Invalid start time (NaN) (cue #{0})")]
    InvalidStart(usize),

    #[error("Invalid end time (NaN) (cue #{0})")]
    InvalidEnd(usize),

    #[error("Cues must be in chronological order (cue #{0})")]
    InvalidCueOrder(usize),

    #[error("Cue cannot have end time less than or equal to start time (cue #{0})")]
    EndsBeforeStarts(usize),

    #[error("Metadata key is empty or spans lines: {0:?}")]
    MalformedMeta(String),
}

/// Main error type for the segmenter
#[derive(Error, Debug)]
pub enum VttError {
    #[error("Parser error: {0}")]
    Parser(#[from] ParserError),

    #[error("Compiler error: {0}")]
    Compiler(#[from] CompilerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid segment length: {0} (must be a positive number of seconds)")]
    InvalidSegmentLength(f64),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, VttError>;
