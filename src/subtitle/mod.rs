//! WebVTT subtitle module
//!
//! This module handles the WebVTT text format:
//! - Cue model and header metadata
//! - Timestamp parsing and formatting
//! - Parsing with strict and tolerant error handling
//! - Compiling cues back to canonical WebVTT

pub mod compiler;
pub mod cue;
pub mod parser;
pub mod timestamp;

pub use compiler::compile;
pub use cue::{Cue, HeaderMeta, ParserOptions, Vtt};
pub use parser::parse;
