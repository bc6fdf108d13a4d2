//! WebVTT compiler
//!
//! Serializes a [`Vtt`] back to canonical WebVTT text. Output of
//! [`compile`] on a parsed canonical document is byte-identical to the input.

use crate::error::CompilerError;
use crate::subtitle::cue::{Cue, HeaderMeta, Vtt};
use crate::subtitle::timestamp::format_timestamp;

/// Compile a cue collection into WebVTT text
///
/// Cues must be ordered by start time; overlapping end times are allowed.
pub fn compile(input: &Vtt) -> Result<String, CompilerError> {
    if !input.valid {
        return Err(CompilerError::InvalidInput);
    }

    let mut output = String::from("WEBVTT\n");

    if let Some(meta) = &input.meta {
        compile_meta(meta, &mut output)?;
    }

    let mut previous_start = f64::NEG_INFINITY;
    for (index, cue) in input.cues.iter().enumerate() {
        if cue.start.is_nan() {
            return Err(CompilerError::InvalidStart(index));
        } else if cue.start < previous_start {
            return Err(CompilerError::InvalidCueOrder(index));
        } else if cue.end.is_nan() {
            return Err(CompilerError::InvalidEnd(index));
        } else if cue.end <= cue.start {
            return Err(CompilerError::EndsBeforeStarts(index));
        }
        previous_start = cue.start;

        output.push('\n');
        output.push_str(&compile_cue(cue));
        output.push('\n');
    }

    Ok(output)
}

fn compile_meta(meta: &HeaderMeta, output: &mut String) -> Result<(), CompilerError> {
    for (key, value) in meta.iter() {
        if key.is_empty() || key.contains('\n') || value.contains('\n') {
            return Err(CompilerError::MalformedMeta(key.to_string()));
        }
        output.push_str(&format!("{}: {}\n", key, value));
    }
    Ok(())
}

fn compile_cue(cue: &Cue) -> String {
    let mut output = String::new();

    if let Some(identifier) = cue.identifier() {
        output.push_str(identifier);
        output.push('\n');
    }

    output.push_str(&format!(
        "{} --> {}",
        format_timestamp(cue.start),
        format_timestamp(cue.end)
    ));
    if let Some(styles) = cue.styles() {
        output.push(' ');
        output.push_str(styles);
    }
    output.push('\n');
    output.push_str(&cue.text);

    output
}
