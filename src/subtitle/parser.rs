//! WebVTT parser
//!
//! Line/block scanner over the document body. Input is normalized first
//! (line endings, missing signature, cue glued onto the header), then the
//! body is split on blank lines and every block is parsed on its own.
//! A block either yields a cue, is skipped (NOTE blocks, empty text), or
//! fails with a [`ParserError`] carrying the block index.

use std::str::FromStr;

use crate::error::ParserError;
use crate::subtitle::cue::{Cue, HeaderMeta, ParserOptions, Vtt};
use crate::subtitle::timestamp::{is_valid_timestamp, parse_timestamp, timestamp_regex};

const SIGNATURE: &str = "WEBVTT";
const ARROW: &str = "-->";
const TIMING_SEPARATOR: &str = " --> ";

/// Parse a WebVTT document
///
/// In strict mode the first cue error aborts the parse. Otherwise failing
/// blocks are left out of `cues` and reported in `errors`, and `valid` is
/// false.
pub fn parse(input: &str, options: ParserOptions) -> Result<Vtt, ParserError> {
    let ParserOptions {
        meta,
        strict,
        process_meta,
        convert_to_ms,
    } = options;

    let input = preprocess_input(input);

    let mut parts = input.split("\n\n");
    let header = parts.next().unwrap_or_default();
    let blocks: Vec<&str> = parts.collect();

    let header_lines: Vec<&str> = header.split('\n').collect();
    let comment = header_lines[0]
        .strip_prefix(SIGNATURE)
        .unwrap_or(header_lines[0]);

    if !comment.is_empty() && !comment.starts_with([' ', '\t']) {
        return Err(ParserError::InvalidHeaderComment);
    }

    if blocks.is_empty() && header_lines.len() == 1 {
        return Ok(Vtt {
            valid: true,
            strict,
            cues: Vec::new(),
            errors: Vec::new(),
            meta: None,
        });
    }

    if !meta && process_meta && header_lines.len() > 1 && !header_lines[1].is_empty() {
        return Err(ParserError::MalformedSignature);
    }

    let (cues, errors) = parse_cues(&blocks, strict, convert_to_ms);

    if strict {
        if let Some(first) = errors.into_iter().next() {
            return Err(first);
        }
        return Ok(Vtt {
            valid: true,
            strict,
            cues,
            errors: Vec::new(),
            meta: parsed_meta(&header_lines, meta, process_meta),
        });
    }

    for error in &errors {
        tracing::warn!("Skipping cue block: {}", error);
    }

    Ok(Vtt {
        valid: errors.is_empty(),
        strict,
        cues,
        errors,
        meta: parsed_meta(&header_lines, meta, process_meta),
    })
}

impl FromStr for Vtt {
    type Err = ParserError;

    /// Parse with default options
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s, ParserOptions::default())
    }
}

/// Normalize line endings and repair the header
fn preprocess_input(raw: &str) -> String {
    let input = raw.trim().replace("\r\n", "\n").replace('\r', "\n");

    let first_block = input.split("\n\n").next().unwrap_or_default();

    if !input.starts_with(SIGNATURE) {
        // A leading cue needs a blank line after the signature; leading
        // header lines are metadata and go directly below it.
        return if first_block.contains(ARROW) {
            tracing::debug!("Adding missing WEBVTT signature before first cue");
            format!("{SIGNATURE}\n\n{input}")
        } else {
            tracing::debug!("Adding missing WEBVTT signature before header lines");
            format!("{SIGNATURE}\n{input}")
        };
    }

    if first_block.contains(ARROW) {
        tracing::debug!("Separating cue glued onto the WEBVTT header");
        return ensure_header_separation(&input, first_block);
    }

    input
}

/// Force a blank line before every timing line found in the header block
fn ensure_header_separation(input: &str, header: &str) -> String {
    let mut fixed = String::with_capacity(input.len() + 2);
    for line in header.split('\n') {
        if !fixed.is_empty() {
            fixed.push_str(if line.contains(ARROW) { "\n\n" } else { "\n" });
        }
        fixed.push_str(line);
    }

    let rest: Vec<&str> = input.split("\n\n").skip(1).collect();
    if rest.is_empty() {
        fixed
    } else {
        format!("{}\n\n{}", fixed.trim(), rest.join("\n\n"))
    }
}

fn parse_cues(
    blocks: &[&str],
    strict: bool,
    convert_to_ms: bool,
) -> (Vec<Cue>, Vec<ParserError>) {
    let mut cues = Vec::with_capacity(blocks.len());
    let mut errors = Vec::new();

    for (i, block) in blocks.iter().enumerate() {
        match parse_cue(block, i, strict, convert_to_ms) {
            Ok(Some(cue)) => cues.push(cue),
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
    }

    (cues, errors)
}

/// Parse a single cue block
///
/// Returns `Ok(None)` for blocks that carry no cue: NOTE comments and cues
/// whose text is empty. A blank block has no timing line and is an error.
fn parse_cue(
    block: &str,
    i: usize,
    strict: bool,
    convert_to_ms: bool,
) -> Result<Option<Cue>, ParserError> {
    let mut lines: Vec<&str> = block.split('\n').filter(|l| !l.is_empty()).collect();

    let Some(first) = lines.first() else {
        return Err(ParserError::InvalidCueTimestamp(i));
    };

    if first.trim().starts_with("NOTE") {
        tracing::debug!(block = i, "Skipping NOTE block");
        return Ok(None);
    }

    if lines.len() == 1 && !first.contains(ARROW) {
        return Err(ParserError::StandaloneCue(i));
    }

    if lines.len() > 1 && !(lines[0].contains(ARROW) || lines[1].contains(ARROW)) {
        return Err(ParserError::IdentifierNoTimestamp(i));
    }

    let identifier = if lines.len() > 1 && lines[1].contains(ARROW) {
        Some(lines.remove(0).to_string())
    } else {
        None
    };

    let times: Vec<&str> = lines[0].split(TIMING_SEPARATOR).collect();
    if times.len() != 2 || !is_valid_timestamp(times[0]) || !is_valid_timestamp(times[1]) {
        return Err(ParserError::InvalidCueTimestamp(i));
    }

    let scale = if convert_to_ms { 1000.0 } else { 1.0 };
    let start = parse_timestamp(times[0]).ok_or(ParserError::InvalidCueTimestamp(i))? * scale;
    let end = parse_timestamp(times[1]).ok_or(ParserError::InvalidCueTimestamp(i))? * scale;

    if strict && end <= start {
        return Err(ParserError::EndsBeforeStarts(i));
    }
    if !strict && end < start {
        return Err(ParserError::EndBeforeStartLenient(i));
    }

    let styles = timestamp_regex().replacen(times[1], 1, "").trim().to_string();

    let text = lines[1..].join("\n");
    if text.is_empty() {
        tracing::debug!(block = i, "Dropping cue without text");
        return Ok(None);
    }

    Ok(Some(Cue {
        identifier,
        start,
        end,
        text,
        styles: (!styles.is_empty()).then_some(styles),
    }))
}

fn parsed_meta(header_lines: &[&str], meta: bool, process_meta: bool) -> Option<HeaderMeta> {
    if meta && process_meta {
        parse_meta(header_lines)
    } else {
        None
    }
}

/// Collect `Key: value` lines below the signature
///
/// Returns `None` when no keys were found, so callers can tell a document
/// without metadata from one with an empty header.
fn parse_meta(header_lines: &[&str]) -> Option<HeaderMeta> {
    let meta: HeaderMeta = header_lines
        .iter()
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, _)| !key.is_empty())
        .collect();

    (!meta.is_empty()).then_some(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures;

    fn lenient() -> ParserOptions {
        ParserOptions {
            strict: false,
            ..Default::default()
        }
    }

    fn with_meta() -> ParserOptions {
        ParserOptions {
            meta: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_empty_input() {
        let vtt = parse("", ParserOptions::default()).unwrap();
        assert!(vtt.valid);
        assert!(vtt.strict);
        assert!(vtt.meta.is_none());
        assert!(vtt.cues.is_empty());
    }

    #[test]
    fn test_parse_minimum_document() {
        let vtt: Vtt = "WEBVTT".parse().unwrap();
        assert!(vtt.valid);
        assert!(vtt.cues.is_empty());
    }

    #[test]
    fn test_parse_proper_document() {
        let vtt: Vtt = fixtures::PROPER_VTT.parse().unwrap();
        assert!(vtt.valid);
        assert_eq!(vtt.cues.len(), 2);
        assert_eq!(vtt.cues[0], Cue::new(0.0, 1.0, "This is a test"));
        assert_eq!(vtt.cues[1].start, 1.0);
        assert_eq!(vtt.cues[1].end, 2.0);
    }

    #[test]
    fn test_parse_adds_missing_signature() {
        let vtt: Vtt = "00:00:00.000 --> 00:00:01.000\nThis is a test\n\n00:00:01.000 --> 00:00:02.000\nIt has two cues"
            .parse()
            .unwrap();
        assert!(vtt.valid);
        assert_eq!(vtt.cues.len(), 2);
    }

    #[test]
    fn test_parse_adds_signature_above_metadata() {
        let input = "Header: meta\n\n00:00:00.000 --> 00:00:01.000\nThis is a test";
        let vtt = parse(input, with_meta()).unwrap();
        assert!(vtt.valid);
        assert_eq!(vtt.meta.unwrap().get("Header"), Some("meta"));
        assert_eq!(vtt.cues.len(), 1);
    }

    #[test]
    fn test_parse_multiline_text() {
        let input = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nIt it one cue\nbut has text on two lines";
        let vtt: Vtt = input.parse().unwrap();
        assert_eq!(vtt.cues[0].text, "It it one cue\nbut has text on two lines");
    }

    #[test]
    fn test_parse_mixed_line_endings() {
        let input = "WEBVTT\r\n\n00:00:00.000 --> 00:00:01.000\r\nThis is a test\r\r00:00:01.000 --> 00:00:02.000\nIt has two cues";
        let vtt: Vtt = input.parse().unwrap();
        assert!(vtt.valid);
        assert_eq!(vtt.cues.len(), 2);
        assert_eq!(vtt.cues[0].text, "This is a test");
    }

    #[test]
    fn test_parse_cue_glued_to_header() {
        let input = "WEBVTT\n00:00:00.000 --> 00:00:01.000\nThis is a test\n\n00:00:01.000 --> 00:00:02.000\nIt has two cues\n\n00:00:02.000 --> 00:00:03.000\nAnd a third";
        let vtt: Vtt = input.parse().unwrap();
        assert!(vtt.valid);
        assert_eq!(vtt.cues.len(), 3);
        assert_eq!(vtt.cues[2].text, "And a third");
    }

    #[test]
    fn test_parse_single_cue_glued_to_header() {
        let vtt: Vtt = "WEBVTT\n00:00.000 --> 00:01.000\na".parse().unwrap();
        assert_eq!(vtt.cues, vec![Cue::new(0.0, 1.0, "a")]);
    }

    #[test]
    fn test_header_comment_needs_separator() {
        let input = "WEBVTTHeaderMetaDataUnseparated!\n\n00:00:00.000 --> 00:00:01.000\nThis is a test";
        assert_eq!(input.parse::<Vtt>(), Err(ParserError::InvalidHeaderComment));

        let vtt: Vtt = "WEBVTT header\n\n00:00.000 --> 00:00.001\na".parse().unwrap();
        assert_eq!(vtt.cues.len(), 1);

        let vtt: Vtt = "WEBVTT\theader\n\n00:00.000 --> 00:00.001\na".parse().unwrap();
        assert_eq!(vtt.cues.len(), 1);
    }

    #[test]
    fn test_standalone_cue() {
        assert_eq!(
            "WEBVTT\n\ntext".parse::<Vtt>(),
            Err(ParserError::StandaloneCue(0))
        );
    }

    #[test]
    fn test_identifier_without_timestamp() {
        assert_eq!(
            "WEBVTT\n\nCue #0\ntext".parse::<Vtt>(),
            Err(ParserError::IdentifierNoTimestamp(0))
        );
    }

    #[test]
    fn test_invalid_timestamps() {
        for input in [
            "WEBVTT\n\n--> 00:00:01.000\ntext",
            "WEBVTT\n\n00:00:00.000 -->\ntext",
            "WEBVTT\n\n00;00;00.000 --> 00:00:01.000\ntext",
            "WEBVTT\n\n0 --> 0\ntext",
        ] {
            assert_eq!(
                input.parse::<Vtt>(),
                Err(ParserError::InvalidCueTimestamp(0)),
                "input: {input:?}"
            );
        }
    }

    #[test]
    fn test_end_must_follow_start() {
        assert_eq!(
            "WEBVTT\n\n00:00:01.000 --> 00:00:00.000\ntext".parse::<Vtt>(),
            Err(ParserError::EndsBeforeStarts(0))
        );
        assert_eq!(
            "WEBVTT\n\n00:00:00.000 --> 00:00:00.000\ntext".parse::<Vtt>(),
            Err(ParserError::EndsBeforeStarts(0))
        );
    }

    #[test]
    fn test_lenient_end_before_start() {
        let input = "WEBVTT\n\n00:00:01.000 --> 00:00:00.000\ntext\n\n00:00:02.000 --> 00:00:02.000\nzero";
        let vtt = parse(input, lenient()).unwrap();
        assert!(!vtt.valid);
        assert_eq!(vtt.errors, vec![ParserError::EndBeforeStartLenient(0)]);
        // Zero-length cues are tolerated outside strict mode
        assert_eq!(vtt.cues.len(), 1);
        assert_eq!(vtt.cues[0].text, "zero");
    }

    #[test]
    fn test_parse_long_hours() {
        let input = "WEBVTT\n\n1000:00:00.000 --> 1000:00:01.000\nThis is a test\n\n10000:00:00.000 --> 10000:00:00.001\nIt has two cues";
        let vtt: Vtt = input.parse().unwrap();
        assert_eq!(vtt.cues[1].start, 36_000_000.0);
        assert_eq!(vtt.cues[1].end, 36_000_000.001);
    }

    #[test]
    fn test_parse_identifier_and_styles() {
        let input = "WEBVTT\n\n1\n00:00.000 --> 00:01.001 align:start line:0%\na\nb";
        let vtt: Vtt = input.parse().unwrap();
        assert_eq!(vtt.cues.len(), 1);
        let cue = &vtt.cues[0];
        assert_eq!(cue.identifier(), Some("1"));
        assert_eq!(cue.styles(), Some("align:start line:0%"));
        assert_eq!(cue.text, "a\nb");
        assert_eq!(cue.end, 1.001);
    }

    #[test]
    fn test_parse_overlapping_cues() {
        let input = "WEBVTT\n\n00:00:00.000 --> 00:00:12.000\na\n\n\n00:00:01.000 --> 00:00:13.000\nb";
        let vtt: Vtt = input.parse().unwrap();
        assert_eq!(vtt.cues.len(), 2);
        assert!(vtt.cues[0].end > vtt.cues[1].start);
    }

    #[test]
    fn test_parse_trailing_whitespace() {
        let vtt: Vtt = "WEBVTT\n\n00:00.000 --> 00:00.001\na\n\n".parse().unwrap();
        assert_eq!(vtt.cues.len(), 1);
    }

    #[test]
    fn test_parse_rejects_blank_blocks() {
        let input = "WEBVTT\n\n00:00.000 --> 00:01.000\na\n\n\n\n00:01.000 --> 00:02.000\nb";
        assert_eq!(
            input.parse::<Vtt>(),
            Err(ParserError::InvalidCueTimestamp(1))
        );
    }

    #[test]
    fn test_lenient_reports_blank_block_and_keeps_neighbours() {
        let input = "WEBVTT\n\n00:00.000 --> 00:01.000\na\n\n\n\n00:01.000 --> 00:02.000\nb";
        let vtt = parse(input, lenient()).unwrap();
        assert!(!vtt.valid);
        assert_eq!(vtt.errors, vec![ParserError::InvalidCueTimestamp(1)]);
        let texts: Vec<&str> = vtt.cues.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_skips_notes() {
        let vtt: Vtt = fixtures::WITH_NOTES.parse().unwrap();
        assert!(vtt.valid);
        assert!(vtt.errors.is_empty());
        assert_eq!(vtt.cues.len(), 3);
        assert_eq!(vtt.cues[0].identifier(), Some("1"));
        assert_eq!(vtt.cues[0].start, 135.0);

        let vtt = parse("WEBVTT\n\nNOTE just a comment", lenient()).unwrap();
        assert!(vtt.valid);
        assert!(vtt.cues.is_empty());
        assert!(vtt.errors.is_empty());
    }

    #[test]
    fn test_parse_drops_cue_without_text() {
        let input = "WEBVTT header\n\n00:00.000 --> 00:00.001\n\n3\n00:02:25.000 --> 00:02:30.000\n- Ta en kopp";
        let vtt: Vtt = input.parse().unwrap();
        assert!(vtt.valid);
        assert_eq!(vtt.cues.len(), 1);
    }

    #[test]
    fn test_metadata_requires_opt_in() {
        assert_eq!(
            fixtures::HEADER_META.parse::<Vtt>(),
            Err(ParserError::MalformedSignature)
        );

        let options = ParserOptions {
            process_meta: false,
            ..Default::default()
        };
        let vtt = parse(fixtures::HEADER_META, options).unwrap();
        assert_eq!(vtt.cues.len(), 1);
        assert!(vtt.meta.is_none());
    }

    #[test]
    fn test_metadata_returned_when_requested() {
        let vtt = parse(fixtures::HEADER_META, with_meta()).unwrap();
        let meta = vtt.meta.unwrap();
        assert_eq!(meta.get("Kind"), Some("captions"));
        assert_eq!(meta.get("Language"), Some("en"));
        assert_eq!(meta.len(), 2);
    }

    #[test]
    fn test_metadata_absent_when_header_has_none() {
        let vtt = parse(fixtures::PROPER_VTT, with_meta()).unwrap();
        assert!(vtt.valid);
        assert!(vtt.meta.is_none());
    }

    #[test]
    fn test_strict_flag_is_reported() {
        let vtt = parse(fixtures::PROPER_VTT, lenient()).unwrap();
        assert!(vtt.valid);
        assert!(!vtt.strict);
    }

    #[test]
    fn test_lenient_keeps_good_cues() {
        let vtt = parse(fixtures::MALFORMED_CUE, lenient()).unwrap();
        assert!(!vtt.valid);
        assert!(!vtt.strict);
        assert_eq!(vtt.errors, vec![ParserError::InvalidCueTimestamp(0)]);
        assert_eq!(vtt.cues.len(), 1);
        assert_eq!(vtt.cues[0].text, "test");
        assert_eq!(vtt.cues[0].identifier(), Some("1"));
    }

    #[test]
    fn test_strict_reports_first_error() {
        assert_eq!(
            fixtures::MALFORMED_CUE.parse::<Vtt>(),
            Err(ParserError::InvalidCueTimestamp(0))
        );
    }

    #[test]
    fn test_lenient_error_indices_count_all_blocks() {
        let input = "WEBVTT\n\nNOTE first\n\n00:00.000 --> 00:01.000\nok\n\nbroken";
        let vtt = parse(input, lenient()).unwrap();
        assert_eq!(vtt.errors, vec![ParserError::StandaloneCue(2)]);
        assert_eq!(vtt.cues.len(), 1);
    }

    #[test]
    fn test_convert_to_ms() {
        let options = ParserOptions {
            convert_to_ms: true,
            ..Default::default()
        };
        let vtt = parse("WEBVTT\n\n00:01.500 --> 00:02.250\na", options).unwrap();
        assert_eq!(vtt.cues[0].start, 1500.0);
        assert_eq!(vtt.cues[0].end, 2250.0);
    }
}
