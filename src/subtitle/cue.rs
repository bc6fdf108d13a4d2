//! Cue model shared by the parser, compiler and segmenter.

use serde::{Deserialize, Serialize};

use crate::error::ParserError;

/// A single timed subtitle entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Optional cue identifier line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Cue payload, lines joined with `\n`
    pub text: String,
    /// Raw cue settings following the end timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<String>,
}

impl Cue {
    /// Create a cue without identifier or settings
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            identifier: None,
            start,
            end,
            text: text.into(),
            styles: None,
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_styles(mut self, styles: impl Into<String>) -> Self {
        self.styles = Some(styles.into());
        self
    }

    /// Identifier, treating an empty string as absent
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref().filter(|s| !s.is_empty())
    }

    /// Cue settings, treating an empty string as absent
    pub fn styles(&self) -> Option<&str> {
        self.styles.as_deref().filter(|s| !s.is_empty())
    }

    /// Get the duration in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Header metadata, kept in the order it appeared in the file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderMeta(Vec<(String, String)>);

impl HeaderMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing an existing key in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderMeta {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut meta = HeaderMeta::new();
        for (k, v) in iter {
            meta.insert(k, v);
        }
        meta
    }
}

/// A parsed WebVTT document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vtt {
    /// False when any cue block failed to parse
    pub valid: bool,
    /// Whether the document was parsed in strict mode
    pub strict: bool,
    pub cues: Vec<Cue>,
    /// One entry per failed cue block, in block order
    #[serde(skip)]
    pub errors: Vec<ParserError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<HeaderMeta>,
}

impl Vtt {
    /// A valid document holding the given cues
    pub fn new(cues: Vec<Cue>) -> Self {
        Self {
            valid: true,
            strict: true,
            cues,
            errors: Vec::new(),
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: HeaderMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Parser behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Header metadata is expected and returned
    pub meta: bool,
    /// Abort on the first cue error instead of collecting errors
    pub strict: bool,
    /// Inspect the header for metadata lines at all
    pub process_meta: bool,
    /// Report cue times in milliseconds instead of seconds
    pub convert_to_ms: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            meta: false,
            strict: true,
            process_meta: true,
            convert_to_ms: false,
        }
    }
}
