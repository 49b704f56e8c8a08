//! Word-level tokenization for corpus expressions.
//!
//! Sentence boundary characters are kept as standalone tokens so that
//! chunking and rule rendering can treat them as units.

use crate::models::{Result, SyngramError};

/// Characters treated as sentence boundaries during tokenization and
/// rejoined without a leading space when rendering rules.
pub const BOUNDARY_CHARS: [char; 6] = ['.', ',', '?', '!', ':', ';'];

/// Splits a string into tokens and joins them back into a normal form.
pub trait Tokenizer {
    /// Split a string into tokens.
    fn tokenize(&self, s: &str) -> Vec<String>;

    /// Canonical form: tokens rejoined with single spaces.
    fn normalize(&self, s: &str) -> String {
        self.tokenize(s).join(" ")
    }
}

/// Whitespace tokenizer that emits boundary characters as their own
/// tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl WordTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, s: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut buf = String::new();

        for c in s.chars() {
            if c.is_whitespace() {
                flush(&mut buf, &mut out);
            } else if BOUNDARY_CHARS.contains(&c) {
                flush(&mut buf, &mut out);
                out.push(c.to_string());
            } else {
                buf.push(c);
            }
        }
        flush(&mut buf, &mut out);

        out
    }
}

/// Tokenizer for pre-chunked input where segments are delimited by a
/// literal `<SEP>` marker. Input without the marker is a single token.
#[derive(Debug, Clone, Copy, Default)]
pub struct SepTokenizer;

/// Segment delimiter recognized by [`SepTokenizer`].
pub const SEP_MARKER: &str = "<SEP>";

impl SepTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for SepTokenizer {
    fn tokenize(&self, s: &str) -> Vec<String> {
        if s.is_empty() {
            return Vec::new();
        }
        if !s.contains(SEP_MARKER) {
            return vec![s.to_string()];
        }

        s.split(SEP_MARKER)
            .map(str::trim)
            .filter(|seg| !seg.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn flush(buf: &mut String, out: &mut Vec<String>) {
    if !buf.is_empty() {
        out.push(std::mem::take(buf));
    }
}

/// Check that a string can be tokenized: non-empty and free of NUL
/// bytes.
pub fn validate_input(s: &str) -> Result<()> {
    if s.is_empty() {
        return Err(SyngramError::InvalidInput(
            "cannot tokenize empty string".to_string(),
        ));
    }
    if s.contains('\0') {
        return Err(SyngramError::InvalidInput(
            "cannot tokenize string containing NUL byte".to_string(),
        ));
    }
    Ok(())
}
