//! Corpus texts and the prefix/root/suffix triplet split.

use crate::corpus::{SyntacticTagger, Tokenizer};
use std::io::BufRead;
use tracing::debug;

/// One corpus expression and its decomposition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    /// Normalized surface text
    pub text: String,

    /// Portion preceding the root
    pub pre: String,

    /// The anchor chunk of the text
    pub root: String,

    /// Portion following the root
    pub suf: String,

    /// Chunks produced by transition chunking
    pub chunks: Vec<String>,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Read one expression per line, trimming whitespace and dropping
/// blank lines. The result is sorted and deduplicated.
pub fn read_texts<R: BufRead>(reader: R) -> std::io::Result<Vec<Text>> {
    let mut texts = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            texts.push(Text::new(trimmed));
        }
    }

    texts.sort_by(|a, b| a.text.cmp(&b.text));
    texts.dedup_by(|a, b| a.text == b.text);

    Ok(texts)
}

/// Split a text around the first chunk of `chunks` it contains.
///
/// `chunks` is expected in priority order (longest and most frequent
/// first, per [`collect_chunks`](crate::corpus::collect_chunks)). A
/// text containing none of them becomes all-root.
pub fn to_triplet(mut text: Text, chunks: &[String]) -> Text {
    let anchor = chunks.iter().find(|c| text.chunks.contains(c));

    let Some(anchor) = anchor else {
        text.root = text.text.clone();
        text.pre = String::new();
        text.suf = String::new();
        return text;
    };

    match text.text.split_once(anchor.as_str()) {
        Some((pre, suf)) => {
            text.pre = pre.trim().to_string();
            text.suf = suf.trim().to_string();
            text.root = anchor.clone();
        }
        None => {
            // Chunk came from this text's own chunking, so this only
            // happens if normalization diverged; fall back to all-root.
            debug!(text = %text.text, chunk = %anchor, "anchor chunk not found in text");
            text.root = text.text.clone();
        }
    }

    text
}

/// Keep only texts whose constituency signature is common in the
/// corpus.
///
/// Signature counts at or above the empirical `q`-quantile survive;
/// higher `q` removes more texts.
pub fn filter_texts<T: Tokenizer>(
    texts: Vec<Text>,
    tagger: &SyntacticTagger<T>,
    q: f64,
) -> Vec<Text> {
    use std::collections::HashMap;

    if texts.is_empty() {
        return texts;
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    let signatures: Vec<String> = texts
        .iter()
        .map(|t| {
            let (tags, _) = tagger.constituency(&t.text);
            let sig = tags.join("-");
            *counts.entry(sig.clone()).or_insert(0) += 1;
            sig
        })
        .collect();

    let mut values: Vec<f64> = signatures.iter().map(|s| counts[s] as f64).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    let threshold = empirical_quantile(&values, q);

    let before = texts.len();
    let kept: Vec<Text> = texts
        .into_iter()
        .zip(signatures)
        .filter(|(_, sig)| (counts[sig] as f64) >= threshold)
        .map(|(t, _)| t)
        .collect();
    debug!(before, after = kept.len(), q, "filtered texts by signature");
    kept
}

/// Smallest value whose empirical CDF is at least `q`. `values` must be
/// sorted ascending and non-empty.
fn empirical_quantile(values: &[f64], q: f64) -> f64 {
    let n = values.len();
    let idx = ((q * n as f64).ceil() as usize).clamp(1, n);
    values[idx - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{PosTagger, WordTokenizer};

    #[test]
    fn test_read_texts_dedupes_and_sorts() {
        let input = "b line\n\n  a line  \nb line\n";
        let texts = read_texts(input.as_bytes()).unwrap();
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0].text, "a line");
        assert_eq!(texts[1].text, "b line");
    }

    #[test]
    fn test_to_triplet() {
        let mut text = Text::new("turn on the kitchen lights");
        text.chunks = vec!["turn on".into(), "the kitchen lights".into()];
        let chunks = vec!["the kitchen lights".to_string(), "turn on".to_string()];

        let t = to_triplet(text, &chunks);
        assert_eq!(t.root, "the kitchen lights");
        assert_eq!(t.pre, "turn on");
        assert_eq!(t.suf, "");
    }

    #[test]
    fn test_to_triplet_no_match_is_all_root() {
        let text = Text::new("hello world");
        let t = to_triplet(text, &["absent".to_string()]);
        assert_eq!(t.root, "hello world");
        assert_eq!(t.pre, "");
        assert_eq!(t.suf, "");
    }

    #[test]
    fn test_empirical_quantile() {
        let vals = [1.0, 1.0, 2.0, 3.0];
        assert_eq!(empirical_quantile(&vals, 0.0), 1.0);
        assert_eq!(empirical_quantile(&vals, 0.5), 1.0);
        assert_eq!(empirical_quantile(&vals, 0.75), 2.0);
        assert_eq!(empirical_quantile(&vals, 1.0), 3.0);
    }

    #[test]
    fn test_filter_texts_keeps_common_signatures() {
        let tagger = SyntacticTagger::new(PosTagger::new(), WordTokenizer::new());
        let texts: Vec<Text> = ["the dog", "the cat", "the bird", "London walked quickly"]
            .iter()
            .map(|s| Text::new(*s))
            .collect();

        let kept = filter_texts(texts, &tagger, 0.75);
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().all(|t| t.text.starts_with("the")));
    }
}
