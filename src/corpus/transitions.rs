//! Bigram transition probabilities and transition-based chunking.

use crate::corpus::Text;
use std::collections::HashMap;
use tracing::debug;

/// Successor-probability table over tokens or tags.
///
/// Each row is normalized so its probabilities sum to 1.
#[derive(Debug, Clone, Default)]
pub struct Transitions {
    probs: HashMap<String, HashMap<String, f64>>,
}

impl Transitions {
    /// Count bigram co-occurrences over the signature of every text and
    /// normalize counts into per-row probabilities.
    ///
    /// `split` maps a text to its unit sequence (tokens, POS tags, or
    /// constituency tags). A single-unit sequence records a transition
    /// into the empty string so the unit still appears in the table.
    pub fn collect<F>(texts: &[Text], split: F) -> Self
    where
        F: Fn(&str) -> Vec<String>,
    {
        let mut counts: HashMap<String, HashMap<String, f64>> = HashMap::new();

        for text in texts {
            let units = split(&text.text);
            match units.len() {
                0 => continue,
                1 => {
                    *counts
                        .entry(units[0].clone())
                        .or_default()
                        .entry(String::new())
                        .or_insert(0.0) += 1.0;
                }
                _ => {
                    for pair in units.windows(2) {
                        *counts
                            .entry(pair[0].clone())
                            .or_default()
                            .entry(pair[1].clone())
                            .or_insert(0.0) += 1.0;
                    }
                }
            }
        }

        let mut transitions = Self { probs: counts };
        transitions.normalize();
        debug!(rows = transitions.probs.len(), "collected transitions");
        transitions
    }

    /// Probability of `to` following `from`; 0 when the pair was never
    /// observed.
    pub fn probability(&self, from: &str, to: &str) -> f64 {
        self.probs
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    /// Normalize each row so its values sum to 1. Rows summing to 0 are
    /// emptied.
    fn normalize(&mut self) {
        for row in self.probs.values_mut() {
            let total: f64 = row.values().sum();
            if total == 0.0 {
                row.clear();
                continue;
            }
            for v in row.values_mut() {
                *v /= total;
            }
        }
    }
}

/// Split a unit sequence into chunks wherever the transition
/// probability between adjacent tags drops below `split_below`.
///
/// `units` carries the surface text, `tags` the signature the
/// transition table was built over; both must be index-aligned. Higher
/// thresholds produce smaller chunks.
pub fn transition_chunk(
    units: &[String],
    tags: &[String],
    transitions: &Transitions,
    split_below: f64,
) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    if units.is_empty() {
        return out;
    }

    for i in 0..units.len() {
        if i > 0 && transitions.probability(&tags[i - 1], &tags[i]) < split_below {
            flush_chunk(&mut current, &mut out);
        }
        current.push(&units[i]);
    }
    flush_chunk(&mut current, &mut out);

    out
}

fn flush_chunk(current: &mut Vec<&str>, out: &mut Vec<String>) {
    let joined = current.join(" ").trim().to_string();
    if !joined.is_empty() {
        out.push(joined);
    }
    current.clear();
}

/// All chunks across the corpus, ordered by token length descending,
/// then frequency descending, then lexicographic.
pub fn collect_chunks(texts: &[Text]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut chunks: Vec<String> = Vec::new();

    for text in texts {
        for chunk in &text.chunks {
            *counts.entry(chunk).or_insert(0) += 1;
            chunks.push(chunk.clone());
        }
    }

    chunks.sort_by(|a, b| {
        let len_a = a.split(' ').count();
        let len_b = b.split(' ').count();
        len_b
            .cmp(&len_a)
            .then_with(|| counts[b.as_str()].cmp(&counts[a.as_str()]))
            .then_with(|| a.cmp(b))
    });
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[&str]) -> Vec<Text> {
        lines.iter().map(|l| Text::new(*l)).collect()
    }

    fn tokens(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_rows_sum_to_one() {
        let t = Transitions::collect(
            &texts(&["a b c", "a b d", "a c"]),
            tokens,
        );
        let row: f64 = [t.probability("a", "b"), t.probability("a", "c")]
            .iter()
            .sum();
        assert!((row - 1.0).abs() < 1e-9);
        assert!((t.probability("a", "b") - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_singleton_records_empty_successor() {
        let t = Transitions::collect(&texts(&["solo"]), tokens);
        assert!((t.probability("solo", "") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unseen_probability_zero() {
        let t = Transitions::collect(&texts(&["a b"]), tokens);
        assert_eq!(t.probability("x", "y"), 0.0);
    }

    #[test]
    fn test_transition_chunk_splits_on_low_probability() {
        // "a b" always cohere; "b c" and "b d" each occur half the time.
        let t = Transitions::collect(&texts(&["a b c", "a b d"]), tokens);
        let units = tokens("a b c");
        let chunks = transition_chunk(&units, &units, &t, 0.75);
        assert_eq!(chunks, vec!["a b", "c"]);
    }

    #[test]
    fn test_transition_chunk_empty() {
        let t = Transitions::default();
        assert!(transition_chunk(&[], &[], &t, 0.5).is_empty());
    }

    #[test]
    fn test_transition_chunk_threshold_zero_keeps_whole() {
        let t = Transitions::collect(&texts(&["a b c"]), tokens);
        let units = tokens("a b c");
        assert_eq!(transition_chunk(&units, &units, &t, 0.0), vec!["a b c"]);
    }

    #[test]
    fn test_collect_chunks_ordering() {
        let mut ts = texts(&["x", "y", "z"]);
        ts[0].chunks = vec!["a b".into(), "q".into()];
        ts[1].chunks = vec!["q".into(), "r".into()];
        ts[2].chunks = vec!["q".into()];

        let chunks = collect_chunks(&ts);
        // longest first, then most frequent, then lexicographic
        assert_eq!(chunks[0], "a b");
        assert_eq!(chunks[1], "q");
        assert_eq!(*chunks.last().unwrap(), "r");
    }
}
