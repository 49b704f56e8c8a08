//! Similarity measures used by the merge comparators: Levenshtein
//! similarity and TF-IDF cosine over a corpus vocabulary.

use crate::corpus::{Text, Tokenizer};
use crate::models::{Result, SyngramError};
use std::collections::HashMap;

/// Character-level Levenshtein similarity in `[0, 1]`.
pub fn char_levenshtein(s1: &str, s2: &str) -> f64 {
    if s1 == s2 {
        return 1.0;
    }
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(s1, s2)
}

/// Token-level Levenshtein similarity in `[0, 1]`.
pub fn token_levenshtein(s1: &[String], s2: &[String]) -> f64 {
    if s1 == s2 {
        return 1.0;
    }
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }
    let dist = strsim::generic_levenshtein(&s1.to_vec(), &s2.to_vec());
    1.0 - dist as f64 / s1.len().max(s2.len()) as f64
}

/// Sorted, deduplicated lowercase vocabulary of a corpus.
pub fn collect_vocab<T: Tokenizer>(texts: &[Text], tokenizer: &T) -> Vec<String> {
    let mut vocab: Vec<String> = texts
        .iter()
        .flat_map(|t| tokenizer.tokenize(&t.text.to_lowercase()))
        .collect();
    vocab.sort();
    vocab.dedup();
    vocab
}

/// Smoothed inverse document frequency per vocabulary token:
/// `ln(n / df + 1)`.
pub fn collect_idf<T: Tokenizer>(texts: &[Text], tokenizer: &T) -> HashMap<String, f64> {
    let mut df: HashMap<String, f64> = HashMap::new();

    for text in texts {
        let mut tokens = tokenizer.tokenize(&text.text.to_lowercase());
        tokens.sort();
        tokens.dedup();
        for token in tokens {
            *df.entry(token).or_insert(0.0) += 1.0;
        }
    }

    let n = texts.len() as f64;
    for v in df.values_mut() {
        *v = (n / *v + 1.0).ln();
    }
    df
}

/// Token count vector of `s` over `vocab`.
///
/// Unknown tokens and an empty vocabulary are errors.
pub fn count_embed<T: Tokenizer>(s: &str, vocab: &[String], tokenizer: &T) -> Result<Vec<f64>> {
    if vocab.is_empty() {
        return Err(SyngramError::InvalidInput("vocabulary is empty".to_string()));
    }

    let mut embedding = vec![0.0; vocab.len()];
    for token in tokenizer.tokenize(&s.to_lowercase()) {
        let idx = vocab
            .binary_search(&token)
            .map_err(|_| SyngramError::UnknownToken(token.clone()))?;
        embedding[idx] += 1.0;
    }
    Ok(embedding)
}

/// Reweight a count vector by term frequency times inverse document
/// frequency.
pub fn tfidf_transform(
    mut embedding: Vec<f64>,
    vocab: &[String],
    idf: &HashMap<String, f64>,
) -> Vec<f64> {
    let total: f64 = embedding.iter().sum();
    if total == 0.0 {
        return embedding;
    }

    for (i, value) in embedding.iter_mut().enumerate() {
        if *value == 0.0 {
            continue;
        }
        let tf = *value / total;
        let idf = idf.get(&vocab[i]).copied().unwrap_or(0.0);
        *value *= tf * idf;
    }
    embedding
}

/// Cosine similarity of two equal-length vectors. Zero vectors have
/// similarity 0.
pub fn cosine_similarity(v1: &[f64], v2: &[f64]) -> Result<f64> {
    if v1.len() != v2.len() {
        return Err(SyngramError::VectorLength {
            left: v1.len(),
            right: v2.len(),
        });
    }
    if v1 == v2 {
        return Ok(1.0);
    }

    let dot: f64 = v1.iter().zip(v2).map(|(a, b)| a * b).sum();
    let norm1 = v1.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm2 = v2.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm1 == 0.0 || norm2 == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm1 * norm2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::WordTokenizer;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_char_levenshtein() {
        assert_eq!(char_levenshtein("same", "same"), 1.0);
        assert_eq!(char_levenshtein("", "abc"), 0.0);
        assert!((char_levenshtein("kitten", "sitten") - 5.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_token_levenshtein() {
        assert_eq!(token_levenshtein(&toks("a b"), &toks("a b")), 1.0);
        assert_eq!(token_levenshtein(&[], &toks("a")), 0.0);
        assert!((token_levenshtein(&toks("a b c"), &toks("a x c")) - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_collect_vocab() {
        let texts = vec![Text::new("The dog"), Text::new("the cat")];
        let vocab = collect_vocab(&texts, &WordTokenizer::new());
        assert_eq!(vocab, vec!["cat", "dog", "the"]);
    }

    #[test]
    fn test_collect_idf() {
        let texts = vec![Text::new("the dog"), Text::new("the cat")];
        let idf = collect_idf(&texts, &WordTokenizer::new());
        // "the" appears in both documents, "dog" in one
        assert!((idf["the"] - (2.0f64 / 2.0 + 1.0).ln()).abs() < 1e-9);
        assert!((idf["dog"] - (2.0f64 / 1.0 + 1.0).ln()).abs() < 1e-9);
        assert!(idf["dog"] > idf["the"]);
    }

    #[test]
    fn test_count_embed() {
        let vocab: Vec<String> = ["cat", "dog", "the"].iter().map(|s| s.to_string()).collect();
        let v = count_embed("the dog the", &vocab, &WordTokenizer::new()).unwrap();
        assert_eq!(v, vec![0.0, 1.0, 2.0]);

        let err = count_embed("unknown", &vocab, &WordTokenizer::new()).unwrap_err();
        assert!(matches!(err, SyngramError::UnknownToken(_)));
    }

    #[test]
    fn test_cosine_similarity() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]).unwrap(), 1.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).unwrap(), 0.0);
        assert!(cosine_similarity(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_tfidf_pipeline() {
        let tok = WordTokenizer::new();
        let texts = vec![Text::new("the dog runs"), Text::new("the cat sits")];
        let vocab = collect_vocab(&texts, &tok);
        let idf = collect_idf(&texts, &tok);

        let v1 = tfidf_transform(count_embed("the dog runs", &vocab, &tok).unwrap(), &vocab, &idf);
        let v2 = tfidf_transform(count_embed("the dog runs", &vocab, &tok).unwrap(), &vocab, &idf);
        let v3 = tfidf_transform(count_embed("the cat sits", &vocab, &tok).unwrap(), &vocab, &idf);

        assert_eq!(cosine_similarity(&v1, &v2).unwrap(), 1.0);
        let cross = cosine_similarity(&v1, &v3).unwrap();
        assert!(cross < 1.0);
    }
}
