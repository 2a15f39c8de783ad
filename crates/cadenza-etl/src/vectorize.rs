//! TF-IDF text features for song metadata.
//!
//! Documents are lowercased and split into tokens of two or more word
//! characters. English stop words are dropped. Weights are raw term counts
//! times a smoothed inverse document frequency, and every row is
//! L2-normalised so that a dot product between rows is their cosine
//! similarity.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use anyhow::{Context, Result};
use cadenza_search::TfidfMatrix;
use regex::Regex;

const TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Common English function words that carry no similarity signal.
const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
    "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down",
    "during", "each", "else", "ever", "every", "few", "for", "from", "further", "had",
    "has", "have", "having", "he", "her", "here", "hers", "herself", "him", "himself",
    "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
    "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to",
    "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where",
    "which", "while", "who", "whom", "why", "will", "with", "would", "you", "your",
    "yours", "yourself", "yourselves",
];

/// Fits a vocabulary over a set of documents and produces their TF-IDF
/// matrix.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    token_pattern: Regex,
    stop_words: HashSet<String>,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// A vectorizer with the default token pattern and English stop words.
    pub fn new() -> Result<Self> {
        Ok(Self {
            token_pattern: Regex::new(TOKEN_PATTERN).context("Invalid token pattern")?,
            stop_words: ENGLISH_STOP_WORDS.iter().map(|w| (*w).to_string()).collect(),
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
        })
    }

    /// Replace the stop-word list. An empty list keeps every token.
    #[must_use]
    pub fn with_stop_words<S: AsRef<str>>(mut self, words: &[S]) -> Self {
        self.stop_words = words.iter().map(|w| w.as_ref().to_lowercase()).collect();
        self
    }

    /// Split a document into lowercase, non-stop-word tokens.
    pub fn tokenize(&self, document: &str) -> Vec<String> {
        let lowered = document.to_lowercase();
        self.token_pattern
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .filter(|token| !self.stop_words.contains(token))
            .collect()
    }

    /// Term to column mapping learned by the last fit, in sorted term order.
    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    /// Inverse document frequency per column.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Learn the vocabulary and IDF weights, then return the TF-IDF matrix
    /// with one row per document.
    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<TfidfMatrix> {
        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| self.tokenize(doc.as_ref()))
            .collect();

        let terms: BTreeSet<&str> = tokenized.iter().flatten().map(String::as_str).collect();
        self.vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(col, term)| (term.to_string(), col))
            .collect();

        let mut doc_freq = vec![0usize; self.vocabulary.len()];
        for tokens in &tokenized {
            let unique: BTreeSet<usize> = tokens
                .iter()
                .filter_map(|t| self.vocabulary.get(t).copied())
                .collect();
            for col in unique {
                doc_freq[col] += 1;
            }
        }

        let n_docs = documents.len() as f64;
        self.idf = doc_freq
            .iter()
            .map(|&df| ((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let mut indptr = Vec::with_capacity(tokenized.len() + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);

        for tokens in &tokenized {
            let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
            for token in tokens {
                if let Some(&col) = self.vocabulary.get(token) {
                    *counts.entry(col).or_insert(0.0) += 1.0;
                }
            }

            let weights: Vec<(usize, f64)> = counts
                .into_iter()
                .map(|(col, tf)| (col, tf * self.idf[col]))
                .collect();
            let norm = weights.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();

            for (col, weight) in weights {
                indices.push(col);
                data.push(if norm > 0.0 { weight / norm } else { weight });
            }
            indptr.push(indices.len());
        }

        log::info!(
            "Vectorized {} documents over {} terms",
            tokenized.len(),
            self.vocabulary.len()
        );

        TfidfMatrix::new(tokenized.len(), self.vocabulary.len(), indptr, indices, data)
            .context("Vectorizer produced an inconsistent matrix")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadenza_search::SimilaritySource;

    #[test]
    fn test_tokenize_lowercases_and_drops_stop_words() {
        let vectorizer = TfidfVectorizer::new().unwrap();
        assert_eq!(
            vectorizer.tokenize("Let It Be by The Beatles"),
            vec!["let", "beatles"]
        );
    }

    #[test]
    fn test_tokenize_skips_single_characters() {
        let vectorizer = TfidfVectorizer::new().unwrap().with_stop_words::<&str>(&[]);
        assert_eq!(vectorizer.tokenize("A b cd, ef!"), vec!["cd", "ef"]);
    }

    #[test]
    fn test_vocabulary_is_sorted() {
        let mut vectorizer = TfidfVectorizer::new().unwrap();
        vectorizer.fit_transform(&["zebra apple", "mango"]).unwrap();
        let terms: Vec<_> = vectorizer.vocabulary().keys().cloned().collect();
        assert_eq!(terms, vec!["apple", "mango", "zebra"]);
        assert_eq!(vectorizer.vocabulary()["apple"], 0);
    }

    #[test]
    fn test_smoothed_idf() {
        let mut vectorizer = TfidfVectorizer::new().unwrap();
        vectorizer.fit_transform(&["rock love", "rock", "jazz"]).unwrap();

        let rock = vectorizer.vocabulary()["rock"];
        let jazz = vectorizer.vocabulary()["jazz"];
        // idf = ln((1 + n) / (1 + df)) + 1
        assert!((vectorizer.idf()[rock] - ((4.0f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
        assert!((vectorizer.idf()[jazz] - (2.0f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let mut vectorizer = TfidfVectorizer::new().unwrap();
        let matrix = vectorizer
            .fit_transform(&["midnight blues guitar", "blues guitar solo", ""])
            .unwrap();
        let scores = matrix.row_scores(0).unwrap();
        assert!((scores[0] - 1.0).abs() < 1e-12);
        assert!(scores[1] > 0.0 && scores[1] < 1.0);
        assert_eq!(scores[2], 0.0, "empty document has no similarity");
    }

    #[test]
    fn test_shared_terms_score_higher() {
        let mut vectorizer = TfidfVectorizer::new().unwrap();
        let matrix = vectorizer
            .fit_transform(&[
                "summer love song",
                "summer love ballad",
                "winter storm anthem",
            ])
            .unwrap();
        let scores = matrix.row_scores(0).unwrap();
        assert!(scores[1] > scores[2]);
        assert_eq!(matrix.len(), 3);
    }
}
