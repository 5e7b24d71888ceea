// TF-IDF vectorizer: the lexical embedding strategy.
//
// A vocabulary of unigrams and bigrams is fitted on a corpus, keeping the
// `max_features` terms that occur most often. Each text is then projected onto
// that vocabulary: raw term counts weighted by smoothed inverse document
// frequency, L2-normalized so cosine similarity compares direction only.
//
//   idf(t) = ln((1 + n) / (1 + df(t))) + 1
//
// Two ways to fit:
//   - global: once over every candidate's texts, shared by all queries
//   - mini: a throwaway two-document fit (query vs. one profile), used when
//     no global vocabulary exists. Its vectors are only comparable within
//     that single fit.

use std::collections::{HashMap, HashSet};

use stop_words::{get, LANGUAGE};
use tracing::{debug, info};

use super::traits::TextEmbedder;
use crate::error::{BancaError, Result};

/// Vectorizer settings.
#[derive(Debug, Clone)]
pub struct TfIdfConfig {
    /// Upper bound on vocabulary size
    pub max_features: usize,
    /// Inclusive n-gram range, e.g. (1, 2) for unigrams and bigrams
    pub ngram_range: (usize, usize),
    pub lowercase: bool,
    /// Terms dropped before n-grams are formed
    pub stop_words: Vec<String>,
}

impl Default for TfIdfConfig {
    fn default() -> Self {
        Self {
            max_features: 8000,
            ngram_range: (1, 2),
            lowercase: true,
            stop_words: get(LANGUAGE::Portuguese),
        }
    }
}

impl TfIdfConfig {
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }
}

/// Splits text into the terms the vocabulary is built from.
#[derive(Debug, Clone)]
struct Analyzer {
    lowercase: bool,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
}

impl Analyzer {
    fn new(config: &TfIdfConfig) -> Self {
        let (min_n, max_n) = config.ngram_range;
        let min_n = min_n.max(1);
        Self {
            lowercase: config.lowercase,
            ngram_range: (min_n, max_n.max(min_n)),
            stop_words: config
                .stop_words
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
        }
    }

    /// Tokens are runs of two or more alphanumeric characters.
    fn tokens(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.chars().count() >= 2)
            .filter(|t| !self.stop_words.contains(&t.to_lowercase()))
            .map(str::to_string)
            .collect()
    }

    fn terms(&self, text: &str) -> Vec<String> {
        let tokens = self.tokens(text);
        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();

        for n in min_n..=max_n {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }

        terms
    }
}

/// A fitted TF-IDF vocabulary. Immutable once built.
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    analyzer: Analyzer,
    /// term -> feature index (indices follow alphabetical term order)
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    documents: usize,
}

impl TfIdfVectorizer {
    /// Fit a vocabulary over `corpus`, one document per entry.
    ///
    /// Fails if the corpus is empty or contains no usable terms (everything
    /// was a stop word or a single character).
    pub fn fit(corpus: &[String], config: &TfIdfConfig) -> Result<Self> {
        if corpus.is_empty() {
            return Err(BancaError::configuration(
                "cannot fit TF-IDF vocabulary on an empty corpus",
            ));
        }

        let analyzer = Analyzer::new(config);
        let mut term_counts: HashMap<String, u64> = HashMap::new();
        let mut doc_counts: HashMap<String, u64> = HashMap::new();

        for doc in corpus {
            let terms = analyzer.terms(doc);
            let mut seen: HashSet<&str> = HashSet::new();
            for term in &terms {
                *term_counts.entry(term.clone()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *doc_counts.entry(term.clone()).or_insert(0) += 1;
                }
            }
        }

        if term_counts.is_empty() {
            return Err(BancaError::configuration(format!(
                "TF-IDF found no usable terms in {} documents",
                corpus.len()
            )));
        }

        // Keep the most frequent terms, ties broken alphabetically so the
        // selection is deterministic.
        let mut ranked: Vec<(String, u64)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(config.max_features.max(1));

        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let n = corpus.len() as f64;
        let idf: Vec<f64> = terms
            .iter()
            .map(|term| {
                let df = doc_counts.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vocabulary: HashMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(i, term)| (term, i))
            .collect();

        debug!(
            documents = corpus.len(),
            vocabulary = vocabulary.len(),
            "Fitted TF-IDF vocabulary"
        );

        Ok(Self {
            analyzer,
            vocabulary,
            idf,
            documents: corpus.len(),
        })
    }

    /// Fit a throwaway vocabulary on exactly two documents: the query text
    /// and everything one profile wrote.
    pub fn mini_fit(query_text: &str, profile_text: &str, config: &TfIdfConfig) -> Result<Self> {
        Self::fit(&[query_text.to_string(), profile_text.to_string()], config)
    }

    /// Project one text onto the vocabulary.
    ///
    /// Text with no vocabulary terms projects to the zero vector; cosine
    /// similarity treats that as no similarity.
    pub fn transform(&self, text: &str) -> Vec<f64> {
        let mut vector = vec![0.0_f64; self.idf.len()];

        for term in self.analyzer.terms(text) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                vector[idx] += 1.0;
            }
        }

        for (value, idf) in vector.iter_mut().zip(&self.idf) {
            *value *= idf;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        vector
    }

    pub fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }

    /// Number of documents the vocabulary was fitted on.
    pub fn documents(&self) -> usize {
        self.documents
    }

    /// Feature index of a term, if it made it into the vocabulary.
    pub fn feature_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Inverse document frequency of a vocabulary term.
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.feature_index(term).map(|i| self.idf[i])
    }
}

impl TextEmbedder for TfIdfVectorizer {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        Ok(texts.iter().map(|t| self.transform(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.vocabulary_len()
    }
}

/// Fit the global vocabulary, logging what it covers.
pub fn fit_global(corpus: &[String], config: &TfIdfConfig) -> Result<TfIdfVectorizer> {
    let vectorizer = TfIdfVectorizer::fit(corpus, config)?;
    info!(
        documents = vectorizer.documents(),
        vocabulary = vectorizer.vocabulary_len(),
        max_features = config.max_features,
        "Fitted global TF-IDF vocabulary"
    );
    Ok(vectorizer)
}
