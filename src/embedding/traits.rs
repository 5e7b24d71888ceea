// Embedder trait: the seam between the scoring code and the model.
//
// Scoring only ever asks for "vectors for these texts" and "how long are your
// vectors". Fitting and model loading happen before an embedder exists, so a
// TextEmbedder is always ready to use and never mutated while scoring.

use crate::error::{BancaError, Result};

/// Maps text to vectors in one fixed embedding space.
pub trait TextEmbedder {
    /// Embed each text, returning vectors in the same order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>>;

    /// Length of every vector this embedder produces.
    fn dimension(&self) -> usize;

    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Vec<f64>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| BancaError::embedding("embedder returned no vector"))
    }
}

/// Which embedding strategy a run uses. Selected once, from config or CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmbedderKind {
    /// TF-IDF vocabulary fitted on the candidate profiles
    #[default]
    Lexical,
    /// Pretrained sentence encoder
    Semantic,
}

impl EmbedderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedderKind::Lexical => "tfidf",
            EmbedderKind::Semantic => "semantic",
        }
    }
}

impl std::str::FromStr for EmbedderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tfidf" | "tf-idf" | "lexical" => Ok(EmbedderKind::Lexical),
            "semantic" | "onnx" | "sentence" => Ok(EmbedderKind::Semantic),
            other => Err(format!(
                "unknown embedder '{other}' (expected 'tfidf' or 'semantic')"
            )),
        }
    }
}

impl std::fmt::Display for EmbedderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
