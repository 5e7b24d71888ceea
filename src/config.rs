use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::corpus::DEFAULT_MAX_ITEMS;
use crate::embedding::download::{default_model_dir, embedding_files_present, embedding_model_dir};
use crate::embedding::traits::EmbedderKind;
use crate::scoring::ranker::DEFAULT_TOP_K;

/// Central configuration loaded from environment variables.
///
/// A .env file is loaded automatically at startup via dotenvy. Every value
/// has a default, and CLI flags override what is set here.
#[derive(Debug, Clone)]
pub struct Config {
    /// Which embedding strategy to use (BANCA_EMBEDDER, default tfidf)
    pub embedder: EmbedderKind,
    /// Directory holding downloaded models (BANCA_MODEL_DIR)
    pub model_dir: PathBuf,
    /// Size of the short list (BANCA_TOP_K)
    pub top_k: usize,
    /// Most recent entries kept per section (BANCA_MAX_ITEMS)
    pub max_items: usize,
    /// TF-IDF vocabulary bound (BANCA_MAX_FEATURES)
    pub max_features: usize,
    /// Score each profile with its own mini-fit instead of one global fit
    /// (BANCA_ALLOW_MINI_FIT)
    pub allow_mini_fit: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let embedder = match env::var("BANCA_EMBEDDER") {
            Ok(value) => value.parse().map_err(|e: String| anyhow::anyhow!(e))?,
            Err(_) => EmbedderKind::default(),
        };

        let model_dir = env::var("BANCA_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_model_dir());

        Ok(Self {
            embedder,
            model_dir,
            top_k: parse_var("BANCA_TOP_K", DEFAULT_TOP_K)?,
            max_items: parse_var("BANCA_MAX_ITEMS", DEFAULT_MAX_ITEMS)?,
            max_features: parse_var("BANCA_MAX_FEATURES", 8000)?,
            allow_mini_fit: parse_flag("BANCA_ALLOW_MINI_FIT"),
        })
    }

    /// Directory of the sentence encoder files.
    pub fn semantic_model_dir(&self) -> PathBuf {
        embedding_model_dir(&self.model_dir)
    }

    /// Check that the sentence encoder has been downloaded.
    /// Call this before loading the semantic embedder.
    pub fn require_semantic_model(&self) -> Result<()> {
        if !embedding_files_present(&self.model_dir) {
            anyhow::bail!(
                "Sentence embedding model not found in {}\n\
                 Run `banca download-model` to download it.\n\
                 Or set BANCA_EMBEDDER=tfidf to use the lexical model instead.",
                self.semantic_model_dir().display()
            );
        }
        Ok(())
    }
}

fn parse_var(name: &str, default: usize) -> Result<usize> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a positive integer, got '{value}'")),
        Err(_) => Ok(default),
    }
}

fn parse_flag(name: &str) -> bool {
    matches!(
        env::var(name).as_deref().map(str::trim),
        Ok("1") | Ok("true") | Ok("yes")
    )
}
