// Scoring pipeline: the entry point the CLI (or any caller) uses.
//
// Query + profiles + an embedding strategy in, ranked candidates out:
//
//   profiles -> corpus -> section vectors ─┐
//   query    -> query vector ──────────────┴-> section-wise cosine -> rank
//
// Lexical runs translate paper titles and the query before embedding, so
// every text lands in one language. Semantic runs skip translation: the
// encoder is multilingual. The two kinds of run are never mixed; every
// outcome records which one produced it.
//
// Only setup problems abort a run. Invalid records are rejected up front,
// and sections that fail to embed are scored as absent.

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::corpus::{ProfileCorpus, ProfileTexts, TextCorpusBuilder, DEFAULT_MAX_ITEMS};
use crate::embedding::tfidf::{fit_global, TfIdfConfig, TfIdfVectorizer};
use crate::embedding::traits::TextEmbedder;
use crate::error::{BancaError, DegradedSection, RejectedProfile, Result};
use crate::profile::{ProfileRecord, Query, QueryCombination, Section};
use crate::scoring::aggregate::{embed_query, embed_sections, SectionVectors};
use crate::scoring::ranker::{self, ScoredProfile};
use crate::scoring::similarity::{score_sections, SectionScores};
use crate::translate::blocks::{translate_text, DEFAULT_BLOCK_CHARS};
use crate::translate::traits::Translator;

/// Knobs shared by every strategy.
#[derive(Debug, Clone)]
pub struct RecommendOptions {
    /// Most recent entries kept per section
    pub max_items: usize,
    pub combination: QueryCombination,
    /// Translation request size in characters
    pub block_chars: usize,
    /// Vectorizer settings for global and mini fits
    pub tfidf: TfIdfConfig,
    /// Draw a progress bar while embedding profiles
    pub show_progress: bool,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            combination: QueryCombination::Mean,
            block_chars: DEFAULT_BLOCK_CHARS,
            tfidf: TfIdfConfig::default(),
            show_progress: false,
        }
    }
}

/// Which embedding space a ranking was computed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoringMode {
    /// One TF-IDF vocabulary fitted over all candidates
    GlobalFit,
    /// A throwaway TF-IDF vocabulary per (query, profile) pair
    MiniFit,
    /// Pretrained sentence encoder
    Semantic,
}

impl ScoringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMode::GlobalFit => "tf-idf (global fit)",
            ScoringMode::MiniFit => "tf-idf (mini-fit)",
            ScoringMode::Semantic => "semantic",
        }
    }
}

/// Embedding strategy for one run. Embedders are borrowed: they are built
/// once by the caller and only read here.
pub enum Strategy<'e> {
    /// TF-IDF. With no fitted vocabulary, falls back to per-profile
    /// mini-fits only when `allow_mini_fit` is set.
    Lexical {
        vectorizer: Option<&'e TfIdfVectorizer>,
        allow_mini_fit: bool,
    },
    /// Any pretrained encoder, typically `SentenceEmbedder`.
    Semantic(&'e dyn TextEmbedder),
}

/// Result of one scoring run.
#[derive(Debug, Clone, Serialize)]
pub struct RankingOutcome {
    /// Every valid profile, best match first
    pub ranking: Vec<ScoredProfile>,
    /// Records rejected before scoring
    pub rejected: Vec<RejectedProfile>,
    /// Sections scored as absent because embedding failed
    pub degraded: Vec<DegradedSection>,
    pub mode: ScoringMode,
}

impl RankingOutcome {
    pub fn top_k(&self, k: usize) -> &[ScoredProfile] {
        ranker::top_k(&self.ranking, k)
    }
}

/// Score and rank `profiles` against `query`.
///
/// `translator` is used by the lexical strategy only.
pub fn recommend(
    query: &Query,
    profiles: &[ProfileRecord],
    strategy: &Strategy<'_>,
    translator: Option<&dyn Translator>,
    options: &RecommendOptions,
) -> Result<RankingOutcome> {
    match strategy {
        Strategy::Lexical {
            vectorizer: None,
            allow_mini_fit: false,
        } => Err(BancaError::configuration(
            "TF-IDF vocabulary has not been fitted and mini-fit fallback is disabled",
        )),
        Strategy::Lexical {
            vectorizer: Some(vectorizer),
            ..
        } => {
            let corpus = lexical_corpus(profiles, translator, options);
            let query = translate_query(query, translator, options.block_chars);
            let query_vector = embed_query(*vectorizer, &query, options.combination)?;
            score_corpus(&corpus, *vectorizer, &query_vector, options, ScoringMode::GlobalFit)
        }
        Strategy::Lexical {
            vectorizer: None,
            allow_mini_fit: true,
        } => {
            let corpus = lexical_corpus(profiles, translator, options);
            let query = translate_query(query, translator, options.block_chars);
            Ok(score_mini_fit(&corpus, &query, options))
        }
        Strategy::Semantic(embedder) => {
            let corpus = TextCorpusBuilder::new()
                .max_items(options.max_items)
                .build(profiles);
            let query_vector = embed_query(*embedder, query, options.combination)?;
            score_corpus(&corpus, *embedder, &query_vector, options, ScoringMode::Semantic)
        }
    }
}

/// A global TF-IDF fit plus every profile's section vectors, computed once
/// and reused for any number of queries.
pub struct LexicalIndex {
    vectorizer: TfIdfVectorizer,
    entries: Vec<(ProfileRecord, SectionVectors)>,
    rejected: Vec<RejectedProfile>,
    combination: QueryCombination,
    block_chars: usize,
}

impl LexicalIndex {
    /// Build the corpus, fit the vocabulary on it and embed every profile.
    ///
    /// Fails when no valid profile has any text to fit on.
    pub fn build(
        profiles: &[ProfileRecord],
        translator: Option<&dyn Translator>,
        options: &RecommendOptions,
    ) -> Result<Self> {
        let corpus = lexical_corpus(profiles, translator, options);
        let vectorizer = fit_global(&corpus.global_texts(), &options.tfidf)?;

        // TF-IDF projection can't fail, so no section degrades here.
        let entries = corpus
            .entries
            .iter()
            .map(|entry| {
                let (vectors, _) = embed_sections(&vectorizer, entry);
                (entry.profile.clone(), vectors)
            })
            .collect();

        Ok(Self {
            vectorizer,
            entries,
            rejected: corpus.rejected,
            combination: options.combination,
            block_chars: options.block_chars,
        })
    }

    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank every indexed profile against `query`.
    pub fn rank(
        &self,
        query: &Query,
        translator: Option<&dyn Translator>,
    ) -> Result<RankingOutcome> {
        let query = translate_query(query, translator, self.block_chars);
        let query_vector = embed_query(&self.vectorizer, &query, self.combination)?;

        let scored = self
            .entries
            .iter()
            .map(|(profile, vectors)| {
                let (score, sections) = score_sections(&query_vector, vectors);
                ScoredProfile::new(profile.clone(), score, sections)
            })
            .collect();

        Ok(RankingOutcome {
            ranking: ranker::rank(scored),
            rejected: self.rejected.clone(),
            degraded: Vec::new(),
            mode: ScoringMode::GlobalFit,
        })
    }
}

fn lexical_corpus<'a>(
    profiles: &'a [ProfileRecord],
    translator: Option<&dyn Translator>,
    options: &RecommendOptions,
) -> ProfileCorpus<'a> {
    let builder = TextCorpusBuilder::new()
        .max_items(options.max_items)
        .block_chars(options.block_chars);
    match translator {
        Some(t) => builder.translator(t).build(profiles),
        None => builder.build(profiles),
    }
}

fn translate_query(
    query: &Query,
    translator: Option<&dyn Translator>,
    block_chars: usize,
) -> Query {
    match translator {
        Some(t) => Query::new(
            translate_text(t, &query.theme, block_chars),
            translate_text(t, &query.summary, block_chars),
        ),
        None => query.clone(),
    }
}

/// Score every corpus entry in one shared embedding space.
fn score_corpus(
    corpus: &ProfileCorpus<'_>,
    embedder: &dyn TextEmbedder,
    query_vector: &[f64],
    options: &RecommendOptions,
    mode: ScoringMode,
) -> Result<RankingOutcome> {
    if query_vector.len() != embedder.dimension() {
        return Err(BancaError::embedding(format!(
            "query vector has {} dimensions, embedder produces {}",
            query_vector.len(),
            embedder.dimension()
        )));
    }

    info!(
        profiles = corpus.len(),
        rejected = corpus.rejected.len(),
        mode = mode.as_str(),
        "Scoring profiles"
    );

    let pb = progress(corpus.len(), options.show_progress);
    let mut scored = Vec::with_capacity(corpus.len());
    let mut degraded = Vec::new();

    for entry in &corpus.entries {
        let (vectors, failures) = embed_sections(embedder, entry);
        let (score, sections) = score_sections(query_vector, &vectors);
        debug!(id = %entry.profile.id, score, present = sections.present_count(), "Scored profile");

        degraded.extend(failures);
        scored.push(ScoredProfile::new(entry.profile.clone(), score, sections));
        if let Some(ref pb) = pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    Ok(RankingOutcome {
        ranking: ranker::rank(scored),
        rejected: corpus.rejected.clone(),
        degraded,
        mode,
    })
}

/// Score each profile in its own two-document vocabulary.
fn score_mini_fit(
    corpus: &ProfileCorpus<'_>,
    query: &Query,
    options: &RecommendOptions,
) -> RankingOutcome {
    info!(
        profiles = corpus.len(),
        rejected = corpus.rejected.len(),
        mode = ScoringMode::MiniFit.as_str(),
        "Scoring profiles"
    );

    let query_text = format!("{} {}", query.theme, query.summary);
    let pb = progress(corpus.len(), options.show_progress);
    let mut scored = Vec::with_capacity(corpus.len());
    let mut degraded = Vec::new();

    for entry in &corpus.entries {
        let (score, sections) = match mini_fit_entry(entry, query, &query_text, options) {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    id = %entry.profile.id,
                    error = %e,
                    "Mini-fit failed, profile has no usable text"
                );
                for section in Section::ALL {
                    if !entry.section(section).is_empty() {
                        degraded.push(DegradedSection {
                            profile_id: entry.profile.id.clone(),
                            section,
                            reason: e.to_string(),
                        });
                    }
                }
                (0.0, SectionScores::default())
            }
        };

        debug!(id = %entry.profile.id, score, "Scored profile (mini-fit)");
        scored.push(ScoredProfile::new(entry.profile.clone(), score, sections));
        if let Some(ref pb) = pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    RankingOutcome {
        ranking: ranker::rank(scored),
        rejected: corpus.rejected.clone(),
        degraded,
        mode: ScoringMode::MiniFit,
    }
}

fn mini_fit_entry(
    entry: &ProfileTexts<'_>,
    query: &Query,
    query_text: &str,
    options: &RecommendOptions,
) -> Result<(f64, SectionScores)> {
    if entry.is_empty() {
        return Ok((0.0, SectionScores::default()));
    }

    let vectorizer = TfIdfVectorizer::mini_fit(query_text, &entry.joined(), &options.tfidf)?;
    let query_vector = embed_query(&vectorizer, query, options.combination)?;
    let (vectors, _) = embed_sections(&vectorizer, entry);
    Ok(score_sections(&query_vector, &vectors))
}

fn progress(len: usize, show: bool) -> Option<ProgressBar> {
    if !show {
        return None;
    }
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("  Profiles [{bar:30}] {pos}/{len} ({eta})")
    {
        pb.set_style(style);
    }
    Some(pb)
}
