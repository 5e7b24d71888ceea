// Composition tests: verifying that the pipeline stages chain together.
//
// These tests exercise the data flow between modules:
//   ProfileRecord -> Corpus -> Embedder -> Section vectors -> Score -> Rank
// without any model download or network access. The semantic path runs on a
// small in-test embedder.

use banca::committee::Committee;
use banca::embedding::tfidf::TfIdfConfig;
use banca::embedding::traits::TextEmbedder;
use banca::error::{BancaError, InputError, Result};
use banca::pipeline::{recommend, LexicalIndex, RecommendOptions, ScoringMode, Strategy};
use banca::profile::{parse_profiles, ProfileRecord, Query, QueryCombination, Section};
use banca::scoring::aggregate::embed_query;
use banca::translate::traits::Translator;

fn options() -> RecommendOptions {
    RecommendOptions {
        tfidf: TfIdfConfig {
            stop_words: vec!["for".to_string(), "in".to_string(), "of".to_string()],
            ..TfIdfConfig::default()
        },
        ..RecommendOptions::default()
    }
}

fn deep_learning_researcher() -> ProfileRecord {
    let mut p = ProfileRecord::new("Ana Souza", "A");
    p.research_areas = vec!["Deep Learning".to_string(), "Neural Networks".to_string()];
    p.periodic_papers = vec![
        "Convolutional neural networks for image classification".to_string(),
        "Deep learning in medical imaging".to_string(),
    ];
    p
}

fn agricultural_economist() -> ProfileRecord {
    let mut p = ProfileRecord::new("Bruno Lima", "B");
    p.research_areas = vec!["Agricultural Economics".to_string()];
    p.periodic_papers = vec!["Crop pricing in rural markets".to_string()];
    p.projects = vec!["Soybean export policy".to_string()];
    p
}

fn ids(outcome: &banca::pipeline::RankingOutcome) -> Vec<&str> {
    outcome.ranking.iter().map(|s| s.profile.id.as_str()).collect()
}

// ============================================================
// Lexical pipeline: global fit
// ============================================================

#[test]
fn matching_researcher_ranks_first() {
    let profiles = vec![agricultural_economist(), deep_learning_researcher()];
    let index = LexicalIndex::build(&profiles, None, &options()).unwrap();
    let outcome = index
        .rank(&Query::theme_only("Deep learning for image classification"), None)
        .unwrap();

    assert_eq!(outcome.mode, ScoringMode::GlobalFit);
    assert_eq!(ids(&outcome), vec!["A", "B"]);
    assert!(outcome.ranking[0].score > outcome.ranking[1].score);
    assert_eq!(outcome.ranking[1].score, 0.0);
    assert!(outcome.ranking[1].has_signal());
}

#[test]
fn single_area_profiles_with_default_stop_words() {
    let mut a = ProfileRecord::new("Ana Souza", "A");
    a.research_areas = vec!["deep learning".to_string()];
    let mut b = ProfileRecord::new("Bruno Lima", "B");
    b.research_areas = vec!["agricultural economics".to_string()];
    let profiles = vec![a, b];

    let index = LexicalIndex::build(&profiles, None, &RecommendOptions::default()).unwrap();
    let outcome = index.rank(&Query::new("deep learning", ""), None).unwrap();

    assert_eq!(ids(&outcome), vec!["A", "B"]);
    assert!(outcome.ranking[0].score > outcome.ranking[1].score);
    assert!((outcome.ranking[0].score - 1.0).abs() < 1e-9);
    assert_eq!(outcome.ranking[1].score, 0.0);
}

#[test]
fn identical_profiles_keep_input_order() {
    let mut x = deep_learning_researcher();
    x.id = "X".to_string();
    let mut y = deep_learning_researcher();
    y.id = "Y".to_string();
    let profiles = vec![agricultural_economist(), x, y];

    let index = LexicalIndex::build(&profiles, None, &options()).unwrap();
    let outcome = index.rank(&Query::theme_only("neural networks"), None).unwrap();

    assert_eq!(ids(&outcome), vec!["X", "Y", "B"]);
    assert_eq!(outcome.ranking[0].score, outcome.ranking[1].score);
}

#[test]
fn ranking_is_idempotent() {
    let profiles = vec![agricultural_economist(), deep_learning_researcher()];
    let query = Query::new("Neural networks", "Image classification of crop diseases");

    let index = LexicalIndex::build(&profiles, None, &options()).unwrap();
    let first = recommend(
        &query,
        &profiles,
        &Strategy::Lexical {
            vectorizer: Some(index.vectorizer()),
            allow_mini_fit: false,
        },
        None,
        &options(),
    )
    .unwrap();
    let second = index.rank(&query, None).unwrap();
    let third = index.rank(&query, None).unwrap();

    for ((a, b), c) in first.ranking.iter().zip(&second.ranking).zip(&third.ranking) {
        assert_eq!(a.profile.id, b.profile.id);
        assert!((a.score - b.score).abs() < 1e-9);
        assert!((b.score - c.score).abs() < 1e-9);
    }
}

#[test]
fn profile_without_text_scores_zero_without_signal() {
    let profiles = vec![deep_learning_researcher(), ProfileRecord::new("Carla Dias", "C")];
    let index = LexicalIndex::build(&profiles, None, &options()).unwrap();
    let outcome = index.rank(&Query::theme_only("deep learning"), None).unwrap();

    let empty = &outcome.ranking[1];
    assert_eq!(empty.profile.id, "C");
    assert_eq!(empty.score, 0.0);
    assert!(!empty.has_signal());
}

#[test]
fn entries_beyond_ten_do_not_contribute() {
    let mut p = ProfileRecord::new("Davi Rocha", "D");
    p.periodic_papers = (0..10).map(|i| format!("hydrology study {i}")).collect();
    p.periodic_papers.push("quantum cryptography".to_string());
    let profiles = vec![p, deep_learning_researcher()];

    let index = LexicalIndex::build(&profiles, None, &options()).unwrap();
    assert!(index.vectorizer().feature_index("quantum").is_none());

    let outcome = index.rank(&Query::theme_only("quantum cryptography"), None).unwrap();
    assert!(outcome.ranking.iter().all(|s| s.score == 0.0));
}

#[test]
fn rejected_records_are_reported_not_scored() {
    let profiles = vec![
        deep_learning_researcher(),
        ProfileRecord::new("", "E"),
        agricultural_economist(),
    ];
    let index = LexicalIndex::build(&profiles, None, &options()).unwrap();
    let outcome = index.rank(&Query::theme_only("deep learning"), None).unwrap();

    assert_eq!(outcome.ranking.len(), 2);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].index, 1);
    assert_eq!(
        outcome.rejected[0].error,
        InputError::MissingName { id: "E".to_string() }
    );
}

#[test]
fn record_without_id_in_json_is_rejected_alone() {
    let json = r#"[
        {"name": "Ana Souza", "lattes_id": "A", "research_areas": ["deep learning"]},
        {"name": "Sem Id", "research_areas": ["deep learning"]},
        {"name": "Bruno Lima", "lattes_id": "B", "research_areas": ["crop pricing"]}
    ]"#;
    let profiles = parse_profiles(json).unwrap();

    let index = LexicalIndex::build(&profiles, None, &options()).unwrap();
    let outcome = index.rank(&Query::theme_only("deep learning"), None).unwrap();

    assert_eq!(ids(&outcome), vec!["A", "B"]);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].index, 1);
    assert_eq!(outcome.rejected[0].error, InputError::MissingId);
}

// ============================================================
// Lexical pipeline: mini-fit
// ============================================================

#[test]
fn mini_fit_and_global_fit_scores_are_bounded() {
    let profiles = vec![deep_learning_researcher(), agricultural_economist()];
    let query = Query::theme_only("Deep learning for crop pricing");

    let mini = recommend(
        &query,
        &profiles,
        &Strategy::Lexical {
            vectorizer: None,
            allow_mini_fit: true,
        },
        None,
        &options(),
    )
    .unwrap();
    let global = LexicalIndex::build(&profiles, None, &options())
        .unwrap()
        .rank(&query, None)
        .unwrap();

    assert_eq!(mini.mode, ScoringMode::MiniFit);
    for s in mini.ranking.iter().chain(&global.ranking) {
        assert!((0.0..=1.0).contains(&s.score), "score {} out of range", s.score);
    }
}

#[test]
fn unfitted_vectorizer_without_mini_fit_is_rejected() {
    let result = recommend(
        &Query::theme_only("deep learning"),
        &[deep_learning_researcher()],
        &Strategy::Lexical {
            vectorizer: None,
            allow_mini_fit: false,
        },
        None,
        &options(),
    );
    assert!(matches!(result, Err(BancaError::Configuration(_))));
}

// ============================================================
// Translation seam
// ============================================================

/// Replaces Portuguese words with English ones, failing on "falha".
struct Glossary;

impl Translator for Glossary {
    fn translate(&self, text: &str) -> anyhow::Result<String> {
        if text.contains("falha") {
            anyhow::bail!("translation service unavailable");
        }
        Ok(text
            .replace("aprendizado profundo", "deep learning")
            .replace("redes neurais", "neural networks"))
    }
}

#[test]
fn translated_papers_match_english_query() {
    let mut p = ProfileRecord::new("Elisa Prado", "F");
    p.periodic_papers = vec!["Aprendizado profundo com redes neurais".to_lowercase()];
    let profiles = vec![p, agricultural_economist()];

    let translator: &dyn Translator = &Glossary;
    let index = LexicalIndex::build(&profiles, Some(translator), &options()).unwrap();
    let outcome = index.rank(&Query::theme_only("deep learning"), Some(translator)).unwrap();

    assert_eq!(outcome.ranking[0].profile.id, "F");
    assert!(outcome.ranking[0].score > 0.0);
}

#[test]
fn failed_translation_keeps_original_text() {
    let mut p = ProfileRecord::new("Elisa Prado", "F");
    p.congress_papers = vec!["falha de sensores".to_string()];
    let profiles = vec![p];

    let translator: &dyn Translator = &Glossary;
    let index = LexicalIndex::build(&profiles, Some(translator), &options()).unwrap();
    assert!(index.vectorizer().feature_index("sensores").is_some());
}

// ============================================================
// Semantic pipeline
// ============================================================

/// Keyword-presence embedder: one dimension per keyword. Fails on text
/// containing "unreadable".
struct Keywords;

const KEYWORDS: [&str; 4] = ["learning", "neural", "crop", "market"];

impl TextEmbedder for Keywords {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        texts
            .iter()
            .map(|t| {
                let t = t.to_lowercase();
                if t.contains("unreadable") {
                    return Err(BancaError::embedding("encoder rejected input"));
                }
                Ok(KEYWORDS
                    .iter()
                    .map(|k| if t.contains(k) { 1.0 } else { 0.0 })
                    .collect())
            })
            .collect()
    }

    fn dimension(&self) -> usize {
        KEYWORDS.len()
    }
}

#[test]
fn semantic_pipeline_ranks_and_degrades_failed_sections() {
    let mut economist = agricultural_economist();
    economist.projects = vec!["unreadable scan".to_string()];
    let profiles = vec![economist, deep_learning_researcher()];

    let outcome = recommend(
        &Query::new("neural learning", "market effects"),
        &profiles,
        &Strategy::Semantic(&Keywords),
        None,
        &options(),
    )
    .unwrap();

    assert_eq!(outcome.mode, ScoringMode::Semantic);
    assert_eq!(outcome.ranking[0].profile.id, "A");
    assert_eq!(outcome.degraded.len(), 1);
    assert_eq!(outcome.degraded[0].profile_id, "B");
    assert_eq!(outcome.degraded[0].section, Section::Projects);

    let economist = &outcome.ranking[1];
    assert_eq!(economist.sections.get(Section::Projects), None);
    assert!(economist.sections.get(Section::PeriodicPapers).is_some());
}

#[test]
fn concatenated_query_matches_mean_for_theme_only() {
    let profiles = vec![deep_learning_researcher()];
    let theme_only = Query::theme_only("neural learning");
    let concatenate = RecommendOptions {
        combination: QueryCombination::Concatenate,
        ..options()
    };
    let strategy = Strategy::Semantic(&Keywords);

    let mean = recommend(&theme_only, &profiles, &strategy, None, &options()).unwrap();
    let concat = recommend(&theme_only, &profiles, &strategy, None, &concatenate).unwrap();
    assert!((mean.ranking[0].score - concat.ranking[0].score).abs() < 1e-12);
}

#[test]
fn concatenated_query_differs_from_mean_with_summary() {
    let profiles = vec![deep_learning_researcher()];
    let query = Query::new("neural learning", "neural crop");
    let concatenate = RecommendOptions {
        combination: QueryCombination::Concatenate,
        ..options()
    };
    let strategy = Strategy::Semantic(&Keywords);

    // theme [1, 1, 0, 0] and summary [0, 1, 1, 0] average to [0.5, 1, 0.5, 0]
    let mean_vector = embed_query(&Keywords, &query, QueryCombination::Mean).unwrap();
    assert_eq!(mean_vector, vec![0.5, 1.0, 0.5, 0.0]);
    let concat_vector = embed_query(&Keywords, &query, QueryCombination::Concatenate).unwrap();
    assert_eq!(concat_vector, vec![1.0, 1.0, 1.0, 0.0]);

    let mean = recommend(&query, &profiles, &strategy, None, &options()).unwrap();
    let concat = recommend(&query, &profiles, &strategy, None, &concatenate).unwrap();
    assert!((mean.ranking[0].score - concat.ranking[0].score).abs() > 1e-3);
}

#[test]
fn query_embedding_failure_aborts_run() {
    let result = recommend(
        &Query::theme_only("unreadable theme"),
        &[deep_learning_researcher()],
        &Strategy::Semantic(&Keywords),
        None,
        &options(),
    );
    assert!(matches!(result, Err(BancaError::Embedding(_))));
}

// ============================================================
// Ranking -> Committee
// ============================================================

#[test]
fn committee_is_drawn_from_top_of_ranking() {
    let mut c = ProfileRecord::new("Carla Dias", "C");
    c.research_areas = vec!["Neural networks".to_string()];
    let mut d = ProfileRecord::new("Davi Rocha", "D");
    d.research_areas = vec!["Image classification".to_string()];
    let profiles = vec![agricultural_economist(), c, deep_learning_researcher(), d];

    let query = Query::theme_only("Neural networks for image classification");
    let outcome = LexicalIndex::build(&profiles, None, &options())
        .unwrap()
        .rank(&query, None)
        .unwrap();

    let committee = Committee::propose(&query, &outcome.ranking, Some("A")).unwrap();
    let seats: Vec<&str> = committee
        .members()
        .iter()
        .map(|m| m.profile.id.as_str())
        .collect();
    assert_eq!(
        committee.advisor.as_ref().map(|a| a.profile.id.as_str()),
        Some("A")
    );
    assert!(!seats.contains(&"A"));
    assert_eq!(seats.last(), Some(&"B"));
}
