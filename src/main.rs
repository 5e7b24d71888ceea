use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{info, warn};

use banca::committee::Committee;
use banca::config::Config;
use banca::embedding::semantic::SentenceEmbedder;
use banca::embedding::tfidf::TfIdfConfig;
use banca::embedding::traits::EmbedderKind;
use banca::output::{markdown, terminal};
use banca::pipeline::{recommend, LexicalIndex, RankingOutcome, RecommendOptions, Strategy};
use banca::profile::{parse_profiles, ProfileRecord, Query, QueryCombination};
use banca::translate::traits::{IdentityTranslator, Translator};

/// Banca: thesis committee recommendation.
///
/// Ranks researcher profiles by how closely their publications, projects
/// and research areas match a thesis theme, and proposes a committee.
#[derive(Parser)]
#[command(name = "banca", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank candidate profiles against a thesis theme
    Rank {
        /// JSON file with an array of profile records
        #[arg(long)]
        profiles: PathBuf,

        /// Thesis title or theme
        #[arg(long)]
        theme: String,

        /// File holding the thesis summary (optional)
        #[arg(long)]
        summary_file: Option<PathBuf>,

        /// Embedding strategy: tfidf or semantic (default from BANCA_EMBEDDER)
        #[arg(long)]
        embedder: Option<EmbedderKind>,

        /// Fit a separate TF-IDF vocabulary per profile instead of one global fit
        #[arg(long)]
        mini_fit: bool,

        /// Embed theme and summary as one text instead of averaging them
        #[arg(long)]
        concatenate: bool,

        /// Number of candidates to highlight (default from BANCA_TOP_K)
        #[arg(long)]
        top_k: Option<usize>,

        /// Identifier of the advisor, left out of the committee seats
        #[arg(long)]
        advisor: Option<String>,

        /// Write a markdown report to this path
        #[arg(long)]
        report: Option<String>,
    },

    /// Download the multilingual sentence encoder (~470 MB)
    DownloadModel,

    /// Show configuration and model status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("banca=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Rank {
            profiles,
            theme,
            summary_file,
            embedder,
            mini_fit,
            concatenate,
            top_k,
            advisor,
            report,
        } => {
            let config = Config::load()?;
            let records = load_profiles(&profiles)?;
            let summary = match summary_file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read summary file {}", path.display()))?,
                None => String::new(),
            };
            let query = Query::new(theme, summary);
            let top_k = top_k.unwrap_or(config.top_k);

            let options = RecommendOptions {
                max_items: config.max_items,
                combination: if concatenate {
                    QueryCombination::Concatenate
                } else {
                    QueryCombination::Mean
                },
                tfidf: TfIdfConfig::default().with_max_features(config.max_features),
                show_progress: true,
                ..RecommendOptions::default()
            };

            info!(profiles = records.len(), "Loaded profile records");

            let outcome = match embedder.unwrap_or(config.embedder) {
                EmbedderKind::Lexical => {
                    rank_lexical(&query, &records, &options, mini_fit || config.allow_mini_fit)?
                }
                EmbedderKind::Semantic => {
                    config.require_semantic_model()?;
                    let model = SentenceEmbedder::load(&config.semantic_model_dir())?;
                    recommend(&query, &records, &Strategy::Semantic(&model), None, &options)?
                }
            };

            terminal::display_ranking(&outcome, top_k);
            terminal::display_rejected(&outcome.rejected);
            terminal::display_degraded(&outcome.degraded);

            let committee = Committee::propose(&query, &outcome.ranking, advisor.as_deref());
            match &committee {
                Some(c) => terminal::display_committee(c),
                None => warn!("Not enough candidates to propose a committee (need 3)"),
            }

            if let Some(path) = report {
                let written =
                    markdown::generate_report(&query, &outcome, committee.as_ref(), top_k, &path)?;
                println!("Report written to {}", written.bold());
            }
        }

        Commands::DownloadModel => {
            let config = Config::load()?;
            let model_dir = &config.model_dir;

            println!("Downloading sentence encoder...");
            println!("  Destination: {}", model_dir.display());

            banca::embedding::download::download_model(model_dir).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("You can now run `banca rank --embedder semantic`.");
        }

        Commands::Status => {
            let config = Config::load()?;
            banca::status::show(&config);
        }
    }

    Ok(())
}

fn load_profiles(path: &Path) -> Result<Vec<ProfileRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profiles from {}", path.display()))?;
    parse_profiles(&raw)
        .with_context(|| format!("{} is not a JSON array of profiles", path.display()))
}

/// Lexical ranking: one global TF-IDF fit, or per-profile mini-fits when
/// asked for.
fn rank_lexical(
    query: &Query,
    records: &[ProfileRecord],
    options: &RecommendOptions,
    mini_fit: bool,
) -> Result<RankingOutcome> {
    let translator: &dyn Translator = &IdentityTranslator;

    if mini_fit {
        let strategy = Strategy::Lexical {
            vectorizer: None,
            allow_mini_fit: true,
        };
        return Ok(recommend(query, records, &strategy, Some(translator), options)?);
    }

    let index = LexicalIndex::build(records, Some(translator), options)?;
    info!(
        profiles = index.len(),
        vocabulary = index.vectorizer().vocabulary_len(),
        "Fitted global TF-IDF vocabulary"
    );
    Ok(index.rank(query, Some(translator))?)
}
