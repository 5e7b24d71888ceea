// System status display: shows configuration and model availability.

use std::path::Path;

use crate::config::Config;
use crate::embedding::download::embedding_files_present;

/// Display configuration and model status to the terminal.
pub fn show(config: &Config) {
    println!("Embedder: {}", config.embedder);
    println!(
        "Ranking: top {} candidates, {} entries per section",
        config.top_k, config.max_items
    );
    println!(
        "TF-IDF: {} max features, mini-fit fallback {}",
        config.max_features,
        if config.allow_mini_fit { "enabled" } else { "disabled" }
    );

    let model_dir = config.semantic_model_dir();
    if embedding_files_present(&config.model_dir) {
        let size = dir_size(&model_dir)
            .map(format_bytes)
            .unwrap_or_else(|| "unknown".to_string());
        println!("Sentence model: {} ({})", model_dir.display(), size);
    } else {
        println!("Sentence model: not downloaded");
        println!("  Run `banca download-model` to enable --embedder semantic");
    }
}

fn dir_size(dir: &Path) -> Option<u64> {
    let entries = std::fs::read_dir(dir).ok()?;
    Some(
        entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.metadata().ok())
            .filter(|m| m.is_file())
            .map(|m| m.len())
            .sum(),
    )
}

/// Format byte count as human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
