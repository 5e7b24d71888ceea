// Model download helper for the sentence encoder.
//
// Fetches paraphrase-multilingual-MiniLM-L12-v2 (ONNX export + tokenizer)
// from HuggingFace into a platform-appropriate directory
// (~/.local/share/banca/models/ on Linux) so it persists across runs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// HuggingFace repo for the sentence embedding model.
const EMBEDDING_HF_URL: &str =
    "https://huggingface.co/sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2/resolve/main";

/// Local directory name for the model files.
const EMBEDDING_MODEL_NAME: &str = "paraphrase-multilingual-MiniLM-L12-v2";

/// Remote paths within the repo.
const EMBEDDING_MODEL_FILE: &str = "onnx/model.onnx";
const EMBEDDING_TOKENIZER_FILE: &str = "tokenizer.json";

/// Returns the default directory for storing model files.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("banca")
        .join("models")
}

/// Subdirectory within `base` holding the sentence embedding model.
pub fn embedding_model_dir(base: &Path) -> PathBuf {
    base.join(EMBEDDING_MODEL_NAME)
}

/// Check whether both embedding model files exist under `base`.
pub fn embedding_files_present(base: &Path) -> bool {
    let embed_dir = embedding_model_dir(base);
    embed_dir.join("model.onnx").exists() && embed_dir.join("tokenizer.json").exists()
}

/// Download the sentence embedding model into `base`.
///
/// Skips files that already exist and creates directories as needed.
pub async fn download_model(base: &Path) -> Result<()> {
    let embed_dir = embedding_model_dir(base);
    std::fs::create_dir_all(&embed_dir).with_context(|| {
        format!(
            "Failed to create embedding model directory: {}",
            embed_dir.display()
        )
    })?;

    println!("\nSentence embedding model ({EMBEDDING_MODEL_NAME}):");

    let tokenizer_path = embed_dir.join("tokenizer.json");
    if tokenizer_path.exists() {
        info!("Embedding tokenizer already exists, skipping");
        println!("  tokenizer.json (already exists)");
    } else {
        println!("  Downloading tokenizer.json...");
        download_file(
            &format!("{}/{}", EMBEDDING_HF_URL, EMBEDDING_TOKENIZER_FILE),
            &tokenizer_path,
            false,
        )
        .await?;
    }

    let model_path = embed_dir.join("model.onnx");
    if model_path.exists() {
        info!("Embedding model already exists, skipping");
        println!("  model.onnx (already exists)");
    } else {
        println!("  Downloading model.onnx (~470 MB)...");
        download_file(
            &format!("{}/{}", EMBEDDING_HF_URL, EMBEDDING_MODEL_FILE),
            &model_path,
            true,
        )
        .await?;
    }

    Ok(())
}

/// Download a single file from a URL to a local path.
/// If `show_progress` is true, display a progress bar.
async fn download_file(url: &str, dest: &Path, show_progress: bool) -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Download failed with status {}: {}", response.status(), url);
    }

    let pb = if show_progress {
        Some(progress_bar(response.content_length())?)
    } else {
        None
    };

    let bytes = response
        .bytes()
        .await
        .context("Failed to read response body")?;

    if let Some(ref pb) = pb {
        pb.set_position(bytes.len() as u64);
    }

    // Write to a temp name first so an interrupted download never looks
    // like a complete model file.
    let partial = dest.with_extension("partial");
    std::fs::write(&partial, &bytes)
        .with_context(|| format!("Failed to write {}", partial.display()))?;
    std::fs::rename(&partial, dest)
        .with_context(|| format!("Failed to move {} into place", dest.display()))?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    info!("Downloaded {} to {}", url, dest.display());
    Ok(())
}

fn progress_bar(total_size: Option<u64>) -> Result<ProgressBar> {
    let pb = match total_size {
        Some(size) => {
            let pb = ProgressBar::new(size);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .context("Invalid progress bar template")?
                    .progress_chars("=> "),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("    {spinner} {bytes}")
                    .context("Invalid spinner template")?,
            );
            pb
        }
    };
    Ok(pb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_dir_is_under_banca() {
        let dir = default_model_dir();
        let path_str = dir.to_string_lossy();
        assert!(
            path_str.contains("banca") && path_str.contains("models"),
            "Expected path containing banca/models, got: {path_str}"
        );
    }

    #[test]
    fn test_embedding_model_dir_is_subdirectory() {
        let base = PathBuf::from("/tmp/test-models");
        assert_eq!(
            embedding_model_dir(&base),
            base.join("paraphrase-multilingual-MiniLM-L12-v2")
        );
    }

    #[test]
    fn test_embedding_files_present_false_when_empty() {
        let dir = std::env::temp_dir().join("banca-test-nonexistent");
        assert!(!embedding_files_present(&dir));
    }

    #[test]
    fn test_embedding_files_present_true_when_files_exist() {
        let dir = std::env::temp_dir().join("banca-embed-test");
        let embed_dir = embedding_model_dir(&dir);
        std::fs::create_dir_all(&embed_dir).unwrap();
        std::fs::write(embed_dir.join("model.onnx"), b"fake").unwrap();
        std::fs::write(embed_dir.join("tokenizer.json"), b"fake").unwrap();

        assert!(embedding_files_present(&dir));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
