// Sentence embedding with a multilingual MiniLM encoder.
//
// The encoder maps text in any of its training languages into a shared
// 384-dimensional space, so Portuguese themes and English paper titles can be
// compared without translating anything first. There is no fit step: once the
// model is loaded, embedding is a pure function of the text.
//
// The model runs locally via ONNX. Token states are mean-pooled by attention
// mask, matching how the model was trained.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::debug;

use super::traits::TextEmbedder;
use crate::error::BancaError;

/// Embedding dimension of the MiniLM-L12 encoder.
pub const EMBEDDING_DIM: usize = 384;

/// Longest token sequence fed to the encoder; longer text is truncated.
/// Matches the `max_seq_length` the model was published with.
const MAX_SEQ_LEN: usize = 128;

/// Sentence embedder backed by a local ONNX model.
///
/// Load once per run and share by reference. The session sits behind a
/// Mutex because ort inference takes `&mut self`.
pub struct SentenceEmbedder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    /// BERT exports take `token_type_ids`; XLM-RoBERTa exports don't.
    token_type_ids: bool,
}

impl SentenceEmbedder {
    /// Load the encoder and tokenizer from `model_dir`.
    ///
    /// Expects `model.onnx` and `tokenizer.json` in the directory.
    /// Run `banca download-model` first if they don't exist.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() {
            anyhow::bail!(
                "Embedding model not found: {}\nRun `banca download-model` to download it.",
                model_path.display()
            );
        }
        if !tokenizer_path.exists() {
            anyhow::bail!(
                "Embedding tokenizer not found: {}\nRun `banca download-model` to download it.",
                tokenizer_path.display()
            );
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| {
                format!(
                    "Failed to load embedding model from {}",
                    model_path.display()
                )
            })?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load embedding tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure tokenizer truncation: {}", e))?;

        let token_type_ids = declares_token_type_ids(session.inputs().iter().map(|i| i.name()));

        debug!(
            token_type_ids,
            "Loaded sentence embedding model from {}",
            model_dir.display()
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            token_type_ids,
        })
    }

    /// Embed a batch of texts into 384-dimensional vectors.
    ///
    /// An empty string is a valid input: it encodes to the special tokens
    /// only and yields a well-formed (if uninformative) vector.
    pub fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings: Vec<_> = texts
            .iter()
            .map(|t| {
                self.tokenizer
                    .encode(t.as_str(), true)
                    .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
            })
            .collect::<Result<Vec<_>>>()?;

        let batch_size = encodings.len();
        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        if max_len == 0 {
            return Ok(vec![vec![0.0; EMBEDDING_DIM]; batch_size]);
        }

        // Padded inputs: ids and type ids pad with 0, the mask marks real tokens.
        // Type ids are only sent to models that declare them.
        let mut input_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
        let mut attention_mask_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
        let mut token_type_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);

        for enc in &encodings {
            let ids = enc.get_ids();
            let mask = enc.get_attention_mask();
            let pad_len = max_len - ids.len();

            input_ids_flat.extend(ids.iter().map(|&id| id as i64));
            input_ids_flat.extend(std::iter::repeat_n(0i64, pad_len));
            attention_mask_flat.extend(mask.iter().map(|&m| m as i64));
            attention_mask_flat.extend(std::iter::repeat_n(0i64, pad_len));
            token_type_ids_flat.extend(std::iter::repeat_n(0i64, max_len));
        }

        let shape = [batch_size as i64, max_len as i64];

        let input_ids_tensor = Tensor::from_array((shape, input_ids_flat))
            .context("Failed to create input_ids tensor")?;
        let attention_mask_tensor = Tensor::from_array((shape, attention_mask_flat.clone()))
            .context("Failed to create attention_mask tensor")?;

        let mut inputs = ort::inputs! {
            "input_ids" => input_ids_tensor,
            "attention_mask" => attention_mask_tensor
        };
        if self.token_type_ids {
            let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids_flat))
                .context("Failed to create token_type_ids tensor")?;
            inputs.push(("token_type_ids".into(), token_type_ids_tensor.into()));
        }

        // Output is last_hidden_state: [batch, seq_len, EMBEDDING_DIM]
        let hidden_states = {
            let mut session = self
                .session
                .lock()
                .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

            let outputs = session
                .run(inputs)
                .context("Embedding ONNX inference failed")?;

            let (_shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .context("Failed to extract embedding output tensor")?;

            data.to_vec()
        };

        let expected = batch_size * max_len * EMBEDDING_DIM;
        if hidden_states.len() != expected {
            anyhow::bail!(
                "Unexpected encoder output size {} \
                 (expected {} for {} texts x {} tokens x {} dims)",
                hidden_states.len(),
                expected,
                batch_size,
                max_len,
                EMBEDDING_DIM
            );
        }

        let embeddings =
            mean_pool_tokens(&hidden_states, &attention_mask_flat, batch_size, max_len);

        debug!(
            batch_size = batch_size,
            dim = EMBEDDING_DIM,
            "Computed sentence embeddings"
        );

        Ok(embeddings)
    }
}

impl TextEmbedder for SentenceEmbedder {
    fn embed_batch(&self, texts: &[String]) -> crate::error::Result<Vec<Vec<f64>>> {
        self.encode(texts)
            .map_err(|e| BancaError::embedding(format!("{e:#}")))
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// Whether the model's declared inputs include `token_type_ids`.
fn declares_token_type_ids<'a>(input_names: impl IntoIterator<Item = &'a str>) -> bool {
    input_names.into_iter().any(|name| name == "token_type_ids")
}

/// Average token states per text, weighted by the attention mask.
///
/// `hidden` is laid out as [batch, seq_len, EMBEDDING_DIM]; `mask` as
/// [batch, seq_len]. Texts whose mask is all zero get the zero vector.
fn mean_pool_tokens(
    hidden: &[f32],
    mask: &[i64],
    batch_size: usize,
    seq_len: usize,
) -> Vec<Vec<f64>> {
    let mut embeddings = Vec::with_capacity(batch_size);

    for i in 0..batch_size {
        let mut sum = vec![0.0_f64; EMBEDDING_DIM];
        let mut mask_sum = 0.0_f64;

        for j in 0..seq_len {
            let mask_val = mask[i * seq_len + j] as f64;
            if mask_val > 0.0 {
                mask_sum += mask_val;
                let offset = (i * seq_len + j) * EMBEDDING_DIM;
                for (k, acc) in sum.iter_mut().enumerate() {
                    *acc += hidden[offset + k] as f64 * mask_val;
                }
            }
        }

        if mask_sum > 0.0 {
            for val in &mut sum {
                *val /= mask_sum;
            }
        }

        embeddings.push(sum);
    }

    embeddings
}
