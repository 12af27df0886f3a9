//! Sentence embeddings computed locally with Candle.
//!
//! Runs all-MiniLM-L6-v2 on the CPU: BERT forward pass, mean pooling over
//! real tokens, then scaling to unit length.

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use std::path::Path;
use tokenizers::{Encoding, Tokenizer};
use tracing::{debug, info};

use crate::cache::{get_or_download_model, ModelCache};
use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Output width of all-MiniLM-L6-v2
pub const EMBEDDING_DIM: usize = 384;

/// Longer inputs are truncated to this many tokens
pub const MAX_SEQ_LENGTH: usize = 256;

/// BERT sentence encoder running on the CPU.
pub struct CandleEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    info: ModelInfo,
}

impl CandleEmbedder {
    /// Load from the model cache, fetching files that are not there yet.
    pub fn load(cache: &ModelCache) -> Result<Self, EmbeddingError> {
        let paths = get_or_download_model(cache)?;
        Self::load_from_paths(&paths.config, &paths.tokenizer, &paths.weights)
    }

    pub fn load_from_paths(
        config_path: &Path,
        tokenizer_path: &Path,
        weights_path: &Path,
    ) -> Result<Self, EmbeddingError> {
        let device = Device::Cpu;

        let config: BertConfig = serde_json::from_slice(&std::fs::read(config_path)?)
            .map_err(|e| EmbeddingError::ModelNotFound(format!("bad model config: {}", e)))?;

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        // SAFETY: the weights file belongs to the model cache and is never
        // rewritten while mapped.
        let weights = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path.to_path_buf()], DType::F32, &device)?
        };
        let model = BertModel::load(weights, &config)?;

        info!(path = ?weights_path, dim = EMBEDDING_DIM, "Sentence model ready");

        Ok(Self {
            model,
            tokenizer,
            device,
            info: ModelInfo {
                name: "all-MiniLM-L6-v2".to_string(),
                dimension: EMBEDDING_DIM,
                max_sequence_length: MAX_SEQ_LENGTH,
            },
        })
    }

    fn to_tensor(&self, rows: Vec<u32>, width: usize) -> Result<Tensor, EmbeddingError> {
        let height = rows.len() / width.max(1);
        Ok(Tensor::from_vec(rows, (height, width), &self.device)?)
    }
}

/// Token ids and attention mask of a batch, right-padded to a common width.
struct PaddedBatch {
    ids: Vec<u32>,
    mask: Vec<u32>,
    width: usize,
}

fn pad_batch(encodings: &[Encoding], limit: usize) -> PaddedBatch {
    let width = encodings
        .iter()
        .map(|e| e.get_ids().len().min(limit))
        .max()
        .unwrap_or(0);

    let mut ids = Vec::with_capacity(encodings.len() * width);
    let mut mask = Vec::with_capacity(encodings.len() * width);
    for encoding in encodings {
        let len = encoding.get_ids().len().min(width);
        ids.extend_from_slice(&encoding.get_ids()[..len]);
        mask.extend_from_slice(&encoding.get_attention_mask()[..len]);
        ids.resize(ids.len() + width - len, 0);
        mask.resize(mask.len() + width - len, 0);
    }

    PaddedBatch { ids, mask, width }
}

/// Average token vectors, ignoring padding.
fn mean_pool(hidden: &Tensor, mask: &Tensor) -> Result<Tensor, EmbeddingError> {
    let weights = mask
        .unsqueeze(2)?
        .broadcast_as(hidden.shape())?
        .to_dtype(DType::F32)?;

    let summed = hidden.broadcast_mul(&weights)?.sum(1)?;
    let counts = weights.sum(1)?.clamp(1e-9, f64::MAX)?;

    Ok(summed.broadcast_div(&counts)?)
}

impl EmbeddingModel for CandleEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        self.embed_batch(&[text])?
            .pop()
            .ok_or(EmbeddingError::EmptyOutput)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        let batch = pad_batch(&encodings, MAX_SEQ_LENGTH);
        if batch.width == 0 {
            return Err(EmbeddingError::EmptyOutput);
        }
        debug!(count = texts.len(), tokens = batch.width, "Encoding batch");

        let input_ids = self.to_tensor(batch.ids, batch.width)?;
        let attention_mask = self.to_tensor(batch.mask, batch.width)?;
        let token_type_ids = input_ids.zeros_like()?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled: Vec<Vec<f32>> = mean_pool(&hidden, &attention_mask)?.to_vec2()?;

        Ok(pooled
            .into_iter()
            .map(|values| Embedding::new(values).normalized())
            .collect())
    }
}
