//! # hunt-embeddings
//!
//! Local sentence embeddings for the Hunt Console using Candle.
//!
//! Notes on a hunt's canvas are embedded so the layout engine can place
//! related notes near each other, without any external API calls.
//!
//! ## Features
//! - Local inference via Candle
//! - all-MiniLM-L6-v2 model (384 dimensions, mean pooled, unit length)
//! - Model files fetched once from the Hugging Face Hub, then cached
//! - A table-driven model for deterministic tests

pub mod cache;
pub mod candle;
pub mod error;
pub mod model;
pub mod table;

pub use crate::candle::{CandleEmbedder, EMBEDDING_DIM};
pub use cache::{get_or_download_model, ModelCache, ModelPaths, DEFAULT_MODEL_REPO, MODEL_FILES};
pub use error::EmbeddingError;
pub use model::{Embedding, EmbeddingModel, ModelInfo};
pub use table::TableEmbedder;
