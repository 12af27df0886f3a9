//! Table-driven embedding model.
//!
//! Maps exact texts to fixed vectors, so similarities between notes can be
//! chosen by hand. Used in place of the pretrained model wherever results
//! must be deterministic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Embedding model backed by a lookup table.
///
/// Texts missing from the table fail with [`EmbeddingError::UnknownText`],
/// which stands in for a model error during encoding.
pub struct TableEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    calls: AtomicUsize,
    info: ModelInfo,
}

impl TableEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            vectors: HashMap::new(),
            calls: AtomicUsize::new(0),
            info: ModelInfo {
                name: "table".to_string(),
                dimension,
                max_sequence_length: usize::MAX,
            },
        }
    }

    /// Register the vector returned for `text`.
    pub fn with(mut self, text: impl Into<String>, values: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), values);
        self
    }

    /// Number of `embed` calls served so far, failures included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingModel for TableEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.vectors
            .get(text)
            .map(|values| Embedding::new(values.clone()))
            .ok_or_else(|| EmbeddingError::UnknownText(text.to_string()))
    }
}
