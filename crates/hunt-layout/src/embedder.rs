//! Degradation-safe wrapper around an embedding model.

use std::sync::Arc;

use hunt_embeddings::{Embedding, EmbeddingModel};
use tracing::{debug, warn};

/// Minimum trimmed character count worth embedding.
pub const DEFAULT_MIN_TEXT_LENGTH: usize = 3;

/// Whether `text` has at least `min_text_length` characters once trimmed.
pub fn long_enough(text: &str, min_text_length: usize) -> bool {
    text.trim().chars().count() >= min_text_length
}

/// Turns note text into embeddings, or `None` when it can't.
///
/// `None` covers a model that failed to load, text that is too short once
/// trimmed, and errors raised by the model while encoding. The cause is
/// logged, never returned.
#[derive(Clone)]
pub struct TextEmbedder {
    model: Option<Arc<dyn EmbeddingModel>>,
    min_text_length: usize,
}

impl TextEmbedder {
    pub fn new(model: Arc<dyn EmbeddingModel>, min_text_length: usize) -> Self {
        Self {
            model: Some(model),
            min_text_length,
        }
    }

    /// An embedder with no model behind it. Every text yields `None`.
    pub fn unavailable() -> Self {
        Self {
            model: None,
            min_text_length: DEFAULT_MIN_TEXT_LENGTH,
        }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    /// Whether `text` is long enough to embed.
    pub fn accepts(&self, text: &str) -> bool {
        long_enough(text, self.min_text_length)
    }

    /// Embed the trimmed text.
    pub fn embed(&self, text: &str) -> Option<Embedding> {
        let model = self.model.as_ref()?;

        if !self.accepts(text) {
            debug!(min_len = self.min_text_length, "Text too short to embed");
            return None;
        }

        match model.embed(text.trim()) {
            Ok(embedding) => Some(embedding),
            Err(e) => {
                warn!(error = %e, "Embedding failed");
                None
            }
        }
    }
}

impl std::fmt::Debug for TextEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextEmbedder")
            .field("model", &self.model.as_ref().map(|m| m.info().name.clone()))
            .field("min_text_length", &self.min_text_length)
            .finish()
    }
}
