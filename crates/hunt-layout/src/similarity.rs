//! Bounded similarity between note texts.

use std::cell::RefCell;
use std::collections::HashMap;

use hunt_embeddings::Embedding;
use tracing::warn;

use crate::embedder::TextEmbedder;

/// Cosine similarity collapsed into [0, 1].
///
/// Dimension mismatch, zero vectors and NaN all give 0.0. Negative
/// similarity is treated as unrelated.
pub fn clamped_cosine(a: &Embedding, b: &Embedding) -> f32 {
    match a.cosine_similarity(b) {
        Some(sim) if sim.is_finite() => sim.clamp(0.0, 1.0),
        Some(sim) => {
            warn!(sim, "Non-finite similarity");
            0.0
        }
        None => {
            warn!(
                a_dim = a.dimension(),
                b_dim = b.dimension(),
                "Similarity undefined for these embeddings"
            );
            0.0
        }
    }
}

/// Scores pairs of texts, embedding each distinct text at most once.
///
/// Meant to live for a single placement or analysis call. Embeddings depend
/// only on the trimmed text, so reusing them within a call changes nothing
/// observable.
pub struct SimilarityScorer<'a> {
    embedder: &'a TextEmbedder,
    memo: RefCell<HashMap<String, Option<Embedding>>>,
}

impl<'a> SimilarityScorer<'a> {
    pub fn new(embedder: &'a TextEmbedder) -> Self {
        Self {
            embedder,
            memo: RefCell::new(HashMap::new()),
        }
    }

    /// Embedding for `text`, computed on first request.
    pub fn embedding(&self, text: &str) -> Option<Embedding> {
        let key = text.trim();
        if let Some(cached) = self.memo.borrow().get(key) {
            return cached.clone();
        }

        let embedding = self.embedder.embed(key);
        self.memo
            .borrow_mut()
            .insert(key.to_string(), embedding.clone());
        embedding
    }

    /// Similarity of two texts in [0, 1]; 0.0 if either can't be embedded.
    pub fn similarity(&self, a: &str, b: &str) -> f32 {
        match (self.embedding(a), self.embedding(b)) {
            (Some(ea), Some(eb)) => clamped_cosine(&ea, &eb),
            _ => 0.0,
        }
    }

    /// Number of distinct texts seen so far.
    pub fn cached(&self) -> usize {
        self.memo.borrow().len()
    }
}
