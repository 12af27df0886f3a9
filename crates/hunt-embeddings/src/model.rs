//! Embedding model trait and types.
//!
//! Defines the interface for turning note text into dense vectors.

use crate::error::EmbeddingError;

/// Dense vector representation of a piece of text.
///
/// Values are kept as produced by the model; [`Embedding::cosine_similarity`]
/// divides by both norms so callers never rely on unit length.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Copy of this embedding scaled to unit length.
    /// A zero vector is returned unchanged.
    pub fn normalized(&self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            Self::new(self.values.iter().map(|x| x / norm).collect())
        } else {
            self.clone()
        }
    }

    /// Get the embedding dimension
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Euclidean length
    pub fn norm(&self) -> f32 {
        self.values.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Cosine similarity in [-1, 1].
    ///
    /// Returns `None` on dimension mismatch or when either vector has zero
    /// length, since the ratio is undefined there.
    pub fn cosine_similarity(&self, other: &Embedding) -> Option<f32> {
        if self.values.len() != other.values.len() {
            return None;
        }

        let dot: f32 = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .sum();
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            return None;
        }
        Some(dot / denom)
    }
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Model name (e.g., "all-MiniLM-L6-v2")
    pub name: String,
    /// Embedding dimension
    pub dimension: usize,
    /// Maximum sequence length in tokens
    pub max_sequence_length: usize,
}

/// Trait for embedding models.
///
/// Implementations must be thread-safe (Send + Sync); a loaded model is
/// shared read-only for the life of the process.
pub trait EmbeddingModel: Send + Sync {
    /// Get model information
    fn info(&self) -> &ModelInfo;

    /// Generate embedding for a single text.
    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;

    /// Generate embeddings for multiple texts (batch).
    /// Default implementation calls embed() for each text.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized() {
        let emb = Embedding::new(vec![3.0, 4.0]).normalized();
        // 3-4-5 triangle: normalized should be [0.6, 0.8]
        assert!((emb.values[0] - 0.6).abs() < 0.001);
        assert!((emb.values[1] - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_cosine_ignores_magnitude() {
        let emb1 = Embedding::new(vec![2.0, 0.0]);
        let emb2 = Embedding::new(vec![5.0, 5.0]);
        let sim = emb1.cosine_similarity(&emb2).unwrap();
        assert!((sim - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let emb1 = Embedding::new(vec![1.0, 0.0]);
        let emb2 = Embedding::new(vec![0.0, 1.0]);
        assert!(emb1.cosine_similarity(&emb2).unwrap().abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let emb1 = Embedding::new(vec![1.0, 0.0]);
        let emb2 = Embedding::new(vec![-1.0, 0.0]);
        assert!((emb1.cosine_similarity(&emb2).unwrap() + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_undefined() {
        let emb = Embedding::new(vec![1.0, 0.0]);
        assert_eq!(emb.cosine_similarity(&Embedding::new(vec![1.0, 0.0, 0.0])), None);
        assert_eq!(emb.cosine_similarity(&Embedding::new(vec![0.0, 0.0])), None);
    }
}
