//! Embedding backends: the vector space skills are compared in.
//!
//! `EmbeddingBackend` is the capability the similarity scorer depends on.
//! The engine holds an `Arc<dyn EmbeddingBackend>` shared read-only by all workers.

use async_trait::async_trait;
use tracing::warn;

use crate::errors::ScreenError;

pub mod hash_backend;
pub mod http_backend;

pub use hash_backend::HashEmbeddingBackend;
pub use http_backend::HttpEmbeddingBackend;

/// Embeds text into a fixed-dimension vector.
///
/// Implementations must be deterministic for deterministic inputs and safe to
/// call concurrently. An unreachable backend is `EmbeddingUnavailable`.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Backend label ("hash", "http") for logs.
    fn name(&self) -> &'static str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ScreenError>;

    /// Embeds many texts in one call. Default: one `embed` per text.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ScreenError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Cosine similarity clamped to [0, 1]. Opposed vectors count as unrelated.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        warn!(
            a_len = a.len(),
            b_len = b.len(),
            "embedding dimension mismatch; returning zero similarity"
        );
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors_are_one() {
        let a = vec![0.6, 0.8, 0.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_orthogonal_vectors_are_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_opposed_vectors_clamp_to_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_zero_vector_and_mismatch_are_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    struct Constant;

    #[async_trait]
    impl EmbeddingBackend for Constant {
        fn name(&self) -> &'static str {
            "constant"
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>, ScreenError> {
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    #[tokio::test]
    async fn test_default_batch_preserves_order() {
        let texts = vec!["a".to_string(), "abc".to_string()];
        let vectors = Constant.embed_batch(&texts).await.unwrap();
        assert_eq!(vectors, vec![vec![1.0, 1.0], vec![3.0, 1.0]]);
    }
}
