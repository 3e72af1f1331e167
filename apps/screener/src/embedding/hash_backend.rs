use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use siphasher::sip::SipHasher13;

use super::EmbeddingBackend;
use crate::errors::ScreenError;

/// Fixed keys so vectors are stable across runs and Rust versions.
/// Changing them changes every embedding.
const HASH_SEED_K0: u64 = 0x5c4e_e2d1_0b7a_3f19;
const HASH_SEED_K1: u64 = 0x91d3_7a0e_c4b2_68f5;

pub const DEFAULT_DIMENSION: usize = 512;

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Deterministic feature-hashing embedder. No model, no network.
///
/// Features are lowercase word tokens plus character trigrams of the
/// whitespace-collapsed text, so "PostgreSQL" and "postgres" share most of
/// their mass while "sql" and "python" share none.
#[derive(Debug, Clone)]
pub struct HashEmbeddingBackend {
    dimension: usize,
}

impl Default for HashEmbeddingBackend {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl HashEmbeddingBackend {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn hash_feature(&self, feature: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        feature.hash(&mut hasher);
        hasher.finish()
    }

    fn features(text: &str) -> Vec<(String, f32)> {
        let lowered = text.to_lowercase();
        let mut features: Vec<(String, f32)> = lowered
            .split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
            .filter(|w| !w.is_empty())
            .map(|w| (format!("w:{w}"), WORD_WEIGHT))
            .collect();

        let compact: Vec<char> = lowered
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .collect();
        for window in compact.windows(3) {
            let trigram: String = window.iter().collect();
            features.push((format!("g:{trigram}"), TRIGRAM_WEIGHT));
        }
        features
    }

    /// Synchronous core of `embed`.
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for (feature, weight) in Self::features(text) {
            let hash = self.hash_feature(&feature);
            let idx = (hash % self.dimension as u64) as usize;
            // Top bit picks the sign so collisions tend to cancel.
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign * weight;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingBackend for HashEmbeddingBackend {
    fn name(&self) -> &'static str {
        "hash"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ScreenError> {
        Ok(self.embed_sync(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::cosine_similarity;

    #[test]
    fn test_vectors_are_normalized() {
        let backend = HashEmbeddingBackend::default();
        let v = backend.embed_sync("machine learning");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "norm was {norm}");
        assert_eq!(v.len(), DEFAULT_DIMENSION);
    }

    #[test]
    fn test_deterministic_and_case_insensitive() {
        let backend = HashEmbeddingBackend::default();
        assert_eq!(backend.embed_sync("Python"), backend.embed_sync("python"));
        let sim = cosine_similarity(&backend.embed_sync("SQL"), &backend.embed_sync("sql"));
        assert!((sim - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_unrelated_skills_fall_below_default_threshold() {
        let backend = HashEmbeddingBackend::default();
        let sim = cosine_similarity(&backend.embed_sync("python"), &backend.embed_sync("sql"));
        assert!(sim < 0.75, "python vs sql was {sim}");
    }

    #[test]
    fn test_related_spellings_share_mass() {
        let backend = HashEmbeddingBackend::default();
        let related = cosine_similarity(
            &backend.embed_sync("postgresql"),
            &backend.embed_sync("postgres"),
        );
        let unrelated = cosine_similarity(
            &backend.embed_sync("postgresql"),
            &backend.embed_sync("kubernetes"),
        );
        assert!(related > unrelated, "related {related} vs unrelated {unrelated}");
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let backend = HashEmbeddingBackend::new(8);
        assert!(backend.embed_sync("   ").iter().all(|x| *x == 0.0));
    }
}
