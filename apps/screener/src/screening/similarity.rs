//! Similarity Scorer: skill coverage measured in embedding space.
//!
//! Algorithm:
//! 1. Embed required and candidate skills (one batched backend call each).
//! 2. For every required skill take the best cosine similarity over all
//!    candidate skills; it is a hit when similarity ≥ τ.
//! 3. score = hits / required, clamped to [0, 1]; 1.0 when nothing is required.
//!
//! Backend failures propagate as `EmbeddingUnavailable`. They are never
//! turned into a default score.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::embedding::{cosine_similarity, EmbeddingBackend};
use crate::errors::ScreenError;
use crate::screening::score::{Dimension, DimensionScore};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.75;

/// Best candidate skill found for one required skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub required: String,
    pub best_candidate: Option<String>,
    pub similarity: f64,
    pub hit: bool,
}

/// Skills dimension together with the per-skill matches it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillsAssessment {
    pub dimension: DimensionScore,
    pub matches: Vec<SkillMatch>,
}

impl SkillsAssessment {
    fn from_matches(matches: Vec<SkillMatch>) -> Self {
        Self {
            dimension: skills_dimension(&matches),
            matches,
        }
    }

    /// Required skills that cleared the threshold, in requirement order.
    pub fn matching_skills(&self) -> Vec<String> {
        self.required_where(true)
    }

    /// Required skills with no candidate skill above the threshold.
    pub fn missing_skills(&self) -> Vec<String> {
        self.required_where(false)
    }

    fn required_where(&self, hit: bool) -> Vec<String> {
        self.matches
            .iter()
            .filter(|m| m.hit == hit)
            .map(|m| m.required.clone())
            .collect()
    }
}

/// Scores candidate skills against required skills. Each backend call is
/// bounded by `call_timeout`; expiry counts as the backend being unavailable.
pub async fn score_skills(
    backend: &dyn EmbeddingBackend,
    candidate_skills: &[String],
    required_skills: &[String],
    threshold: f64,
    call_timeout: Duration,
) -> Result<SkillsAssessment, ScreenError> {
    if required_skills.is_empty() {
        return Ok(SkillsAssessment::from_matches(Vec::new()));
    }

    let matches = if candidate_skills.is_empty() {
        required_skills
            .iter()
            .map(|required| SkillMatch {
                required: required.clone(),
                best_candidate: None,
                similarity: 0.0,
                hit: false,
            })
            .collect::<Vec<_>>()
    } else {
        let required_vectors = embed_with_timeout(backend, required_skills, call_timeout).await?;
        let candidate_vectors =
            embed_with_timeout(backend, candidate_skills, call_timeout).await?;
        match_skills(
            required_skills,
            &required_vectors,
            candidate_skills,
            &candidate_vectors,
            threshold,
        )
    };

    Ok(SkillsAssessment::from_matches(matches))
}

async fn embed_with_timeout(
    backend: &dyn EmbeddingBackend,
    texts: &[String],
    call_timeout: Duration,
) -> Result<Vec<Vec<f32>>, ScreenError> {
    let vectors = tokio::time::timeout(call_timeout, backend.embed_batch(texts))
        .await
        .map_err(|_| {
            ScreenError::EmbeddingUnavailable(format!(
                "{} backend timed out after {}s",
                backend.name(),
                call_timeout.as_secs_f64()
            ))
        })??;

    if vectors.len() != texts.len() {
        return Err(ScreenError::EmbeddingUnavailable(format!(
            "{} backend returned {} vectors for {} texts",
            backend.name(),
            vectors.len(),
            texts.len()
        )));
    }
    Ok(vectors)
}

/// Pairs each required skill with its most similar candidate skill.
/// Ties keep the earliest candidate skill.
pub fn match_skills(
    required: &[String],
    required_vectors: &[Vec<f32>],
    candidates: &[String],
    candidate_vectors: &[Vec<f32>],
    threshold: f64,
) -> Vec<SkillMatch> {
    required
        .iter()
        .zip(required_vectors)
        .map(|(skill, required_vec)| {
            let best = candidates
                .iter()
                .zip(candidate_vectors)
                .map(|(candidate, vec)| (candidate, cosine_similarity(required_vec, vec) as f64))
                .fold(None::<(&String, f64)>, |best, (candidate, sim)| match best {
                    Some((_, best_sim)) if best_sim >= sim => best,
                    _ => Some((candidate, sim)),
                });

            let (best_candidate, similarity) = match best {
                Some((candidate, sim)) => (Some(candidate.clone()), sim),
                None => (None, 0.0),
            };

            SkillMatch {
                required: skill.clone(),
                best_candidate,
                similarity,
                hit: similarity >= threshold,
            }
        })
        .collect()
}

/// Turns skill matches into the skills `DimensionScore` with an audit rationale.
pub fn skills_dimension(matches: &[SkillMatch]) -> DimensionScore {
    if matches.is_empty() {
        return DimensionScore::new(
            Dimension::Skills,
            1.0,
            "No required skills given; vacuously satisfied.",
        );
    }

    let hits = matches.iter().filter(|m| m.hit).count();
    let value = hits as f64 / matches.len() as f64;

    let describe = |m: &SkillMatch| match &m.best_candidate {
        Some(candidate) if candidate.eq_ignore_ascii_case(&m.required) => {
            format!("{} ({:.2})", m.required, m.similarity)
        }
        Some(candidate) => format!("{} ({:.2} via '{}')", m.required, m.similarity, candidate),
        None => format!("{} (0.00, no candidate skills)", m.required),
    };

    let matched: Vec<String> = matches.iter().filter(|m| m.hit).map(describe).collect();
    let unmatched: Vec<String> = matches.iter().filter(|m| !m.hit).map(describe).collect();

    let mut rationale = format!("Matched {hits}/{} required skills.", matches.len());
    if !matched.is_empty() {
        rationale.push_str(&format!(" Matched: {}.", matched.join(", ")));
    }
    if !unmatched.is_empty() {
        rationale.push_str(&format!(" Unmatched: {}.", unmatched.join(", ")));
    }

    DimensionScore::new(Dimension::Skills, value, rationale)
}
