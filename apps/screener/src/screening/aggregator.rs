//! Score Aggregator: weighted overall score plus a composite rationale.

use crate::errors::ScreenError;
use crate::screening::requirement::Weights;
use crate::screening::score::{DimensionScore, MatchResult, MatchStatus};

/// Weighted overall score: Σ weight × dimension value, clamped to [0, 1].
pub fn aggregate(
    skills: &DimensionScore,
    experience: &DimensionScore,
    education: &DimensionScore,
    weights: &Weights,
) -> f64 {
    (weights.skills * skills.value
        + weights.experience * experience.value
        + weights.education * education.value)
        .clamp(0.0, 1.0)
}

/// Joins the three rationales in fixed order: skills, experience, education.
pub fn compose_rationale(
    skills: &DimensionScore,
    experience: &DimensionScore,
    education: &DimensionScore,
) -> String {
    [skills, experience, education]
        .iter()
        .map(|d| format!("[{}] {}", d.name, d.rationale))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Assembles a `MatchResult` from the three dimension outcomes.
///
/// The first dimension error (checked in rationale order) short-circuits and
/// is returned as-is; a missing dimension is never scored as 0.
/// `caveats` non-empty gives `PartialFailure` instead of `Success`.
pub fn assemble(
    candidate_id: impl Into<String>,
    skills: Result<DimensionScore, ScreenError>,
    experience: Result<DimensionScore, ScreenError>,
    education: Result<DimensionScore, ScreenError>,
    weights: &Weights,
    caveats: &[&str],
) -> Result<MatchResult, ScreenError> {
    let skills = skills?;
    let experience = experience?;
    let education = education?;

    let overall_score = aggregate(&skills, &experience, &education, weights);
    let rationale = compose_rationale(&skills, &experience, &education);

    let status = if caveats.is_empty() {
        MatchStatus::Success
    } else {
        MatchStatus::PartialFailure {
            reason: format!("low confidence: {}", caveats.join(", ")),
        }
    };

    Ok(MatchResult {
        candidate_id: candidate_id.into(),
        overall_score,
        dimension_scores: vec![skills, experience, education],
        rationale,
        status,
        matching_skills: Vec::new(),
        missing_skills: Vec::new(),
    })
}
