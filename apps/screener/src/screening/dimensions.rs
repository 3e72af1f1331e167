//! Dimension Evaluator: rule-based experience and education scores.
//!
//! Pure functions: no I/O, no failure modes beyond rejecting invalid input.

use crate::errors::ScreenError;
use crate::screening::requirement::EducationLevel;
use crate::screening::score::{Dimension, DimensionScore};

/// Credit given when the candidate's years of experience are unknown.
pub const UNKNOWN_EXPERIENCE_SCORE: f64 = 0.5;

/// Score lost per ordinal education step below the requirement.
pub const EDUCATION_STEP_PENALTY: f64 = 0.25;

/// Experience score: `min(candidate / required, 1.0)`, or 1.0 when nothing is required.
/// Unknown years get `UNKNOWN_EXPERIENCE_SCORE` and a low-confidence rationale.
pub fn score_experience(
    candidate_years: Option<f64>,
    required_years: f64,
) -> Result<DimensionScore, ScreenError> {
    if !required_years.is_finite() || required_years < 0.0 {
        return Err(ScreenError::InvalidRequirement(format!(
            "required years of experience must be a non-negative number, got {required_years}"
        )));
    }

    let Some(years) = candidate_years else {
        return Ok(DimensionScore::new(
            Dimension::Experience,
            UNKNOWN_EXPERIENCE_SCORE,
            format!(
                "Years of experience unknown (low confidence); {required_years} required, \
                 partial credit given."
            ),
        ));
    };

    if !years.is_finite() || years < 0.0 {
        return Err(ScreenError::InvalidProfile(format!(
            "years of experience must be a non-negative number, got {years}"
        )));
    }

    if required_years == 0.0 {
        return Ok(DimensionScore::new(
            Dimension::Experience,
            1.0,
            format!("No minimum experience required; candidate has {years} years."),
        ));
    }

    let value = (years / required_years).min(1.0);
    let rationale = if years >= required_years {
        format!("{years} years meets the {required_years}-year minimum.")
    } else {
        format!("{years} of {required_years} required years ({:.0}%).", value * 100.0)
    };

    Ok(DimensionScore::new(Dimension::Experience, value, rationale))
}

/// Education score: 1.0 at or above the requirement, otherwise
/// `max(0, 1 - steps_below * EDUCATION_STEP_PENALTY)`.
/// Unknown level is scored as the lowest ordinal with a low-confidence rationale.
pub fn score_education(
    candidate_level: Option<EducationLevel>,
    required_level: EducationLevel,
) -> DimensionScore {
    let level = candidate_level.unwrap_or(EducationLevel::None);
    let confidence_note = if candidate_level.is_none() {
        " Education level unknown (low confidence); treated as none."
    } else {
        ""
    };

    if level >= required_level {
        return DimensionScore::new(
            Dimension::Education,
            1.0,
            format!("{level} meets the {required_level} requirement.{confidence_note}"),
        );
    }

    let steps = required_level.ordinal() - level.ordinal();
    let value = (1.0 - f64::from(steps) * EDUCATION_STEP_PENALTY).max(0.0);

    DimensionScore::new(
        Dimension::Education,
        value,
        format!(
            "{level} is {steps} level(s) below the {required_level} requirement.{confidence_note}"
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experience_ratio() {
        let score = score_experience(Some(3.0), 6.0).unwrap();
        assert!((score.value - 0.5).abs() < 1e-9);
        assert!(score.rationale.contains("50%"));
    }

    #[test]
    fn test_experience_capped_at_one() {
        let score = score_experience(Some(12.0), 4.0).unwrap();
        assert_eq!(score.value, 1.0);
    }

    #[test]
    fn test_experience_zero_required_is_full_credit() {
        assert_eq!(score_experience(Some(0.0), 0.0).unwrap().value, 1.0);
    }

    #[test]
    fn test_unknown_experience_is_half_with_low_confidence() {
        let score = score_experience(None, 5.0).unwrap();
        assert_eq!(score.value, UNKNOWN_EXPERIENCE_SCORE);
        assert!(score.rationale.contains("low confidence"));

        // Never full credit, even when nothing is required.
        assert_eq!(score_experience(None, 0.0).unwrap().value, 0.5);
    }

    #[test]
    fn test_experience_rejects_invalid_input() {
        assert!(matches!(
            score_experience(Some(-1.0), 2.0),
            Err(ScreenError::InvalidProfile(_))
        ));
        assert!(matches!(
            score_experience(Some(1.0), -2.0),
            Err(ScreenError::InvalidRequirement(_))
        ));
    }

    #[test]
    fn test_education_at_or_above_requirement_is_one() {
        for required in EducationLevel::ALL {
            for candidate in EducationLevel::ALL.into_iter().filter(|c| *c >= required) {
                assert_eq!(
                    score_education(Some(candidate), required).value,
                    1.0,
                    "{candidate} vs {required}"
                );
            }
        }
    }

    #[test]
    fn test_education_strictly_decreasing_below_requirement() {
        let required = EducationLevel::Doctorate;
        let values: Vec<f64> = [
            EducationLevel::Master,
            EducationLevel::Bachelor,
            EducationLevel::Associate,
            EducationLevel::None,
        ]
        .into_iter()
        .map(|level| score_education(Some(level), required).value)
        .collect();

        assert_eq!(values, vec![0.75, 0.5, 0.25, 0.0]);
        assert!(values.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_unknown_education_treated_as_lowest() {
        let score = score_education(None, EducationLevel::Bachelor);
        assert_eq!(score.value, 0.5);
        assert!(score.rationale.contains("low confidence"));

        let vacuous = score_education(None, EducationLevel::None);
        assert_eq!(vacuous.value, 1.0);
        assert!(vacuous.rationale.contains("low confidence"));
    }
}
