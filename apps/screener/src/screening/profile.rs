use serde::{Deserialize, Serialize};

use crate::errors::ScreenError;
use crate::screening::requirement::{dedup_skills, EducationLevel};

/// Structured attributes pulled out of one resume by a `FieldExtractor`.
///
/// Unknown values stay `None` here; the dimension evaluator decides how much
/// credit an unknown gets and flags the score as low confidence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedProfile {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub years_experience: Option<f64>,
    #[serde(default)]
    pub education: Option<EducationLevel>,
}

impl ExtractedProfile {
    pub fn new(
        skills: Vec<String>,
        years_experience: Option<f64>,
        education: Option<EducationLevel>,
    ) -> Self {
        Self {
            skills: dedup_skills(skills),
            years_experience,
            education,
        }
    }

    /// Rejects values no scorer can interpret (negative or non-finite years).
    pub fn validate(&self) -> Result<(), ScreenError> {
        if let Some(years) = self.years_experience {
            if !years.is_finite() || years < 0.0 {
                return Err(ScreenError::InvalidProfile(format!(
                    "years of experience must be a non-negative number, got {years}"
                )));
            }
        }
        Ok(())
    }

    /// Reasons this profile can only be scored with low confidence.
    pub fn low_confidence_reasons(&self) -> Vec<&'static str> {
        let mut reasons = Vec::new();
        if self.years_experience.is_none() {
            reasons.push("years of experience unknown");
        }
        if self.education.is_none() {
            reasons.push("education level unknown");
        }
        reasons
    }
}
