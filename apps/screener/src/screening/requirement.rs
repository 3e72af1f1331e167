//! Job requirement profile: the immutable target every resume is scored against.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ScreenError;

/// Weights must sum to 1.0 within this tolerance.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

// ────────────────────────────────────────────────────────────────────────────
// Education scale
// ────────────────────────────────────────────────────────────────────────────

/// Ordinal education scale. Declaration order is the comparison order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    #[default]
    None,
    Associate,
    Bachelor,
    Master,
    Doctorate,
}

/// Alias table, checked highest level first so "PhD, MSc" resolves to doctorate.
const EDUCATION_ALIASES: &[(EducationLevel, &[&str])] = &[
    (
        EducationLevel::Doctorate,
        &["doctorate", "doctoral", "phd", "ph.d", "dphil", "doctor of"],
    ),
    (
        EducationLevel::Master,
        &[
            "master", "masters", "msc", "m.sc", "m.s.", "mba", "m.eng", "meng", "m.tech", "mtech",
        ],
    ),
    (
        EducationLevel::Bachelor,
        &[
            "bachelor", "bachelors", "bsc", "b.sc", "b.s.", "b.a.", "b.eng", "beng", "b.tech",
            "btech", "undergraduate degree",
        ],
    ),
    (
        EducationLevel::Associate,
        &["associate", "associates", "a.a.", "a.s."],
    ),
    (
        EducationLevel::None,
        &["none", "high school", "secondary school", "ged"],
    ),
];

/// Phrasings that only ever name a degree, safe to look for outside an
/// education section ("Scrum Master" and "Associate Engineer" are job titles).
const DEGREE_FORMS: &[(EducationLevel, &[&str])] = &[
    (
        EducationLevel::Doctorate,
        &["phd", "ph.d", "doctorate", "doctoral degree", "doctor of philosophy"],
    ),
    (
        EducationLevel::Master,
        &[
            "master's", "master’s", "master of", "masters in", "masters degree", "masters of",
            "msc", "m.sc", "m.s.", "mba", "m.eng", "m.tech",
        ],
    ),
    (
        EducationLevel::Bachelor,
        &[
            "bachelor's", "bachelor’s", "bachelor of", "bachelors", "bachelor degree", "bsc",
            "b.sc", "b.s.", "b.a.", "b.eng", "b.tech",
        ],
    ),
    (
        EducationLevel::Associate,
        &[
            "associate's", "associate’s", "associate degree", "associates degree",
            "associate of", "a.a.", "a.s.",
        ],
    ),
];

impl EducationLevel {
    pub const ALL: [EducationLevel; 5] = [
        EducationLevel::None,
        EducationLevel::Associate,
        EducationLevel::Bachelor,
        EducationLevel::Master,
        EducationLevel::Doctorate,
    ];

    /// Position on the ordinal scale, `None` = 0.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            EducationLevel::None => "none",
            EducationLevel::Associate => "associate",
            EducationLevel::Bachelor => "bachelor",
            EducationLevel::Master => "master",
            EducationLevel::Doctorate => "doctorate",
        }
    }

    /// Finds the highest level mentioned anywhere in free text
    /// ("Bachelors in Computer Science", "MSc Data Science, BSc Physics").
    pub fn from_text(text: &str) -> Option<EducationLevel> {
        let haystack = format!(" {} ", text.to_lowercase());
        EDUCATION_ALIASES
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|a| contains_term(&haystack, a)))
            .map(|(level, _)| *level)
    }

    /// Highest level named by an unambiguous degree phrase anywhere in `text`.
    /// Bare words like "master" or "associate" are ignored here.
    pub fn from_degree_mention(text: &str) -> Option<EducationLevel> {
        let haystack = format!(" {} ", text.to_lowercase());
        DEGREE_FORMS
            .iter()
            .find(|(_, forms)| forms.iter().any(|f| contains_term(&haystack, f)))
            .map(|(level, _)| *level)
    }
}

/// Term match that refuses to match inside a longer word ("ms" in "systems").
pub(crate) fn contains_term(haystack: &str, term: &str) -> bool {
    haystack.match_indices(term).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        let bounded = |c: Option<char>| c.map_or(true, |c| !c.is_alphanumeric());
        bounded(before) && bounded(after)
    })
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EducationLevel {
    type Err = ScreenError;

    /// Strict-ish parse: the whole string must name one level or an alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        EDUCATION_ALIASES
            .iter()
            .find(|(_, aliases)| aliases.contains(&normalized.as_str()))
            .map(|(level, _)| *level)
            .ok_or_else(|| ScreenError::InvalidProfile(format!("undefined education level '{s}'")))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Weights
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            skills: 0.5,
            experience: 0.3,
            education: 0.2,
        }
    }
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.skills + self.experience + self.education
    }

    pub fn validate(&self) -> Result<(), ScreenError> {
        for (name, value) in [
            ("skills", self.skills),
            ("experience", self.experience),
            ("education", self.education),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScreenError::InvalidRequirement(format!(
                    "weight '{name}' must be a non-negative number, got {value}"
                )));
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ScreenError::InvalidRequirement(format!(
                "weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }
}

impl FromStr for Weights {
    type Err = ScreenError;

    /// Parses free-text overrides such as `"skills=0.6, experience=0.3, education=0.1"`.
    /// Keys left out keep their default value; the result is validated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut weights = Weights::default();

        for pair in s.split([',', ';']).map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once(['=', ':'])
                .ok_or_else(|| invalid_override(pair, "expected key=value"))?;
            let value: f64 = value
                .trim()
                .parse()
                .map_err(|_| invalid_override(pair, "value is not a number"))?;

            match key.trim().to_lowercase().as_str() {
                "skills" | "skill" => weights.skills = value,
                "experience" => weights.experience = value,
                "education" => weights.education = value,
                _ => return Err(invalid_override(pair, "unknown dimension")),
            }
        }

        weights.validate()?;
        Ok(weights)
    }
}

fn invalid_override(pair: &str, reason: &str) -> ScreenError {
    ScreenError::InvalidRequirement(format!("weight override '{pair}': {reason}"))
}

// ────────────────────────────────────────────────────────────────────────────
// JobRequirement
// ────────────────────────────────────────────────────────────────────────────

/// Raw requirement as written in a requirement file. Converted (and validated)
/// into a `JobRequirement` by `TryFrom`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequirementInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub min_years_experience: f64,
    /// Free text, e.g. "Bachelors in Computer Science".
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Free text, e.g. "skills=0.6, experience=0.3, education=0.1".
    #[serde(default)]
    pub weight_overrides: Option<String>,
    /// Full weight set, as written back by `Serialize`. Takes precedence
    /// over `weight_overrides`.
    #[serde(default)]
    pub weights: Option<Weights>,
}

/// Validated, immutable job requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RequirementInput")]
pub struct JobRequirement {
    title: Option<String>,
    required_skills: Vec<String>,
    min_years_experience: f64,
    education: EducationLevel,
    description: Option<String>,
    weights: Weights,
}

impl JobRequirement {
    /// Builds a requirement, deduplicating skills case-insensitively and
    /// rejecting bad numbers with `InvalidRequirement`.
    pub fn new(
        required_skills: Vec<String>,
        min_years_experience: f64,
        education: EducationLevel,
        weights: Option<Weights>,
    ) -> Result<Self, ScreenError> {
        if !min_years_experience.is_finite() || min_years_experience < 0.0 {
            return Err(ScreenError::InvalidRequirement(format!(
                "minimum years of experience must be a non-negative number, got {min_years_experience}"
            )));
        }

        let weights = weights.unwrap_or_default();
        weights.validate()?;

        Ok(Self {
            title: None,
            required_skills: dedup_skills(required_skills),
            min_years_experience,
            education,
            description: None,
            weights,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn required_skills(&self) -> &[String] {
        &self.required_skills
    }

    pub fn min_years_experience(&self) -> f64 {
        self.min_years_experience
    }

    pub fn education(&self) -> EducationLevel {
        self.education
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }
}

impl TryFrom<RequirementInput> for JobRequirement {
    type Error = ScreenError;

    fn try_from(input: RequirementInput) -> Result<Self, Self::Error> {
        let education = match input.education.as_deref().map(str::trim) {
            None | Some("") => EducationLevel::None,
            Some(text) => EducationLevel::from_text(text).ok_or_else(|| {
                ScreenError::InvalidRequirement(format!("unrecognised education level '{text}'"))
            })?,
        };

        let weights = match input.weights {
            Some(weights) => Some(weights),
            None => input
                .weight_overrides
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(str::parse::<Weights>)
                .transpose()?,
        };

        let mut requirement = JobRequirement::new(
            input.required_skills,
            input.min_years_experience,
            education,
            weights,
        )?;
        requirement.title = input.title.filter(|t| !t.trim().is_empty());
        requirement.description = input.description.filter(|d| !d.trim().is_empty());
        Ok(requirement)
    }
}

/// Trims, drops empties, and keeps the first spelling of each case-insensitive duplicate.
pub(crate) fn dedup_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_education_scale_is_ordered() {
        assert!(EducationLevel::None < EducationLevel::Associate);
        assert!(EducationLevel::Associate < EducationLevel::Bachelor);
        assert!(EducationLevel::Bachelor < EducationLevel::Master);
        assert!(EducationLevel::Master < EducationLevel::Doctorate);
        assert_eq!(EducationLevel::Doctorate.ordinal(), 4);
    }

    #[test]
    fn test_education_from_text_picks_highest_mentioned() {
        assert_eq!(
            EducationLevel::from_text("Bachelors in Computer Science"),
            Some(EducationLevel::Bachelor)
        );
        assert_eq!(
            EducationLevel::from_text("MSc Data Science; BSc Physics"),
            Some(EducationLevel::Master)
        );
        assert_eq!(
            EducationLevel::from_text("PhD in Machine Learning"),
            Some(EducationLevel::Doctorate)
        );
        assert_eq!(EducationLevel::from_text("distributed systems"), None);
    }

    #[test]
    fn test_degree_mention_ignores_job_titles() {
        assert_eq!(
            EducationLevel::from_degree_mention("Certified Scrum Master, Associate Engineer"),
            None
        );
        assert_eq!(
            EducationLevel::from_degree_mention("Holds a Master's degree in Statistics"),
            Some(EducationLevel::Master)
        );
        assert_eq!(
            EducationLevel::from_degree_mention("Associate degree in IT, then a B.S. in CS"),
            Some(EducationLevel::Bachelor)
        );
    }

    #[test]
    fn test_education_from_str_rejects_unknown() {
        assert_eq!("Master".parse::<EducationLevel>(), Ok(EducationLevel::Master));
        assert_eq!("phd".parse::<EducationLevel>(), Ok(EducationLevel::Doctorate));
        let err = "grand wizard".parse::<EducationLevel>().unwrap_err();
        assert_eq!(err.code(), "INVALID_PROFILE");
    }

    #[test]
    fn test_default_weights_valid() {
        let w = Weights::default();
        assert!(w.validate().is_ok());
        assert!((w.sum() - 1.0).abs() < WEIGHT_TOLERANCE);
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let w = Weights {
            skills: 0.5,
            experience: 0.5,
            education: 0.5,
        };
        assert!(matches!(w.validate(), Err(ScreenError::InvalidRequirement(_))));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let w = Weights {
            skills: 1.2,
            experience: -0.2,
            education: 0.0,
        };
        assert!(matches!(w.validate(), Err(ScreenError::InvalidRequirement(_))));
    }

    #[test]
    fn test_weight_overrides_parse_partial() {
        let w: Weights = "skills=0.6, education=0.1".parse().unwrap();
        assert_eq!(w.skills, 0.6);
        assert_eq!(w.experience, 0.3);
        assert_eq!(w.education, 0.1);
    }

    #[test]
    fn test_weight_overrides_reject_unknown_key() {
        let err = "skills=0.5, salary=0.5".parse::<Weights>().unwrap_err();
        assert!(err.to_string().contains("unknown dimension"));
    }

    #[test]
    fn test_requirement_dedups_skills_case_insensitively() {
        let req = JobRequirement::new(
            vec![
                "Python".into(),
                "SQL".into(),
                "python".into(),
                "  ".into(),
                "sql ".into(),
            ],
            2.0,
            EducationLevel::Bachelor,
            None,
        )
        .unwrap();
        assert_eq!(req.required_skills(), &["Python".to_string(), "SQL".to_string()]);
    }

    #[test]
    fn test_requirement_rejects_negative_years() {
        let err = JobRequirement::new(vec![], -1.0, EducationLevel::None, None).unwrap_err();
        assert!(matches!(err, ScreenError::InvalidRequirement(_)));
    }

    #[test]
    fn test_requirement_deserializes_from_file_shape() {
        let json = r#"{
            "title": "Software Engineer",
            "required_skills": ["Python", "FastAPI", "Docker", "python"],
            "min_years_experience": 2,
            "education": "Bachelors in Computer Science",
            "description": "Looking for a full-stack developer"
        }"#;
        let req: JobRequirement = serde_json::from_str(json).unwrap();
        assert_eq!(req.title(), Some("Software Engineer"));
        assert_eq!(req.required_skills().len(), 3);
        assert_eq!(req.education(), EducationLevel::Bachelor);
        assert_eq!(req.min_years_experience(), 2.0);
        assert_eq!(req.weights(), &Weights::default());
    }

    #[test]
    fn test_requirement_deserialize_rejects_bad_overrides() {
        let json = r#"{"required_skills": ["rust"], "weight_overrides": "skills=0.9"}"#;
        assert!(serde_json::from_str::<JobRequirement>(json).is_err());
    }

    #[test]
    fn test_requirement_serde_round_trip_keeps_custom_weights() {
        let req = JobRequirement::new(
            vec!["Rust".into(), "SQL".into()],
            4.0,
            EducationLevel::Master,
            Some(Weights {
                skills: 0.6,
                experience: 0.3,
                education: 0.1,
            }),
        )
        .unwrap()
        .with_title("Backend Engineer");

        let json = serde_json::to_string(&req).unwrap();
        let back: JobRequirement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
        assert_eq!(back.weights().skills, 0.6);
    }

    #[test]
    fn test_requirement_round_trip_with_no_education() {
        let req = JobRequirement::new(vec![], 0.0, EducationLevel::None, None).unwrap();
        let back: JobRequirement =
            serde_json::from_str(&serde_json::to_string(&req).unwrap()).unwrap();
        assert_eq!(back, req);
    }

    #[test]
    fn test_structured_weights_take_precedence_and_are_validated() {
        let json = r#"{
            "required_skills": ["rust"],
            "weights": {"skills": 0.2, "experience": 0.2, "education": 0.6},
            "weight_overrides": "skills=0.9, experience=0.05, education=0.05"
        }"#;
        let req: JobRequirement = serde_json::from_str(json).unwrap();
        assert_eq!(req.weights().education, 0.6);

        let bad = r#"{"weights": {"skills": 0.9, "experience": 0.9, "education": 0.9}}"#;
        assert!(serde_json::from_str::<JobRequirement>(bad).is_err());
    }

    #[test]
    fn test_requirement_deserialize_rejects_unknown_education() {
        let json = r#"{"required_skills": ["rust"], "education": "wizardry"}"#;
        assert!(serde_json::from_str::<JobRequirement>(json).is_err());
    }
}
