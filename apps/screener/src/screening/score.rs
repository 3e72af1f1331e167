use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ScreenError;

/// The three scored dimensions, in the fixed order rationales are composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Skills,
    Experience,
    Education,
}

impl Dimension {
    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Skills => "skills",
            Dimension::Experience => "experience",
            Dimension::Education => "education",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dimension's score in [0, 1] and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub name: Dimension,
    pub value: f64,
    pub rationale: String,
}

impl DimensionScore {
    /// Clamps `value` into [0, 1].
    pub fn new(name: Dimension, value: f64, rationale: impl Into<String>) -> Self {
        Self {
            name,
            value: value.clamp(0.0, 1.0),
            rationale: rationale.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchStatus {
    Success,
    /// Scored, but some inputs were unknown.
    PartialFailure { reason: String },
    Failure { code: String, reason: String },
}

/// Outcome of screening one resume in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_id: String,
    pub overall_score: f64,
    pub dimension_scores: Vec<DimensionScore>,
    pub rationale: String,
    pub status: MatchStatus,
    /// Required skills the candidate covers. Empty for failures.
    #[serde(default)]
    pub matching_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
}

impl MatchResult {
    /// Placeholder entry for a candidate that could not be scored.
    pub fn failed(candidate_id: impl Into<String>, error: &ScreenError) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            overall_score: 0.0,
            dimension_scores: Vec::new(),
            rationale: error.to_string(),
            status: MatchStatus::Failure {
                code: error.code().to_string(),
                reason: error.to_string(),
            },
            matching_skills: Vec::new(),
            missing_skills: Vec::new(),
        }
    }

    /// Attaches the required-skill coverage behind the skills dimension.
    pub fn with_skill_coverage(mut self, matching: Vec<String>, missing: Vec<String>) -> Self {
        self.matching_skills = matching;
        self.missing_skills = missing;
        self
    }

    /// Success and partial failures carry all three dimension scores and are ranked.
    pub fn is_scored(&self) -> bool {
        !matches!(self.status, MatchStatus::Failure { .. })
    }

    pub fn dimension(&self, name: Dimension) -> Option<&DimensionScore> {
        self.dimension_scores.iter().find(|d| d.name == name)
    }
}

/// Per-candidate pipeline state. `Scored` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateState {
    Pending,
    Extracting,
    Scoring,
    Scored,
    Failed,
}

impl CandidateState {
    pub fn is_terminal(self) -> bool {
        matches!(self, CandidateState::Scored | CandidateState::Failed)
    }

    pub fn can_transition_to(self, next: CandidateState) -> bool {
        use CandidateState::*;
        matches!(
            (self, next),
            (Pending, Extracting)
                | (Pending, Failed)
                | (Extracting, Scoring)
                | (Extracting, Failed)
                | (Scoring, Scored)
                | (Scoring, Failed)
        )
    }
}
