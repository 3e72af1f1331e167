use thiserror::Error;

/// Screening error type.
///
/// Candidate-level variants end up as a `MatchStatus::Failure` on that
/// candidate's result. Run-level variants stop the run (or reject it before
/// it starts) and are reported on the `RankedReport` itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScreenError {
    #[error("Invalid requirement: {0}")]
    InvalidRequirement(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Embedding backend unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Systemic failure: {0}")]
    SystemicFailure(String),
}

impl ScreenError {
    /// Stable machine-readable code, carried into serialized failure entries.
    pub fn code(&self) -> &'static str {
        match self {
            ScreenError::InvalidRequirement(_) => "INVALID_REQUIREMENT",
            ScreenError::InvalidProfile(_) => "INVALID_PROFILE",
            ScreenError::Extraction(_) => "EXTRACTION_ERROR",
            ScreenError::EmbeddingUnavailable(_) => "EMBEDDING_UNAVAILABLE",
            ScreenError::SystemicFailure(_) => "SYSTEMIC_FAILURE",
        }
    }

    /// Run-level errors abort (or reject) the whole run.
    pub fn is_run_level(&self) -> bool {
        matches!(
            self,
            ScreenError::InvalidRequirement(_) | ScreenError::SystemicFailure(_)
        )
    }

    /// Backend outages count toward the consecutive-failure streak.
    pub fn is_backend_outage(&self) -> bool {
        matches!(self, ScreenError::EmbeddingUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(
            ScreenError::InvalidProfile("x".into()).code(),
            "INVALID_PROFILE"
        );
        assert_eq!(
            ScreenError::EmbeddingUnavailable("x".into()).code(),
            "EMBEDDING_UNAVAILABLE"
        );
    }

    #[test]
    fn test_run_level_split() {
        assert!(ScreenError::SystemicFailure("down".into()).is_run_level());
        assert!(ScreenError::InvalidRequirement("weights".into()).is_run_level());
        assert!(!ScreenError::Extraction("bad pdf".into()).is_run_level());
        assert!(!ScreenError::EmbeddingUnavailable("down".into()).is_run_level());
    }

    #[test]
    fn test_only_embedding_outage_counts_toward_streak() {
        assert!(ScreenError::EmbeddingUnavailable("down".into()).is_backend_outage());
        assert!(!ScreenError::Extraction("timeout".into()).is_backend_outage());
        assert!(!ScreenError::InvalidProfile("negative years".into()).is_backend_outage());
    }

    #[test]
    fn test_display_includes_reason() {
        let err = ScreenError::Extraction("no text".into());
        assert_eq!(err.to_string(), "Extraction error: no text");
    }
}
