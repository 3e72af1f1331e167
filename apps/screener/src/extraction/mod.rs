//! Field extraction: raw resume text to `ExtractedProfile`.
//!
//! Default: `RuleBasedExtractor` (pure Rust, deterministic, no network).
//! Optional: `LlmFieldExtractor` (hosted chat-completion model), selected at
//! startup when an API key is configured.

use async_trait::async_trait;

use crate::errors::ScreenError;
use crate::screening::profile::ExtractedProfile;
use crate::screening::requirement::JobRequirement;

pub mod llm;
pub mod prompts;
pub mod rule_based;

pub use llm::LlmFieldExtractor;
pub use rule_based::RuleBasedExtractor;

/// The field extractor capability. Implement this to swap extraction
/// strategies without touching the scoring core.
///
/// Carried by the ranking engine as `Arc<dyn FieldExtractor>`; must be safe
/// to call from concurrent workers. Failures are `ScreenError::Extraction`.
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    /// Extractor label ("rule_based", "llm") for logs.
    fn name(&self) -> &'static str;

    async fn extract(
        &self,
        text: &str,
        requirement: &JobRequirement,
    ) -> Result<ExtractedProfile, ScreenError>;
}
