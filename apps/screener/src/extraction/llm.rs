//! Hosted-model extractor: one JSON-mode chat-completion call per resume.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use super::prompts::{EXTRACT_PROMPT_TEMPLATE, EXTRACT_SYSTEM};
use super::FieldExtractor;
use crate::errors::ScreenError;
use crate::llm_client::{LlmClient, LlmError};
use crate::screening::profile::ExtractedProfile;
use crate::screening::requirement::{EducationLevel, JobRequirement};

/// Resume text beyond this many characters is not sent to the model.
pub const MAX_PROMPT_CHARS: usize = 4000;

/// Shape the model is asked to return. Education arrives as free text.
#[derive(Debug, Deserialize)]
struct ExtractionReply {
    #[serde(default)]
    skills: Vec<String>,
    #[serde(default)]
    years_experience: Option<f64>,
    #[serde(default)]
    education: Option<String>,
}

pub struct LlmFieldExtractor {
    llm: LlmClient,
}

impl LlmFieldExtractor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl FieldExtractor for LlmFieldExtractor {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn extract(
        &self,
        text: &str,
        requirement: &JobRequirement,
    ) -> Result<ExtractedProfile, ScreenError> {
        if text.trim().is_empty() {
            return Err(ScreenError::Extraction(
                "resume contains no text to extract from".to_string(),
            ));
        }

        let prompt = build_prompt(text, requirement);
        let reply = self
            .llm
            .call_json::<ExtractionReply>(&prompt, EXTRACT_SYSTEM)
            .await
            .map_err(extraction_error)?;

        Ok(into_profile(reply))
    }
}

fn extraction_error(e: LlmError) -> ScreenError {
    ScreenError::Extraction(format!("model extraction failed: {e}"))
}

pub fn build_prompt(text: &str, requirement: &JobRequirement) -> String {
    let required_skills = if requirement.required_skills().is_empty() {
        "(none listed)".to_string()
    } else {
        requirement.required_skills().join(", ")
    };

    EXTRACT_PROMPT_TEMPLATE
        .replace("{required_skills}", &required_skills)
        .replace("{min_years}", &requirement.min_years_experience().to_string())
        .replace("{education}", requirement.education().label())
        .replace("{resume_text}", truncate_chars(text, MAX_PROMPT_CHARS))
}

/// First `max` characters of `text`, cut on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Converts the model reply. An education answer that names no known level
/// is treated as unknown rather than failing the candidate.
fn into_profile(reply: ExtractionReply) -> ExtractedProfile {
    let education = reply.education.as_deref().and_then(|raw| {
        let parsed = raw
            .parse::<EducationLevel>()
            .ok()
            .or_else(|| EducationLevel::from_text(raw));
        if parsed.is_none() && !raw.trim().is_empty() {
            warn!("Model returned unrecognised education level '{}'", raw);
        }
        parsed
    });

    ExtractedProfile::new(reply.skills, reply.years_experience, education)
}
