// Prompt constants for the hosted-model field extractor.

/// System prompt for resume field extraction. Enforces JSON-only output.
pub const EXTRACT_SYSTEM: &str = "You are an expert technical recruiter. \
    Read a resume and extract structured facts about the candidate. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Extraction prompt. Replace `{required_skills}`, `{min_years}`,
/// `{education}` and `{resume_text}` before sending.
pub const EXTRACT_PROMPT_TEMPLATE: &str = r#"Extract the candidate's skills, total years of professional experience, and highest education level from the resume below.

The role being screened for asks for:
- Required skills: {required_skills}
- Minimum years of experience: {min_years}
- Minimum education: {education}

Return a JSON object with this EXACT schema (no extra fields):
{
  "skills": ["Python", "PostgreSQL"],
  "years_experience": 4.5,
  "education": "bachelor"
}

Rules:
- "skills": every technical skill, tool, language or framework the resume shows. Use the resume's own wording. Include required skills only if the resume actually mentions them or a clear equivalent.
- "years_experience": total professional experience in years as a number. Use null if the resume gives no way to tell.
- "education": exactly one of "none", "associate", "bachelor", "master", "doctorate" for the highest completed degree. Use null if the resume does not say.
- Do NOT guess. Unknown is better than invented.

Resume:
---
{resume_text}
---"#;
