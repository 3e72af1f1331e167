use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;

use super::FieldExtractor;
use crate::errors::ScreenError;
use crate::screening::profile::ExtractedProfile;
use crate::screening::requirement::{contains_term, EducationLevel, JobRequirement};

/// Technology vocabulary spotted anywhere in the text, in addition to the
/// requirement's own skills.
const KNOWN_SKILLS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "typescript",
    "react",
    "node.js",
    "docker",
    "kubernetes",
    "aws",
    "azure",
    "gcp",
    "sql",
    "nosql",
    "mongodb",
    "postgresql",
    "mysql",
    "git",
    "ci/cd",
    "jenkins",
    "machine learning",
    "deep learning",
    "nlp",
    "fastapi",
    "django",
    "rust",
    "c++",
    "terraform",
];

/// Longest item still treated as a skill when splitting a skills section.
const MAX_SKILL_LEN: usize = 40;

/// Upper bound on a plausible "N years" figure.
const MAX_PLAUSIBLE_YEARS: f64 = 60.0;

fn years_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,2}(?:\.\d+)?)\s*\+?\s*(?:years?|yrs?)\b")
            .expect("years regex is valid")
    })
}

/// "N years of experience", "N+ yrs of hands-on Rust experience".
fn experience_phrase_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(\d{1,2}(?:\.\d+)?)\s*\+?\s*(?:years?|yrs?)\s+(?:of\s+)?(?:[a-z/+#-]+\s+){0,3}experience\b",
        )
        .expect("experience phrase regex is valid")
    })
}

/// A line that is only a section heading, optionally followed by `: content`.
fn section_heading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^\s*(education|academic background|academics|qualifications|work experience|professional experience|employment history|employment|experience|professional summary|summary|profile|objective|about me|technical skills|skills|technologies|tech stack|projects|certifications|awards|publications|interests|languages|references)\s*(?::\s*(.*))?$",
        )
        .expect("section heading regex is valid")
    })
}

fn skills_heading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:technical\s+skills|skills|technologies|tech\s+stack)\b\s*:?\s*(.*)$")
            .expect("skills heading regex is valid")
    })
}

/// Section- and pattern-based extractor. Fast, deterministic, no network.
///
/// - skills: items of a "Skills" section, plus vocabulary and required-skill
///   mentions anywhere in the text
/// - years: the largest "N years" / "N+ yrs" figure
/// - education: the highest degree mentioned
#[derive(Debug, Clone, Default)]
pub struct RuleBasedExtractor;

#[async_trait]
impl FieldExtractor for RuleBasedExtractor {
    fn name(&self) -> &'static str {
        "rule_based"
    }

    async fn extract(
        &self,
        text: &str,
        requirement: &JobRequirement,
    ) -> Result<ExtractedProfile, ScreenError> {
        extract_profile(text, requirement)
    }
}

pub fn extract_profile(
    text: &str,
    requirement: &JobRequirement,
) -> Result<ExtractedProfile, ScreenError> {
    if text.trim().is_empty() {
        return Err(ScreenError::Extraction(
            "resume contains no text to extract from".to_string(),
        ));
    }

    let mut skills = skills_section_items(text);
    let haystack = format!(" {} ", text.to_lowercase());
    skills.extend(
        requirement
            .required_skills()
            .iter()
            .map(String::as_str)
            .chain(KNOWN_SKILLS.iter().copied())
            .filter(|term| contains_term(&haystack, &term.to_lowercase()))
            .map(str::to_string),
    );

    let sections = split_sections(text);

    Ok(ExtractedProfile::new(
        skills,
        extract_years(text, &sections),
        extract_education(text, &sections),
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Summary,
    Experience,
    Education,
    Skills,
    Other,
}

impl Section {
    fn from_heading(heading: &str) -> Self {
        let heading = heading.to_lowercase();
        if ["education", "academic", "qualif"]
            .iter()
            .any(|k| heading.contains(k))
        {
            Section::Education
        } else if heading.contains("experience") || heading.contains("employment") {
            Section::Experience
        } else if ["summary", "profile", "objective", "about"]
            .iter()
            .any(|k| heading.contains(k))
        {
            Section::Summary
        } else if ["skill", "technolog", "stack"].iter().any(|k| heading.contains(k)) {
            Section::Skills
        } else {
            Section::Other
        }
    }
}

/// Headed sections in document order. Each body runs to the next heading;
/// text before the first heading belongs to no section.
fn split_sections(text: &str) -> Vec<(Section, String)> {
    let mut sections: Vec<(Section, String)> = Vec::new();
    for line in text.lines() {
        if let Some(caps) = section_heading_regex().captures(line) {
            let inline = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
            sections.push((Section::from_heading(&caps[1]), inline.to_string()));
        } else if let Some((_, body)) = sections.last_mut() {
            body.push('\n');
            body.push_str(line);
        }
    }
    sections
}

/// All bodies of the given kinds, joined.
fn section_text(sections: &[(Section, String)], kinds: &[Section]) -> Option<String> {
    let bodies: Vec<&str> = sections
        .iter()
        .filter(|(kind, _)| kinds.contains(kind))
        .map(|(_, body)| body.as_str())
        .collect();
    (!bodies.is_empty()).then(|| bodies.join("\n"))
}

/// Education section first; elsewhere only unambiguous degree phrases count,
/// so job titles like "Scrum Master" are not read as degrees.
fn extract_education(text: &str, sections: &[(Section, String)]) -> Option<EducationLevel> {
    section_text(sections, &[Section::Education])
        .and_then(|body| EducationLevel::from_text(&body))
        .or_else(|| EducationLevel::from_degree_mention(text))
}

/// Items listed under a skills heading, up to the next blank line.
fn skills_section_items(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        let Some(caps) = skills_heading_regex().captures(line) else {
            continue;
        };

        let mut section = caps
            .get(1)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        for next in lines.by_ref() {
            if next.trim().is_empty() {
                break;
            }
            section.push('\n');
            section.push_str(next);
        }

        items.extend(
            section
                .split([',', ';', '|', '•', '·', '\n'])
                .map(|item| item.trim().trim_start_matches(['-', '*']).trim())
                .filter(|item| !item.is_empty() && item.len() <= MAX_SKILL_LEN)
                .map(str::to_string),
        );
    }

    items
}

/// Years of experience: the largest "N years of experience" figure; failing
/// that, the largest "N years" inside a summary or experience section.
/// Figures elsewhere ("50 years of history") are ignored.
fn extract_years(text: &str, sections: &[(Section, String)]) -> Option<f64> {
    largest_years(experience_phrase_regex(), text).or_else(|| {
        section_text(sections, &[Section::Summary, Section::Experience])
            .and_then(|body| largest_years(years_regex(), &body))
    })
}

fn largest_years(re: &Regex, text: &str) -> Option<f64> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<f64>().ok())
        .filter(|years| *years <= MAX_PLAUSIBLE_YEARS)
        .reduce(f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = r#"
        Jane Doe
        Summary
        Backend engineer with 6+ years of experience building data platforms.

        Technical Skills: Python, FastAPI, PostgreSQL
        - Docker
        - Kubernetes | Terraform

        Experience
        Senior Engineer, Acme (3 years), built ETL pipelines in SQL and Airflow.

        Education
        B.Sc. Computer Science, State University
    "#;

    fn requirement(skills: &[&str]) -> JobRequirement {
        JobRequirement::new(
            skills.iter().map(|s| s.to_string()).collect(),
            2.0,
            EducationLevel::Bachelor,
            None,
        )
        .unwrap()
    }

    fn has(profile: &ExtractedProfile, skill: &str) -> bool {
        profile.skills.iter().any(|s| s.eq_ignore_ascii_case(skill))
    }

    #[test]
    fn test_skills_section_and_vocabulary() {
        let profile = extract_profile(RESUME, &requirement(&["Airflow"])).unwrap();
        for skill in ["Python", "FastAPI", "PostgreSQL", "Docker", "Kubernetes", "Terraform"] {
            assert!(has(&profile, skill), "missing {skill}: {:?}", profile.skills);
        }
        // Outside the section, picked up via vocabulary and the requirement.
        assert!(has(&profile, "sql"));
        assert!(has(&profile, "airflow"));
    }

    #[test]
    fn test_skills_deduplicated() {
        let profile = extract_profile(RESUME, &requirement(&["python"])).unwrap();
        let pythons = profile
            .skills
            .iter()
            .filter(|s| s.eq_ignore_ascii_case("python"))
            .count();
        assert_eq!(pythons, 1);
    }

    #[test]
    fn test_years_takes_largest_figure() {
        let profile = extract_profile(RESUME, &requirement(&[])).unwrap();
        assert_eq!(profile.years_experience, Some(6.0));
    }

    #[test]
    fn test_education_detected() {
        let profile = extract_profile(RESUME, &requirement(&[])).unwrap();
        assert_eq!(profile.education, Some(EducationLevel::Bachelor));
    }

    #[test]
    fn test_missing_fields_stay_unknown() {
        let profile = extract_profile("Loves rust and go.", &requirement(&[])).unwrap();
        assert_eq!(profile.years_experience, None);
        assert_eq!(profile.education, None);
        assert!(has(&profile, "rust"));
    }

    #[test]
    fn test_word_boundaries_respected() {
        // "java" must not match inside "javascript"; "git" not inside "digital".
        let profile = extract_profile("JavaScript for digital agencies", &requirement(&[])).unwrap();
        assert!(has(&profile, "javascript"));
        assert!(!has(&profile, "java"));
        assert!(!has(&profile, "git"));
    }

    #[test]
    fn test_job_title_not_read_as_degree() {
        let text = "Certified Scrum Master at Acme.\n\nEducation\nB.Sc. Computer Science";
        let profile = extract_profile(text, &requirement(&[])).unwrap();
        assert_eq!(profile.education, Some(EducationLevel::Bachelor));

        let text = "Associate Software Engineer at Acme for 2 years.\nSelf-taught.";
        let profile = extract_profile(text, &requirement(&[])).unwrap();
        assert_eq!(profile.education, None);
    }

    #[test]
    fn test_degree_phrase_outside_education_section() {
        let text = "Data analyst with a Master's degree in Statistics.";
        let profile = extract_profile(text, &requirement(&[])).unwrap();
        assert_eq!(profile.education, Some(EducationLevel::Master));
    }

    #[test]
    fn test_education_section_without_level_falls_back_to_degree_phrases() {
        let text = "Summary\nHolds an associate degree.\n\nEducation\nSelf-taught, online courses.";
        let profile = extract_profile(text, &requirement(&[])).unwrap();
        assert_eq!(profile.education, Some(EducationLevel::Associate));
    }

    #[test]
    fn test_years_ignore_unrelated_figures() {
        let text = "Joined Acme, a company with 50 years of history.\n\
                    4 years of professional experience in Rust.";
        let profile = extract_profile(text, &requirement(&[])).unwrap();
        assert_eq!(profile.years_experience, Some(4.0));

        let text = "Projects\nMaintained a 30 year old codebase.\n\nExperience\nBackend developer, 3 years";
        let profile = extract_profile(text, &requirement(&[])).unwrap();
        assert_eq!(profile.years_experience, Some(3.0));

        let text = "Acme has 50 years of history.";
        let profile = extract_profile(text, &requirement(&[])).unwrap();
        assert_eq!(profile.years_experience, None);
    }

    #[test]
    fn test_section_split_respects_headings() {
        let sections = split_sections("intro\nSummary: quick learner\nmore\nEducation\nBSc");
        assert_eq!(
            sections,
            vec![
                (Section::Summary, "quick learner\nmore".to_string()),
                (Section::Education, "\nBSc".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_text_is_extraction_error() {
        let err = extract_profile("  \n ", &requirement(&[])).unwrap_err();
        assert!(matches!(err, ScreenError::Extraction(_)));
    }
}
