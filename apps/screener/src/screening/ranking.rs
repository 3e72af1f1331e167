//! Ranking Engine: bulk screening over a lazy stream of resumes.
//!
//! Candidates run concurrently in a `JoinSet` bounded by `ScreeningConfig::workers`.
//! A single collector loop owns the report; workers only return values.
//! One bad resume never aborts the run. A streak of embedding outages does.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::embedding::EmbeddingBackend;
use crate::errors::ScreenError;
use crate::extraction::FieldExtractor;
use crate::screening::aggregator::assemble;
use crate::screening::dimensions::{score_education, score_experience};
use crate::screening::requirement::JobRequirement;
use crate::screening::score::{CandidateState, MatchResult};
use crate::screening::similarity::{score_skills, DEFAULT_SIMILARITY_THRESHOLD};

pub const DEFAULT_CONSECUTIVE_FAILURE_LIMIT: usize = 5;
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Scores closer than this are ties and fall back to candidate id order.
const SCORE_QUANTUM: f64 = 1e-9;

// ────────────────────────────────────────────────────────────────────────────
// Configuration & run control
// ────────────────────────────────────────────────────────────────────────────

/// Engine configuration, fixed at construction. Separate engines may run
/// concurrently with different values.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningConfig {
    /// Minimum cosine similarity for a skill to count as matched.
    pub similarity_threshold: f64,
    /// Consecutive embedding outages tolerated before the run is aborted.
    pub consecutive_failure_limit: usize,
    pub workers: usize,
    /// Bound on every extractor and embedding call.
    pub call_timeout: Duration,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            consecutive_failure_limit: DEFAULT_CONSECUTIVE_FAILURE_LIMIT,
            workers: default_workers(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

impl ScreeningConfig {
    pub fn validate(&self) -> Result<(), ScreenError> {
        if !self.similarity_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.similarity_threshold)
        {
            return Err(ScreenError::InvalidRequirement(format!(
                "similarity threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if self.consecutive_failure_limit == 0 {
            return Err(ScreenError::InvalidRequirement(
                "consecutive failure limit must be at least 1".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(ScreenError::InvalidRequirement(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.call_timeout.is_zero() {
            return Err(ScreenError::InvalidRequirement(
                "call timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Cloneable cancellation flag. Cancelling stops dispatch; in-flight
/// candidates still finish and are reported.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal(Arc<AtomicBool>);

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Report
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
    Cancelled,
    SystemicFailure { reason: String },
}

/// Final output of one run. `results` holds scored candidates best-first,
/// followed by failures in submission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub outcome: RunOutcome,
    /// Candidates pulled from the source; always `scored + failed`.
    pub submitted: usize,
    pub scored: usize,
    pub failed: usize,
    pub results: Vec<MatchResult>,
}

impl RankedReport {
    fn build(run_id: Uuid, outcome: RunOutcome, entries: Vec<(usize, MatchResult)>) -> Self {
        let submitted = entries.len();
        let (mut scored, mut failed): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(|(_, r)| r.is_scored());

        scored.sort_by(|(_, a), (_, b)| {
            quantize(b.overall_score)
                .cmp(&quantize(a.overall_score))
                .then_with(|| a.candidate_id.cmp(&b.candidate_id))
        });
        failed.sort_by_key(|(index, _)| *index);

        let scored_count = scored.len();
        let failed_count = failed.len();
        let results = scored
            .into_iter()
            .chain(failed)
            .map(|(_, result)| result)
            .collect();

        Self {
            run_id,
            generated_at: Utc::now(),
            outcome,
            submitted,
            scored: scored_count,
            failed: failed_count,
            results,
        }
    }

    /// Scored candidates, best first.
    pub fn ranked(&self) -> &[MatchResult] {
        &self.results[..self.split()]
    }

    /// Failed candidates in submission order.
    pub fn failures(&self) -> &[MatchResult] {
        &self.results[self.split()..]
    }

    /// Counts are public and a report can be read back from JSON, so the
    /// boundary is clamped to what `results` actually holds.
    fn split(&self) -> usize {
        self.scored.min(self.results.len())
    }

    /// The run-level error, if the run was aborted.
    pub fn run_error(&self) -> Option<ScreenError> {
        match &self.outcome {
            RunOutcome::SystemicFailure { reason } => {
                Some(ScreenError::SystemicFailure(reason.clone()))
            }
            _ => None,
        }
    }
}

fn quantize(score: f64) -> i64 {
    (score / SCORE_QUANTUM).round() as i64
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// Shared, read-only view each worker runs a candidate against.
#[derive(Clone)]
struct Pipeline {
    extractor: Arc<dyn FieldExtractor>,
    embeddings: Arc<dyn EmbeddingBackend>,
    requirement: Arc<JobRequirement>,
    config: ScreeningConfig,
}

pub struct RankingEngine {
    extractor: Arc<dyn FieldExtractor>,
    embeddings: Arc<dyn EmbeddingBackend>,
    config: ScreeningConfig,
}

impl RankingEngine {
    pub fn new(
        extractor: Arc<dyn FieldExtractor>,
        embeddings: Arc<dyn EmbeddingBackend>,
        config: ScreeningConfig,
    ) -> Result<Self, ScreenError> {
        config.validate()?;
        Ok(Self {
            extractor,
            embeddings,
            config,
        })
    }

    pub fn config(&self) -> &ScreeningConfig {
        &self.config
    }

    /// Screens every `(candidate_id, raw_text)` pair and ranks the results.
    pub async fn rank<I>(&self, requirement: &JobRequirement, profiles: I) -> RankedReport
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.rank_with_cancel(requirement, profiles, &CancelSignal::new())
            .await
    }

    /// Like `rank`, but stops pulling new candidates once `cancel` fires.
    ///
    /// Profiles are pulled lazily, at most `workers` ahead of completion, so
    /// an aborted or cancelled run leaves the rest of the source untouched.
    pub async fn rank_with_cancel<I>(
        &self,
        requirement: &JobRequirement,
        profiles: I,
        cancel: &CancelSignal,
    ) -> RankedReport
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let run_id = Uuid::new_v4();
        let pipeline = Pipeline {
            extractor: Arc::clone(&self.extractor),
            embeddings: Arc::clone(&self.embeddings),
            requirement: Arc::new(requirement.clone()),
            config: self.config.clone(),
        };
        info!(
            %run_id,
            extractor = self.extractor.name(),
            embeddings = self.embeddings.name(),
            workers = self.config.workers,
            "Screening run started"
        );

        let mut profiles = profiles.into_iter();
        let mut tasks = JoinSet::new();
        let mut entries: Vec<(usize, MatchResult)> = Vec::new();
        let mut next_index = 0usize;
        let mut outage_streak = 0usize;
        let mut outcome = RunOutcome::Completed;
        let mut dispatching = true;

        loop {
            while dispatching && tasks.len() < self.config.workers {
                if cancel.is_cancelled() {
                    info!(%run_id, in_flight = tasks.len(), "Run cancelled; draining in-flight candidates");
                    outcome = RunOutcome::Cancelled;
                    dispatching = false;
                    break;
                }
                let Some((candidate_id, text)) = profiles.next() else {
                    dispatching = false;
                    break;
                };

                let index = next_index;
                next_index += 1;
                let worker = pipeline.clone();
                tasks.spawn(async move {
                    // Inner task so a panicking pipeline still reports its candidate.
                    let run = tokio::spawn(evaluate_candidate(worker, candidate_id.clone(), text));
                    let result = run.await.unwrap_or_else(|e| {
                        Err(ScreenError::Extraction(format!(
                            "candidate pipeline aborted: {e}"
                        )))
                    });
                    (index, candidate_id, result)
                });
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };
            let Ok((index, candidate_id, result)) = joined else {
                // Outer tasks only await the pipeline and never panic.
                continue;
            };

            match result {
                Ok(matched) => {
                    outage_streak = 0;
                    entries.push((index, matched));
                }
                Err(err) => {
                    if err.is_backend_outage() {
                        outage_streak += 1;
                    } else {
                        outage_streak = 0;
                    }
                    warn!(
                        %run_id,
                        candidate_id = %candidate_id,
                        code = err.code(),
                        "Candidate failed: {}",
                        err
                    );
                    entries.push((index, MatchResult::failed(&candidate_id, &err)));

                    let already_aborted = matches!(outcome, RunOutcome::SystemicFailure { .. });
                    if outage_streak > self.config.consecutive_failure_limit && !already_aborted {
                        let reason = format!(
                            "{outage_streak} consecutive candidates failed with the embedding backend unavailable (limit {}); last error: {err}",
                            self.config.consecutive_failure_limit
                        );
                        warn!(%run_id, "Aborting run: {}", reason);
                        outcome = RunOutcome::SystemicFailure { reason };
                        dispatching = false;
                    }
                }
            }
        }

        let report = RankedReport::build(run_id, outcome, entries);
        info!(
            %run_id,
            submitted = report.submitted,
            scored = report.scored,
            failed = report.failed,
            "Screening run finished"
        );
        report
    }
}

/// One candidate's `Pending -> Extracting -> Scoring -> (Scored | Failed)` pipeline.
async fn evaluate_candidate(
    pipeline: Pipeline,
    candidate_id: String,
    text: String,
) -> Result<MatchResult, ScreenError> {
    let mut state = CandidateState::Pending;
    let result = run_stages(&pipeline, &candidate_id, &text, &mut state).await;
    let terminal = if result.is_ok() {
        CandidateState::Scored
    } else {
        CandidateState::Failed
    };
    advance(&candidate_id, &mut state, terminal);
    result
}

async fn run_stages(
    pipeline: &Pipeline,
    candidate_id: &str,
    text: &str,
    state: &mut CandidateState,
) -> Result<MatchResult, ScreenError> {
    let requirement = pipeline.requirement.as_ref();
    let timeout = pipeline.config.call_timeout;

    advance(candidate_id, state, CandidateState::Extracting);
    if text.trim().is_empty() {
        return Err(ScreenError::Extraction(
            "resume contains no text to extract from".to_string(),
        ));
    }
    let profile = tokio::time::timeout(timeout, pipeline.extractor.extract(text, requirement))
        .await
        .map_err(|_| {
            ScreenError::Extraction(format!(
                "{} extractor timed out after {}s",
                pipeline.extractor.name(),
                timeout.as_secs_f64()
            ))
        })??;
    profile.validate()?;

    advance(candidate_id, state, CandidateState::Scoring);
    let skills = score_skills(
        pipeline.embeddings.as_ref(),
        &profile.skills,
        requirement.required_skills(),
        pipeline.config.similarity_threshold,
        timeout,
    )
    .await?;
    let experience = score_experience(
        profile.years_experience,
        requirement.min_years_experience(),
    );
    let education = Ok(score_education(profile.education, requirement.education()));

    let coverage = (skills.matching_skills(), skills.missing_skills());
    assemble(
        candidate_id,
        Ok(skills.dimension),
        experience,
        education,
        requirement.weights(),
        &profile.low_confidence_reasons(),
    )
    .map(|result| result.with_skill_coverage(coverage.0, coverage.1))
}

fn advance(candidate_id: &str, state: &mut CandidateState, next: CandidateState) {
    debug_assert!(
        state.can_transition_to(next),
        "invalid transition {state:?} -> {next:?}"
    );
    debug!(candidate_id, from = ?*state, to = ?next, "Candidate state");
    *state = next;
}
