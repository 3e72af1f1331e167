use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use screener::config::{Config, EmbeddingBackendKind};
use screener::embedding::{EmbeddingBackend, HashEmbeddingBackend, HttpEmbeddingBackend};
use screener::extraction::{FieldExtractor, LlmFieldExtractor, RuleBasedExtractor};
use screener::llm_client::LlmClient;
use screener::screening::{CancelSignal, JobRequirement, RankingEngine};
use screener::source::ResumeFolder;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging. stdout carries the report, logs go to stderr.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting screener v{}", env!("CARGO_PKG_VERSION"));

    let requirement = load_requirement(&config)?;
    info!(
        "Requirement loaded: {} required skills, {} years, {} education",
        requirement.required_skills().len(),
        requirement.min_years_experience(),
        requirement.education()
    );

    let extractor = build_extractor(&config);
    let embeddings = build_embedding_backend(&config);
    info!(
        "Extractor: {}, embedding backend: {}",
        extractor.name(),
        embeddings.name()
    );

    let engine = RankingEngine::new(extractor, embeddings, config.screening_config())?;
    let resumes = ResumeFolder::open(&config.resume_dir)?;
    info!("Screening {} resumes", resumes.remaining());

    // Ctrl-C stops dispatch; candidates already running still finish.
    let cancel = CancelSignal::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing in-flight candidates");
            on_interrupt.cancel();
        }
    });

    let report = engine
        .rank_with_cancel(&requirement, resumes, &cancel)
        .await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(err) = report.run_error() {
        return Err(err.into());
    }
    Ok(())
}

fn load_requirement(config: &Config) -> Result<JobRequirement> {
    let path = &config.requirement_path;
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read requirement file '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid requirement file '{}'", path.display()))
}

/// Hosted-model extraction when an API key is configured, rules otherwise.
fn build_extractor(config: &Config) -> Arc<dyn FieldExtractor> {
    match &config.llm_api_key {
        Some(key) => {
            let llm = LlmClient::new(
                key.clone(),
                config.llm_base_url.clone(),
                config.llm_model.clone(),
            );
            info!("LLM client initialized (model: {})", llm.model());
            Arc::new(LlmFieldExtractor::new(llm))
        }
        None => Arc::new(RuleBasedExtractor),
    }
}

fn build_embedding_backend(config: &Config) -> Arc<dyn EmbeddingBackend> {
    match (&config.embedding_backend, &config.embedding_url) {
        (EmbeddingBackendKind::Http, Some(url)) => Arc::new(HttpEmbeddingBackend::new(
            url.clone(),
            config.embedding_model.clone(),
            config.embedding_api_key.clone(),
        )),
        _ => Arc::new(HashEmbeddingBackend::new(config.embedding_dimension)),
    }
}
