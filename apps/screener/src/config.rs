use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::embedding::hash_backend::DEFAULT_DIMENSION;
use crate::llm_client;
use crate::screening::ranking::{
    default_workers, ScreeningConfig, DEFAULT_CALL_TIMEOUT, DEFAULT_CONSECUTIVE_FAILURE_LIMIT,
};
use crate::screening::similarity::DEFAULT_SIMILARITY_THRESHOLD;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddingBackendKind {
    Hash,
    Http,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub requirement_path: PathBuf,
    pub resume_dir: PathBuf,
    pub workers: usize,
    pub similarity_threshold: f64,
    pub consecutive_failure_limit: usize,
    pub call_timeout: Duration,
    pub embedding_backend: EmbeddingBackendKind,
    pub embedding_dimension: usize,
    pub embedding_url: Option<String>,
    pub embedding_model: String,
    pub embedding_api_key: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let embedding_backend = match get("EMBEDDING_BACKEND").as_deref() {
            None | Some("hash") => EmbeddingBackendKind::Hash,
            Some("http") => EmbeddingBackendKind::Http,
            Some(other) => bail!("EMBEDDING_BACKEND must be 'hash' or 'http', got '{other}'"),
        };
        let embedding_url = get("EMBEDDING_URL");
        if embedding_backend == EmbeddingBackendKind::Http && embedding_url.is_none() {
            bail!("EMBEDDING_URL is required when EMBEDDING_BACKEND=http");
        }

        Ok(Config {
            requirement_path: PathBuf::from(require("SCREEN_REQUIREMENT_PATH")?),
            resume_dir: PathBuf::from(require("SCREEN_RESUME_DIR")?),
            workers: parse_or(get("SCREEN_WORKERS"), default_workers(), "SCREEN_WORKERS")?,
            similarity_threshold: parse_or(
                get("SIMILARITY_THRESHOLD"),
                DEFAULT_SIMILARITY_THRESHOLD,
                "SIMILARITY_THRESHOLD",
            )?,
            consecutive_failure_limit: parse_or(
                get("CONSECUTIVE_FAILURE_LIMIT"),
                DEFAULT_CONSECUTIVE_FAILURE_LIMIT,
                "CONSECUTIVE_FAILURE_LIMIT",
            )?,
            call_timeout: Duration::from_secs(parse_or(
                get("CALL_TIMEOUT_SECS"),
                DEFAULT_CALL_TIMEOUT.as_secs(),
                "CALL_TIMEOUT_SECS",
            )?),
            embedding_backend,
            embedding_dimension: parse_or(
                get("EMBEDDING_DIMENSION"),
                DEFAULT_DIMENSION,
                "EMBEDDING_DIMENSION",
            )?,
            embedding_url,
            embedding_model: get("EMBEDDING_MODEL")
                .unwrap_or_else(|| "text-embedding-3-small".to_string()),
            embedding_api_key: get("EMBEDDING_API_KEY"),
            llm_api_key: get("LLM_API_KEY"),
            llm_base_url: get("LLM_BASE_URL")
                .unwrap_or_else(|| llm_client::DEFAULT_BASE_URL.to_string()),
            llm_model: get("LLM_MODEL").unwrap_or_else(|| llm_client::DEFAULT_MODEL.to_string()),
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Engine configuration. Range checks happen when the engine is built.
    pub fn screening_config(&self) -> ScreeningConfig {
        ScreeningConfig {
            similarity_threshold: self.similarity_threshold,
            consecutive_failure_limit: self.consecutive_failure_limit,
            workers: self.workers,
            call_timeout: self.call_timeout,
        }
    }
}

fn parse_or<T>(value: Option<String>, default: T, key: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
