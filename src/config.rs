//! Process configuration, read once at startup

use crate::llm::LlmConfig;
use crate::retrieval::{RetrievalConfig, DEFAULT_MATCH_COUNT};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_INVOCATION_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("No generation credentials: set GROQ_API_KEY or OPENAI_API_KEY")]
    NoGenerationCredentials,
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    pub db_path: PathBuf,
    /// JSON template catalog overriding the built-in templates
    pub templates_path: Option<PathBuf>,
    pub port: u16,
    pub invocation_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Missing credentials are fatal.
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let llm = LlmConfig::from_lookup(lookup);
        // A gateway authenticates on our behalf
        if !llm.has_credentials() && llm.gateway.is_none() {
            return Err(ConfigError::NoGenerationCredentials);
        }

        let retrieval = RetrievalConfig {
            together_api_key: required("TOGETHER_AI_API_KEY")?,
            supabase_url: required("SUPABASE_URL")?,
            supabase_key: required("SUPABASE_PRIVATE_KEY")?,
            match_count: parse_or(
                "CONTRAKT_MATCH_COUNT",
                var("CONTRAKT_MATCH_COUNT"),
                DEFAULT_MATCH_COUNT,
            )?,
        };

        let db_path = var("CONTRAKT_DB_PATH").map_or_else(
            || {
                let home = var("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(format!("{home}/.contrakt/contributions.db"))
            },
            PathBuf::from,
        );

        let port = parse_or("CONTRAKT_PORT", var("CONTRAKT_PORT"), DEFAULT_PORT)?;
        let timeout_secs = parse_or(
            "CONTRAKT_INVOCATION_TIMEOUT_SECS",
            var("CONTRAKT_INVOCATION_TIMEOUT_SECS"),
            DEFAULT_INVOCATION_TIMEOUT.as_secs(),
        )?;

        Ok(Self {
            llm,
            retrieval,
            db_path,
            templates_path: var("CONTRAKT_TEMPLATES_PATH").map(PathBuf::from),
            port,
            invocation_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
