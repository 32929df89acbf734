use std::path::PathBuf;

use anyhow::{bail, Context, Result};

const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Application configuration loaded from environment variables.
/// Startup fails if the model credential is missing or a numeric value is malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub llm_timeout_secs: u64,
    pub llm_max_attempts: u32,
    /// Upper bound on documents processed at once by a single screening run.
    pub screening_concurrency: usize,
    pub scratch_dir: Option<PathBuf>,
    pub aws_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so parsing can be tested
    /// without touching the process environment.
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let google_api_key = lookup("GOOGLE_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .context("Required environment variable 'GOOGLE_API_KEY' is not set")?;

        let screening_concurrency = match lookup("SCREENING_CONCURRENCY") {
            Some(raw) => parse_var::<usize>("SCREENING_CONCURRENCY", &raw)?,
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        };
        if screening_concurrency == 0 {
            bail!("SCREENING_CONCURRENCY must be at least 1");
        }

        let llm_max_attempts = match lookup("LLM_MAX_ATTEMPTS") {
            Some(raw) => parse_var::<u32>("LLM_MAX_ATTEMPTS", &raw)?,
            None => 1,
        };
        if llm_max_attempts == 0 {
            bail!("LLM_MAX_ATTEMPTS must be at least 1");
        }

        Ok(Config {
            google_api_key,
            gemini_model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_api_base: lookup("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            llm_timeout_secs: match lookup("LLM_TIMEOUT_SECS") {
                Some(raw) => parse_var("LLM_TIMEOUT_SECS", &raw)?,
                None => 120,
            },
            llm_max_attempts,
            screening_concurrency,
            scratch_dir: lookup("SCRATCH_DIR").map(PathBuf::from),
            aws_region: lookup("AWS_REGION"),
            s3_endpoint: lookup("S3_ENDPOINT"),
            port: match lookup("PORT") {
                Some(raw) => parse_var("PORT", &raw)?,
                None => 8080,
            },
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .ok()
        .with_context(|| format!("{key} must be a valid number, got '{raw}'"))
}
