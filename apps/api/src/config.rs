use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Primary provider.
    pub openai_api_key: String,
    /// Secondary provider. Absent means premium requests run the standard path.
    pub anthropic_api_key: Option<String>,
    /// Dollars per month. 0 disables budget control.
    pub monthly_ai_budget: f64,
    /// Provider calls per day. 0 means unlimited.
    pub daily_api_limit: u32,
    /// Largest accepted `target_length`, in words.
    pub max_content_length: u32,
    pub max_output_tokens: u32,
    pub webhook_content_generated_url: Option<String>,
    pub webhook_content_published_url: Option<String>,
    pub job_queue_capacity: usize,
    pub job_max_attempts: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            monthly_ai_budget: parse_env("MONTHLY_AI_BUDGET", 0.0)?,
            daily_api_limit: parse_env("DAILY_API_LIMIT", 0)?,
            max_content_length: parse_env("MAX_CONTENT_LENGTH", 5000)?,
            max_output_tokens: parse_env("MAX_OUTPUT_TOKENS", 4000)?,
            webhook_content_generated_url: optional_env("WEBHOOK_CONTENT_GENERATED_URL"),
            webhook_content_published_url: optional_env("WEBHOOK_CONTENT_PUBLISHED_URL"),
            job_queue_capacity: parse_env("JOB_QUEUE_CAPACITY", 1024)?,
            job_max_attempts: parse_env("JOB_MAX_ATTEMPTS", 3)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values both count as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
