use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::ingest::upload::DEFAULT_MAX_UPLOAD_BYTES;
use crate::llm_client::{GeminiModel, DEFAULT_API_BASE};

/// Which `Planner` implementation the service runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerBackend {
    Llm,
    Preset,
}

impl FromStr for PlannerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "llm" => Ok(PlannerBackend::Llm),
            "preset" => Ok(PlannerBackend::Preset),
            other => bail!("PLANNER_BACKEND must be 'llm' or 'preset', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable has a default; the LLM key is supplied per session, never here.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub llm_api_base: String,
    pub llm_default_model: GeminiModel,
    pub llm_timeout_secs: u64,
    pub max_upload_bytes: u64,
    pub planner_backend: PlannerBackend,
    /// Sessions untouched for this long are evicted.
    pub session_idle_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            llm_api_base: DEFAULT_API_BASE.to_string(),
            llm_default_model: GeminiModel::default(),
            llm_timeout_secs: 120,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            planner_backend: PlannerBackend::Llm,
            session_idle_secs: 3600,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        let defaults = Config::default();

        let llm_default_model = match optional_env("LLM_DEFAULT_MODEL") {
            Some(name) => GeminiModel::parse(&name)
                .with_context(|| format!("LLM_DEFAULT_MODEL '{name}' is not a supported model"))?,
            None => defaults.llm_default_model,
        };

        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
            llm_api_base: optional_env("LLM_API_BASE").unwrap_or(defaults.llm_api_base),
            llm_default_model,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", defaults.llm_timeout_secs)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            planner_backend: parse_env("PLANNER_BACKEND", defaults.planner_backend)?,
            session_idle_secs: parse_env("SESSION_IDLE_SECS", defaults.session_idle_secs)?,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planner_backend_parses_case_insensitively() {
        assert_eq!("LLM".parse::<PlannerBackend>().unwrap(), PlannerBackend::Llm);
        assert_eq!(" preset ".parse::<PlannerBackend>().unwrap(), PlannerBackend::Preset);
        assert!("mock".parse::<PlannerBackend>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.llm_default_model, GeminiModel::Flash);
        assert_eq!(config.planner_backend, PlannerBackend::Llm);
        assert_eq!(config.session_idle_secs, 3600);
    }
}
