use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Default Gemini model used for comment generation.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Public Gemini REST endpoint.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 300;

#[derive(Debug, Clone, Deserialize)]
pub struct CommentConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    /// Deployment label (`NODE_ENV`). Informational only.
    pub environment: String,
    pub gemini: GeminiSettings,
    /// Seconds between heartbeat log lines; `0` disables the heartbeat.
    pub heartbeat_interval_secs: u64,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl CommentConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        Ok(CommentConfig {
            common: common_config,
            environment: get_env("NODE_ENV", Some("development"))?,
            gemini: GeminiSettings {
                model: get_env("GEMINI_MODEL", Some(DEFAULT_GEMINI_MODEL))?,
                api_base: get_env("GEMINI_API_BASE", Some(DEFAULT_GEMINI_API_BASE))?,
                timeout_secs: parse_env("GEMINI_TIMEOUT_SECS", DEFAULT_GEMINI_TIMEOUT_SECS)?,
            },
            heartbeat_interval_secs: parse_env(
                "HEARTBEAT_INTERVAL_SECS",
                DEFAULT_HEARTBEAT_INTERVAL_SECS,
            )?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
        })
    }
}

fn get_env(key: &str, default: Option<&str>) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => match default {
            Some(def) => Ok(def.to_string()),
            None => Err(AppError::ConfigError(anyhow::anyhow!(
                "{} is required but not set",
                key
            ))),
        },
    }
}

fn parse_env(key: &str, default: u64) -> Result<u64, AppError> {
    let raw = get_env(key, Some(&default.to_string()))?;
    raw.trim().parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("{} must be a non-negative integer: {}", key, e))
    })
}
