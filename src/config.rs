use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use log::{info, warn};

use crate::error::{AuditError, Result};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

/// Process configuration, read once at startup and passed to everything that needs it.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub allowed_origins: Vec<String>,
    pub submissions_log: PathBuf,
    pub session_ttl: Duration,
    pub upstream_timeout: Duration,
    pub cookie_secure: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_base_url: GEMINI_BASE_URL.to_string(),
            allowed_origins: parse_origins(DEFAULT_ORIGINS),
            submissions_log: PathBuf::from("user_data.json"),
            session_ttl: Duration::from_secs(60 * 60),
            upstream_timeout: Duration::from_secs(30),
            cookie_secure: true,
        }
    }
}

impl ServiceConfig {
    pub fn load() -> Result<Self> {
        let gemini_api_key = var("GEMINI_API_KEY").filter(|key| !key.trim().is_empty());
        if gemini_api_key.is_none() {
            warn!("GEMINI_API_KEY not set, /submit will answer 503");
        }

        Ok(Self {
            port: try_load("PORT", "5000")?,
            gemini_api_key,
            gemini_model: try_load("GEMINI_MODEL", DEFAULT_MODEL)?,
            gemini_base_url: try_load("GEMINI_BASE_URL", GEMINI_BASE_URL)?,
            allowed_origins: parse_origins(&try_load::<String>("ALLOWED_ORIGINS", DEFAULT_ORIGINS)?),
            submissions_log: try_load("SUBMISSIONS_LOG", "user_data.json")?,
            session_ttl: Duration::from_secs(try_load("SESSION_TTL_SECS", "3600")?),
            upstream_timeout: Duration::from_secs(try_load("UPSTREAM_TIMEOUT_SECS", "30")?),
            cookie_secure: try_load("COOKIE_SECURE", "true")?,
        })
    }

    pub fn is_allowed_origin(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| AuditError::Config(format!("Invalid {key} value: {e}")))
}

/// Splits a comma-separated origin list, dropping blanks and trailing slashes.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
