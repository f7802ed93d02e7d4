use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// Provider credentials fall back to empty strings so the service can boot
/// for local development; every provider call then fails as "not configured".
#[derive(Debug, Clone)]
pub struct Config {
    pub google_places_api_key: String,
    pub dataforseo_login: String,
    pub dataforseo_password: String,
    pub static_dir: String,
    pub cors_origin: Option<String>,
    pub analysis_timeout: Duration,
    pub job_retention: Duration,
    pub job_sweep_interval: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_places_api_key: env_or("GOOGLE_PLACES_API_KEY", ""),
            dataforseo_login: env_or("DATAFORSEO_LOGIN", ""),
            dataforseo_password: env_or("DATAFORSEO_PASSWORD", ""),
            static_dir: env_or("STATIC_DIR", "frontend"),
            cors_origin: std::env::var("CORS_ORIGIN").ok().filter(|v| !v.is_empty()),
            analysis_timeout: Duration::from_secs(parse_env("ANALYSIS_TIMEOUT_SECS", 900)?),
            job_retention: Duration::from_secs(parse_env("JOB_RETENTION_SECS", 86_400)?),
            job_sweep_interval: Duration::from_secs(parse_env("JOB_SWEEP_INTERVAL_SECS", 300)?),
            port: parse_env("PORT", 5001)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// Names of credential variables left empty. Logged as a warning at startup.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.google_places_api_key.is_empty() {
            missing.push("GOOGLE_PLACES_API_KEY");
        }
        if self.dataforseo_login.is_empty() {
            missing.push("DATAFORSEO_LOGIN");
        }
        if self.dataforseo_password.is_empty() {
            missing.push("DATAFORSEO_PASSWORD");
        }
        missing
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_lists_empty_keys() {
        let config = Config {
            google_places_api_key: "key".to_string(),
            dataforseo_login: String::new(),
            dataforseo_password: String::new(),
            static_dir: "frontend".to_string(),
            cors_origin: None,
            analysis_timeout: Duration::from_secs(900),
            job_retention: Duration::from_secs(86_400),
            job_sweep_interval: Duration::from_secs(300),
            port: 5001,
            rust_log: "info".to_string(),
        };
        assert_eq!(
            config.missing_credentials(),
            vec!["DATAFORSEO_LOGIN", "DATAFORSEO_PASSWORD"]
        );
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u64 = parse_env("DENTISTENVY_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
