//! Client configuration.
//!
//! The API base URL comes from the deployment environment; timeouts and the
//! 401 handling policy have compile-time defaults that can be overridden by
//! environment variables.

use std::time::Duration;

use anyhow::{Context, Result};

/// Environment variable holding the API base URL
pub const API_ROOT_VAR: &str = "API_ROOT";

/// HTTP request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

/// Inactivity before a forced logout: 30 minutes.
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 1_800_000;

/// What the response interceptor does with the error after a 401 has
/// logged the session out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnauthorizedPolicy {
    /// The caller sees `Ok(None)` instead of an error.
    #[default]
    Absorb,
    /// The caller sees `ApiError::Unauthorized`.
    Propagate,
}

impl UnauthorizedPolicy {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "absorb" => Ok(Self::Absorb),
            "propagate" => Ok(Self::Propagate),
            other => Err(anyhow::anyhow!(
                "Invalid UNAUTHORIZED_POLICY '{}' (expected 'absorb' or 'propagate')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub idle_timeout: Duration,
    pub start_idle: bool,
    pub unauthorized_policy: UnauthorizedPolicy,
}

impl ClientConfig {
    /// Config with default timeouts for the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            idle_timeout: Duration::from_millis(DEFAULT_IDLE_TIMEOUT_MS),
            start_idle: false,
            unauthorized_policy: UnauthorizedPolicy::default(),
        }
    }

    /// Build config from environment variables.
    ///
    /// Required:
    /// - `API_ROOT`
    ///
    /// Optional:
    /// - `API_REQUEST_TIMEOUT_MS`: default 5000
    /// - `IDLE_TIMEOUT_MS`: default 1800000
    /// - `IDLE_START_AT_IDLE`: `true` or `false` (default)
    /// - `UNAUTHORIZED_POLICY`: `absorb` (default) or `propagate`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(API_ROOT_VAR)
            .filter(|v| !v.trim().is_empty())
            .with_context(|| format!("{} is not set", API_ROOT_VAR))?;

        let mut config = Self::new(base_url);

        if let Some(raw) = lookup("API_REQUEST_TIMEOUT_MS") {
            let ms: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid API_REQUEST_TIMEOUT_MS '{}'", raw))?;
            config.request_timeout = Duration::from_millis(ms);
        }
        if let Some(raw) = lookup("IDLE_TIMEOUT_MS") {
            let ms: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid IDLE_TIMEOUT_MS '{}'", raw))?;
            config.idle_timeout = Duration::from_millis(ms);
        }
        if let Some(raw) = lookup("IDLE_START_AT_IDLE") {
            config.start_idle = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid IDLE_START_AT_IDLE '{}'", raw))?;
        }
        if let Some(raw) = lookup("UNAUTHORIZED_POLICY") {
            config.unauthorized_policy = UnauthorizedPolicy::parse(&raw)?;
        }

        Ok(config)
    }

    /// Join an API path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_only_base_url_set() {
        let config = ClientConfig::from_lookup(lookup_from(&[("API_ROOT", "https://phones.example.com/api/")]))
            .expect("config should load");
        assert_eq!(config.base_url, "https://phones.example.com/api");
        assert_eq!(config.request_timeout, Duration::from_millis(5_000));
        assert_eq!(config.idle_timeout, Duration::from_millis(1_800_000));
        assert!(!config.start_idle);
        assert_eq!(config.unauthorized_policy, UnauthorizedPolicy::Absorb);
    }

    #[test]
    fn test_missing_base_url_is_error() {
        assert!(ClientConfig::from_lookup(lookup_from(&[])).is_err());
        assert!(ClientConfig::from_lookup(lookup_from(&[("API_ROOT", "  ")])).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("API_ROOT", "http://localhost:8000"),
            ("API_REQUEST_TIMEOUT_MS", "250"),
            ("IDLE_TIMEOUT_MS", "3000"),
            ("IDLE_START_AT_IDLE", "true"),
            ("UNAUTHORIZED_POLICY", "Propagate"),
        ]))
        .expect("config should load");
        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(config.idle_timeout, Duration::from_millis(3000));
        assert!(config.start_idle);
        assert_eq!(config.unauthorized_policy, UnauthorizedPolicy::Propagate);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ClientConfig::from_lookup(lookup_from(&[
            ("API_ROOT", "http://localhost"),
            ("IDLE_TIMEOUT_MS", "soon"),
        ]))
        .is_err());
        assert!(ClientConfig::from_lookup(lookup_from(&[
            ("API_ROOT", "http://localhost"),
            ("UNAUTHORIZED_POLICY", "ignore"),
        ]))
        .is_err());
    }

    #[test]
    fn test_url_join() {
        let config = ClientConfig::new("http://localhost:8000/");
        assert_eq!(config.url("/auth/get_token"), "http://localhost:8000/auth/get_token");
        assert_eq!(config.url("phonedata/info"), "http://localhost:8000/phonedata/info");
    }
}
