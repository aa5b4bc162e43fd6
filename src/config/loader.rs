//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ConfigViolation};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {reason}")]
    Env { key: &'static str, reason: String },

    #[error("Validation failed: {}", join_violations(.0))]
    Validation(Vec<ConfigViolation>),
}

fn join_violations(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: optional TOML file, then environment overlay, then validation.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    let config = apply_env(config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so tests don't have to mutate process state.
pub fn apply_env<F>(mut config: GatewayConfig, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(port) = get("PORT") {
        config.server.port = parse_env("PORT", &port)?;
    }
    if let Some(name) = get("SERVICE_NAME") {
        config.server.service_name = name;
    }
    if let Some(format) = get("LOG_FORMAT") {
        config.observability.log_format = format
            .parse()
            .map_err(|reason| ConfigError::Env { key: "LOG_FORMAT", reason })?;
    }
    if let Some(base) = get("JUP_BASE_URL") {
        config.upstream.base_url = base.trim_end_matches('/').to_string();
    }
    if let Some(tokens) = get("JUP_TOKENS_URL") {
        config.upstream.tokens_url = Some(tokens);
    }
    if let Some(timeout) = get("UPSTREAM_TIMEOUT_MS") {
        config.upstream.timeout_ms = parse_env("UPSTREAM_TIMEOUT_MS", &timeout)?;
    }
    if let Some(origins) = get("ALLOWED_ORIGINS") {
        config.security.allowed_origins = origins
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
    }
    if let Some(max) = get("RATE_LIMIT_MAX") {
        config.rate_limit.max_requests = parse_env("RATE_LIMIT_MAX", &max)?;
    }
    if let Some(window) = get("RATE_LIMIT_WINDOW_SECS") {
        config.rate_limit.window_secs = parse_env("RATE_LIMIT_WINDOW_SECS", &window)?;
    }
    if let Some(bytes) = get("MAX_BODY_BYTES") {
        config.security.max_body_bytes = parse_env("MAX_BODY_BYTES", &bytes)?;
    }
    if let Some(addr) = get("METRICS_ADDRESS") {
        config.observability.metrics_address = Some(addr);
    }

    Ok(config)
}

fn parse_env<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        key,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogFormat;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_env_keeps_defaults() {
        let config = apply_env(GatewayConfig::default(), env(&[])).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.upstream.base_url, "https://quote-api.jup.ag/v6");
    }

    #[test]
    fn test_env_overrides() {
        let config = apply_env(
            GatewayConfig::default(),
            env(&[
                ("PORT", "4000"),
                ("SERVICE_NAME", "jup-proxy"),
                ("LOG_FORMAT", "json"),
                ("JUP_BASE_URL", "http://127.0.0.1:9999/v6/"),
                ("UPSTREAM_TIMEOUT_MS", "500"),
                ("ALLOWED_ORIGINS", "https://a.example, https://b.example,,"),
                ("RATE_LIMIT_MAX", "3"),
            ]),
        )
        .unwrap();

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.service_name, "jup-proxy");
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.upstream.base_url, "http://127.0.0.1:9999/v6");
        assert_eq!(config.upstream.timeout_ms, 500);
        assert_eq!(
            config.security.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.rate_limit.max_requests, 3);
    }

    #[test]
    fn test_blank_values_ignored() {
        let config = apply_env(GatewayConfig::default(), env(&[("ALLOWED_ORIGINS", "  ")])).unwrap();
        assert_eq!(config.security.allowed_origins.len(), 1);
    }

    #[test]
    fn test_bad_number_rejected() {
        let err = apply_env(GatewayConfig::default(), env(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
