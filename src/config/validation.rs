//! Configuration validation.
//!
//! Returns every violation, not just the first. Pure function:
//! `&GatewayConfig → Result<(), Vec<ConfigViolation>>`.

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ConfigViolation {
    pub field: &'static str,
    pub message: String,
}

impl ConfigViolation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ConfigViolation>> {
    let mut errors = Vec::new();

    check_http_url("upstream.base_url", &config.upstream.base_url, &mut errors);
    if let Some(tokens) = &config.upstream.tokens_url {
        check_http_url("upstream.tokens_url", tokens, &mut errors);
    }
    if config.upstream.timeout_ms == 0 {
        errors.push(ConfigViolation::new("upstream.timeout_ms", "must be greater than 0"));
    }

    if config.security.allowed_origins.is_empty() {
        errors.push(ConfigViolation::new(
            "security.allowed_origins",
            "at least one origin is required",
        ));
    }
    if config.security.max_body_bytes == 0 {
        errors.push(ConfigViolation::new("security.max_body_bytes", "must be greater than 0"));
    }

    // The window also drives the idle-client sweep interval.
    if config.rate_limit.window_secs == 0 {
        errors.push(ConfigViolation::new("rate_limit.window_secs", "must be greater than 0"));
    }
    if config.rate_limit.enabled {
        if config.rate_limit.max_requests == 0 {
            errors.push(ConfigViolation::new("rate_limit.max_requests", "must be greater than 0"));
        }
        if !config.rate_limit.path_prefix.starts_with('/') {
            errors.push(ConfigViolation::new("rate_limit.path_prefix", "must start with '/'"));
        }
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<std::net::SocketAddr>().is_err() {
            errors.push(ConfigViolation::new(
                "observability.metrics_address",
                format!("'{}' is not a socket address", addr),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_http_url(field: &'static str, value: &str, errors: &mut Vec<ConfigViolation>) {
    match url::Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ConfigViolation::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ConfigViolation::new(field, format!("invalid URL: {}", e))),
    }
}
