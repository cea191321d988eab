//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and formats.
//! Every problem is reported, not just the first one.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::MonitorConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Paths served by the built-in handlers.
const RESERVED_PATHS: [&str; 1] = ["/ping"];

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a valid socket address")]
    BindAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("observability.service_name must not be blank")]
    BlankServiceName,

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    LogLevel(String),

    #[error("observability.metrics_path '{0}' must start with '/'")]
    MetricsPath(String),

    #[error("observability.metrics_path '{0}' is reserved")]
    ReservedMetricsPath(String),

    #[error("observability.metrics_path '{0}' must be a literal path without parameters or wildcards")]
    MetricsPathSyntax(String),
}

/// The router rejects captures (`{id}`), wildcards and old-style `:param` segments.
fn is_literal_route(path: &str) -> bool {
    !path.contains(['{', '}', '*']) && !path.split('/').any(|segment| segment.starts_with(':'))
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    let observability = &config.observability;
    if let Some(name) = &observability.service_name {
        if name.trim().is_empty() {
            errors.push(ValidationError::BlankServiceName);
        }
    }

    let level = observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(observability.log_level.clone()));
    }

    if observability.metrics_enabled {
        let path = &observability.metrics_path;
        if !path.starts_with('/') {
            errors.push(ValidationError::MetricsPath(path.clone()));
        } else if !is_literal_route(path) {
            errors.push(ValidationError::MetricsPathSyntax(path.clone()));
        } else if RESERVED_PATHS.contains(&path.as_str()) {
            errors.push(ValidationError::ReservedMetricsPath(path.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
