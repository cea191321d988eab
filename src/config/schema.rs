//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the monitor.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the instrumented service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings (service identity, trace log, metrics).
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for the downstream handler) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Service name attached to the metrics snapshot and every trace log line.
    pub service_name: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Trace access-log file. Lines go to stderr when unset.
    pub trace_log_path: Option<PathBuf>,

    /// Expose the metrics read endpoint.
    pub metrics_enabled: bool,

    /// Path the metrics read endpoint is mounted on.
    pub metrics_path: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: None,
            log_level: "info".to_string(),
            trace_log_path: None,
            metrics_enabled: true,
            metrics_path: "/metrics".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MonitorConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.timeouts.request_secs, 30);
        assert!(config.observability.service_name.is_none());
        assert!(config.observability.metrics_enabled);
        assert_eq!(config.observability.metrics_path, "/metrics");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: MonitorConfig = toml::from_str(
            r#"
            [observability]
            service_name = "orders"
            trace_log_path = "/var/log/orders-trace.log"
            "#,
        )
        .unwrap();

        assert_eq!(config.observability.service_name.as_deref(), Some("orders"));
        assert_eq!(
            config.observability.trace_log_path,
            Some(PathBuf::from("/var/log/orders-trace.log"))
        );
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}
