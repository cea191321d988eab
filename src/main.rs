//! route-monitor
//!
//! An Axum service instrumented with per-route request metrics and
//! `X-Trace-ID` / `X-Span-ID` trace propagation.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ trace_middleware ──▶ metrics_middleware ──▶ handler
//!                          │                      │
//!                          ▼                      ▼
//!                     TracePropagator        MetricsStore ◀── GET /metrics
//!                          │
//!                          ▼
//!                      TraceLog (file or stderr, non-blocking)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use route_monitor::config::{load_config, validate_config, ConfigError, MonitorConfig};
use route_monitor::lifecycle::{shutdown_signal, Shutdown};
use route_monitor::observability::logging::init_logging;
use route_monitor::HttpServer;

#[derive(Debug, Parser)]
#[command(name = "route-monitor", version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(long, env = "ROUTE_MONITOR_BIND")]
    bind: Option<String>,

    /// Override observability.service_name.
    #[arg(long, env = "SERVICE_NAME")]
    service_name: Option<String>,

    /// Override observability.trace_log_path.
    #[arg(long)]
    trace_log: Option<PathBuf>,
}

impl Cli {
    /// Build the startup configuration. It is not modified afterwards.
    fn into_config(self) -> Result<MonitorConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => MonitorConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(name) = self.service_name {
            config.observability.service_name = Some(name);
        }
        if let Some(path) = self.trace_log {
            config.observability.trace_log_path = Some(path);
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    init_logging(&config.observability)?;

    tracing::info!("route-monitor v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        service_name = config.observability.service_name.as_deref().unwrap_or(""),
        request_timeout_secs = config.timeouts.request_secs,
        metrics_path = %config.observability.metrics_path,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Parse without the process environment, so `ROUTE_MONITOR_BIND` and
    /// `SERVICE_NAME` set around the test run cannot leak in.
    fn parse_isolated(args: &[&str]) -> Cli {
        use clap::{CommandFactory, FromArgMatches};

        let command = Cli::command()
            .mut_arg("bind", |arg| arg.env(None::<&str>))
            .mut_arg("service_name", |arg| arg.env(None::<&str>));
        let matches = command.get_matches_from(args);
        Cli::from_arg_matches(&matches).unwrap()
    }

    #[test]
    fn test_cli_overrides_apply() {
        let cli = parse_isolated(&[
            "route-monitor",
            "--bind",
            "127.0.0.1:9999",
            "--service-name",
            "checkout",
        ]);
        let config = cli.into_config().unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9999");
        assert_eq!(config.observability.service_name.as_deref(), Some("checkout"));
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = parse_isolated(&["route-monitor"]).into_config().unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.observability.service_name.is_none());
    }

    #[test]
    fn test_cli_overrides_are_validated() {
        let cli = parse_isolated(&["route-monitor", "--bind", "nowhere"]);
        assert!(matches!(cli.into_config(), Err(ConfigError::Validation(_))));
    }
}
