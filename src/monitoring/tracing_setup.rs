use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Keeps the file writer flushing; hold it until the process exits.
pub type TracingGuard = Option<WorkerGuard>;

/// Logging configuration, the `[logging]` section of the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Filter directive; `RUST_LOG` takes precedence when set.
    pub log_level: String,
    pub enable_json_logs: bool,
    /// When set, logs are also written as JSON to a daily rolling file.
    pub log_file_path: Option<PathBuf>,
    pub service_name: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            enable_json_logs: false,
            log_file_path: None,
            service_name: "portscout".to_string(),
        }
    }
}

impl TracingConfig {
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.log_level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }

    /// Install the global subscriber.
    pub fn init_tracing(&self) -> Result<TracingGuard> {
        let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

        if self.enable_json_logs {
            layers.push(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .boxed(),
            );
        } else {
            layers.push(fmt::layer().with_target(true).compact().boxed());
        }

        let guard = match &self.log_file_path {
            Some(path) => {
                let dir = path
                    .parent()
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("."));
                let file_name = path
                    .file_name()
                    .context("log_file_path must name a file")?;

                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

                let appender = tracing_appender::rolling::daily(&dir, file_name);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                layers.push(
                    fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .json()
                        .boxed(),
                );
                Some(guard)
            }
            None => None,
        };

        Registry::default()
            .with(layers)
            .with(self.env_filter())
            .try_init()
            .context("Failed to install tracing subscriber")?;

        tracing::debug!(service = %self.service_name, "Tracing initialized");
        Ok(guard)
    }
}

/// Log API request
pub fn log_api_request(method: &str, path: &str, status_code: u16, duration_ms: f64) {
    if status_code >= 500 {
        tracing::warn!(
            method = %method,
            path = %path,
            status_code = %status_code,
            duration_ms = %duration_ms,
            "API request"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            status_code = %status_code,
            duration_ms = %duration_ms,
            "API request"
        );
    }
}
