//! # Observability
//!
//! Logging setup shared by the SafeRoute crates.
//!
//! Library code only uses `tracing` macros. Binaries call [`init`] or
//! [`init_with_config`] once at startup, which installs:
//!
//! - a JSON layer appending one entry per line to
//!   `~/.saferoute/logs/dev.jsonl` (or [`LogConfig::log_path`])
//! - optionally a compact stderr layer
//!
//! The level comes from `RUST_LOG` when set, otherwise from
//! [`LogConfig::default_level`].
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "saferoute-cli".into(),
//!     default_level: "debug".into(),
//!     also_stderr: true,
//!     ..Default::default()
//! });
//! ```

mod json_layer;
mod writer;

pub use json_layer::{JsonLayer, LogEntry};
pub use writer::LogFileWriter;

use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service, written on every line.
    pub service_name: String,

    /// Default level filter; `RUST_LOG` overrides it.
    pub default_level: String,

    /// Log file path. Defaults to `~/.saferoute/logs/dev.jsonl`.
    pub log_path: Option<PathBuf>,

    /// Also emit logs to stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Central log file location.
pub fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".saferoute")
        .join("logs")
        .join("dev.jsonl")
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize logging with default settings.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Initialize logging with custom configuration.
///
/// If the log file cannot be opened, logging continues on stderr only.
/// Calling this twice leaves the first subscriber in place.
pub fn init_with_config(config: LogConfig) {
    let log_path = config.log_path.clone().unwrap_or_else(default_log_path);

    let (json_layer, file_error) = match LogFileWriter::open(&log_path) {
        Ok(writer) => (
            Some(
                JsonLayer::new(config.service_name.clone(), writer)
                    .with_filter(env_filter(&config.default_level)),
            ),
            None,
        ),
        Err(e) => (None, Some(e)),
    };

    let stderr_layer = (config.also_stderr || json_layer.is_none()).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .compact()
            .with_writer(std::io::stderr)
            .with_filter(env_filter(&config.default_level))
    });

    let installed = tracing_subscriber::registry()
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok();
    if !installed {
        return;
    }

    match file_error {
        None => tracing::info!(
            log_path = %log_path.display(),
            service = %config.service_name,
            "observability initialized"
        ),
        Some(e) => tracing::warn!(
            log_path = %log_path.display(),
            error = %e,
            "log file unavailable, logging to stderr only"
        ),
    }
}

pub use tracing::{debug, error, info, instrument, trace, warn, Level};
