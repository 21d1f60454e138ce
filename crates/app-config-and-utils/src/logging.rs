//! Logging initialization.
//!
//! Thin wrapper over the observability package: structured JSONL goes to
//! `~/.saferoute/logs/dev.jsonl`, and to stderr as well unless
//! `SAFEROUTE_LOG_STDERR` is set to a false value.

use observability::LogConfig;

const ENV_LOG_STDERR: &str = "SAFEROUTE_LOG_STDERR";

/// Initialize logging for the command-line app.
///
/// `level` is the default filter (trace, debug, info, warn, error);
/// `RUST_LOG` takes precedence when set.
pub fn init_logging(level: &str) {
    init_logging_for_service("saferoute-cli", level);
}

/// Initialize logging with a custom service name.
pub fn init_logging_for_service(service_name: &str, level: &str) {
    let also_stderr = std::env::var(ENV_LOG_STDERR)
        .ok()
        .and_then(non_empty_env)
        .map_or(true, |raw| parse_bool(&raw));

    observability::init_with_config(LogConfig {
        service_name: service_name.into(),
        default_level: parse_level(level).to_string().to_ascii_lowercase(),
        also_stderr,
        ..Default::default()
    });
}

pub(crate) fn non_empty_env(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_bool(raw: &str) -> bool {
    !matches!(
        raw.to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
