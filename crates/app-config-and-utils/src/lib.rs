//! Configuration, paths and logging setup for SafeRoute.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    AuthBackendKind, Config, DEFAULT_FEDERATED_CALLBACK_PORT, DEFAULT_FEDERATED_TIMEOUT_SECS,
    DEFAULT_FIREBASE_API_KEY, DEFAULT_IDENTITY_TOOLKIT_URL, DEFAULT_LOG_LEVEL,
    DEFAULT_MOCK_LATENCY_MS,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, init_logging_for_service, parse_level};
pub use paths::Paths;
