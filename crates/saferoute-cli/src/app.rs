//! Wiring: config → backend, paths → credential store → controller.

use app_config_and_utils::{AuthBackendKind, Config, Paths};
use credential_store::{CredentialStore, FileCredentialStore};
use session_controller::{
    AuthBackend, FederatedCallbackServer, FirebaseAuthBackend, MockAuthBackend, SessionController,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Build the auth backend selected by the config.
///
/// Mock accounts are kept in `~/.saferoute/mock_accounts.json` so an account
/// created by one invocation can log in from the next.
pub fn build_backend(config: &Config, paths: &Paths) -> anyhow::Result<Arc<dyn AuthBackend>> {
    config.validate()?;

    let backend: Arc<dyn AuthBackend> = match config.auth_backend {
        AuthBackendKind::Mock => Arc::new(
            MockAuthBackend::with_latency(Duration::from_millis(config.mock_latency_ms))
                .with_account_store(Arc::new(FileCredentialStore::new(
                    paths.mock_accounts_file(),
                ))),
        ),
        AuthBackendKind::Firebase => {
            let api_key = config.firebase_api_key.clone().unwrap_or_default();
            Arc::new(
                FirebaseAuthBackend::with_base_url(api_key, &config.identity_toolkit_url)
                    .with_callback_server(FederatedCallbackServer::new(
                        config.federated_callback_port,
                        config.federated_timeout_secs,
                    )),
            )
        }
    };

    debug!(backend = %config.auth_backend, "Auth backend ready");
    Ok(backend)
}

/// Open the persisted session at `~/.saferoute/credentials.json`.
pub async fn open_controller(
    config: &Config,
    paths: &Paths,
) -> anyhow::Result<Arc<SessionController>> {
    paths.ensure_dirs()?;
    let backend = build_backend(config, paths)?;
    let store: Arc<dyn CredentialStore> =
        Arc::new(FileCredentialStore::new(paths.credentials_file()));

    Ok(SessionController::start(store, backend).await)
}
