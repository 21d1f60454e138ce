//! Mock auth backend.
//!
//! Accounts live in memory and, when an account store is attached, are
//! mirrored to it so they outlive the process.

use super::AuthBackend;
use crate::user::Identity;
use crate::{AuthError, AuthResult};
use async_trait::async_trait;
use credential_store::CredentialStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Email of the identity returned by federated sign-in.
pub const MOCK_GOOGLE_EMAIL: &str = "mockuser@gmail.com";

const MOCK_GOOGLE_DISPLAY_NAME: &str = "Mock User";

#[derive(Clone, Serialize, Deserialize)]
struct MockUser {
    identity: Identity,
    password: String,
}

/// Auth backend keeping accounts keyed by email.
///
/// Latency is zero unless configured, so tests run instantly; the CLI uses a
/// small delay to feel like a network call.
#[derive(Default)]
pub struct MockAuthBackend {
    users: Mutex<HashMap<String, MockUser>>,
    accounts: Option<Arc<dyn CredentialStore>>,
    latency: Duration,
    next_failure: Mutex<Option<AuthError>>,
}

impl MockAuthBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Mirror accounts to `accounts`, one JSON record per email key.
    pub fn with_account_store(mut self, accounts: Arc<dyn CredentialStore>) -> Self {
        self.accounts = Some(accounts);
        self
    }

    /// Seed an account, returning its identity.
    pub async fn register_user(&self, email: &str, password: &str) -> AuthResult<Identity> {
        let identity = Self::new_identity(email, None);
        let mut users = self.users.lock().await;
        self.insert_user(
            &mut users,
            email,
            MockUser {
                identity: identity.clone(),
                password: password.to_string(),
            },
        )
        .await?;
        Ok(identity)
    }

    /// Make the next backend call fail with `error`.
    pub async fn fail_next(&self, error: AuthError) {
        *self.next_failure.lock().await = Some(error);
    }

    pub async fn user_count(&self) -> usize {
        self.users.lock().await.len()
    }

    /// Look up an account in memory, then in the account store.
    async fn find_user(
        &self,
        users: &mut HashMap<String, MockUser>,
        email: &str,
    ) -> AuthResult<Option<MockUser>> {
        if let Some(user) = users.get(email) {
            return Ok(Some(user.clone()));
        }
        let Some(accounts) = &self.accounts else {
            return Ok(None);
        };

        let Some(raw) = accounts.get(email).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<MockUser>(&raw) {
            Ok(user) => {
                users.insert(email.to_string(), user.clone());
                Ok(Some(user))
            }
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable mock account record");
                Ok(None)
            }
        }
    }

    async fn insert_user(
        &self,
        users: &mut HashMap<String, MockUser>,
        email: &str,
        user: MockUser,
    ) -> AuthResult<()> {
        if let Some(accounts) = &self.accounts {
            accounts.set(email, &serde_json::to_string(&user)?).await?;
        }
        users.insert(email.to_string(), user);
        Ok(())
    }

    async fn simulate_call(&self) -> AuthResult<()> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match self.next_failure.lock().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn new_identity(email: &str, phone_number: Option<&str>) -> Identity {
        Identity {
            phone_number: phone_number.map(str::to_string),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
            ..Identity::new(format!("mock_{}", uuid::Uuid::new_v4()), email)
        }
    }
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        phone_number: Option<&str>,
    ) -> AuthResult<Identity> {
        self.simulate_call().await?;

        let mut users = self.users.lock().await;
        if self.find_user(&mut users, email).await?.is_some() {
            return Err(AuthError::EmailAlreadyInUse);
        }

        let identity = Self::new_identity(email, phone_number);
        self.insert_user(
            &mut users,
            email,
            MockUser {
                identity: identity.clone(),
                password: password.to_string(),
            },
        )
        .await?;

        info!(user_id = %identity.id, "Mock sign-up");
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity> {
        self.simulate_call().await?;

        let mut users = self.users.lock().await;
        match self.find_user(&mut users, email).await? {
            Some(user) if user.password == password => {
                info!(user_id = %user.identity.id, "Mock sign-in");
                Ok(user.identity.clone())
            }
            Some(_) => Err(AuthError::InvalidCredentials(
                "Wrong password".to_string(),
            )),
            None => Err(AuthError::InvalidCredentials(
                "No account for this email".to_string(),
            )),
        }
    }

    async fn sign_in_federated(&self) -> AuthResult<Identity> {
        self.simulate_call().await?;

        let identity = Identity {
            email_verified: true,
            display_name: Some(MOCK_GOOGLE_DISPLAY_NAME.to_string()),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
            ..Identity::new(
                format!("google_mock_{}", uuid::Uuid::new_v4()),
                MOCK_GOOGLE_EMAIL,
            )
        };

        info!(user_id = %identity.id, "Mock Google sign-in");
        Ok(identity)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.simulate_call().await?;
        debug!("Mock sign-out");
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> AuthResult<()> {
        self.simulate_call().await?;
        info!(email = %email, "Mock password reset email sent");
        Ok(())
    }
}
