//! Authentication backends.
//!
//! The controller only talks to [`AuthBackend`]. Two implementations ship:
//! [`MockAuthBackend`] (in-memory, for tests and offline demos) and
//! [`FirebaseAuthBackend`] (Identity Toolkit REST API).

mod firebase;
mod mock;

pub use firebase::{FirebaseAuthBackend, DEFAULT_IDENTITY_TOOLKIT_URL};
pub use mock::{MockAuthBackend, MOCK_GOOGLE_EMAIL};

use crate::user::Identity;
use crate::AuthResult;
use async_trait::async_trait;

/// Remote identity provider used by the session controller.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Create an account and return its identity.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        phone_number: Option<&str>,
    ) -> AuthResult<Identity>;

    /// Sign in with email and password.
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity>;

    /// Sign in through a federated provider (Google).
    async fn sign_in_federated(&self) -> AuthResult<Identity>;

    async fn sign_out(&self) -> AuthResult<()>;

    /// Send a password reset email.
    async fn reset_password(&self, email: &str) -> AuthResult<()>;
}
