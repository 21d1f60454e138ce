//! Firebase Identity Toolkit REST backend.

use super::AuthBackend;
use crate::federated::FederatedCallbackServer;
use crate::user::Identity;
use crate::{AuthError, AuthResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Identity Toolkit v1 base URL.
pub const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OobCodeRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest {
    post_body: String,
    request_uri: String,
    return_secure_token: bool,
}

/// Account fields shared by the sign-up, sign-in and IdP responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map an Identity Toolkit error message to an `AuthError`.
///
/// Messages look like `EMAIL_EXISTS` or
/// `WEAK_PASSWORD : Password should be at least 6 characters`.
pub fn map_error_message(message: &str) -> AuthError {
    let (code, detail) = match message.split_once(" : ") {
        Some((code, detail)) => (code.trim(), detail.trim()),
        None => (message.trim(), ""),
    };
    let detail_or = |fallback: &str| {
        if detail.is_empty() {
            fallback.to_string()
        } else {
            detail.to_string()
        }
    };

    match code {
        "EMAIL_EXISTS" => AuthError::EmailAlreadyInUse,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            AuthError::InvalidCredentials(detail_or("Invalid email or password"))
        }
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::RateLimited,
        "USER_DISABLED" => AuthError::UserDisabled,
        c if c.starts_with("WEAK_PASSWORD") => {
            AuthError::WeakPassword(detail_or("Password is too weak"))
        }
        _ => AuthError::Backend(message.to_string()),
    }
}

/// Auth backend speaking the Firebase Identity Toolkit REST API.
pub struct FirebaseAuthBackend {
    http_client: Client,
    base_url: String,
    api_key: String,
    callback_server: FederatedCallbackServer,
    /// ID token of the current sign-in, dropped on sign-out.
    id_token: Mutex<Option<String>>,
}

impl FirebaseAuthBackend {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_IDENTITY_TOOLKIT_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            callback_server: FederatedCallbackServer::with_defaults(),
            id_token: Mutex::new(None),
        }
    }

    /// Use a custom federated callback server.
    pub fn with_callback_server(mut self, callback_server: FederatedCallbackServer) -> Self {
        self.callback_server = callback_server;
        self
    }

    pub fn callback_server(&self) -> &FederatedCallbackServer {
        &self.callback_server
    }

    /// Returns true while a sign-in token is cached.
    pub async fn has_id_token(&self) -> bool {
        self.id_token.lock().await.is_some()
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/accounts:{}?key={}", self.base_url, method, self.api_key)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        method: &str,
        body: &B,
    ) -> AuthResult<reqwest::Response> {
        if self.api_key.is_empty() {
            return Err(AuthError::Config("Firebase API key is not set".to_string()));
        }

        debug!(method = %method, "Calling Identity Toolkit");

        let response = self
            .http_client
            .post(self.endpoint(method))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let error = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => map_error_message(&envelope.error.message),
            Err(_) => AuthError::Backend(format!("{} failed with status {}", method, status)),
        };
        warn!(method = %method, status = %status, error = %error, "Identity Toolkit call failed");
        Err(error)
    }

    async fn account(&self, method: &str, body: &(impl Serialize + Sync)) -> AuthResult<Identity> {
        let account: AccountResponse = self.post(method, body).await?.json().await?;
        *self.id_token.lock().await = account.id_token.clone();

        Ok(Identity {
            email_verified: account.email_verified.unwrap_or(false),
            display_name: account.display_name,
            photo_url: account.photo_url,
            ..Identity::new(account.local_id, account.email.unwrap_or_default())
        })
    }
}

#[async_trait]
impl AuthBackend for FirebaseAuthBackend {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        phone_number: Option<&str>,
    ) -> AuthResult<Identity> {
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let identity = self.account("signUp", &request).await?;
        info!(user_id = %identity.id, "Firebase sign-up");

        Ok(Identity {
            phone_number: phone_number.map(str::to_string),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
            ..identity
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity> {
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let identity = self.account("signInWithPassword", &request).await?;
        info!(user_id = %identity.id, "Firebase sign-in");
        Ok(identity)
    }

    async fn sign_in_federated(&self) -> AuthResult<Identity> {
        info!(
            callback_url = %self.callback_server.callback_url(),
            "Waiting for Google sign-in callback"
        );
        let (token, provider) = self.callback_server.wait_for_callback().await?.into_token()?;

        let post_body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("id_token", &token)
            .append_pair("providerId", &provider)
            .finish();
        let request = IdpRequest {
            post_body,
            request_uri: self.callback_server.callback_url(),
            return_secure_token: true,
        };

        let identity = self.account("signInWithIdp", &request).await?;
        info!(user_id = %identity.id, provider = %provider, "Firebase federated sign-in");
        Ok(identity)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.id_token.lock().await.take();
        debug!("Dropped cached Firebase ID token");
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> AuthResult<()> {
        let request = OobCodeRequest {
            request_type: "PASSWORD_RESET",
            email,
        };
        self.post("sendOobCode", &request).await?;
        info!("Password reset email requested");
        Ok(())
    }
}
