//! Authentication error types.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Sign-up with an email that already has an account
    #[error("The email address is already in use by another account.")]
    EmailAlreadyInUse,

    /// Unknown account or wrong password
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Password rejected by the backend's password policy
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// Account disabled by an administrator
    #[error("This account has been disabled")]
    UserDisabled,

    /// Too many attempts, backend asked us to back off
    #[error("Too many attempts, try again later")]
    RateLimited,

    /// Federated (Google) sign-in did not complete
    #[error("Federated sign-in failed: {0}")]
    FederatedSignIn(String),

    /// Any other backend rejection
    #[error("Auth backend error: {0}")]
    Backend(String),

    /// Invalid state transition in the session FSM
    #[error("Invalid session state transition: {0}")]
    InvalidStateTransition(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Network unavailable (transient error, can retry)
    #[error("Network unavailable")]
    NetworkUnavailable,

    /// Account storage error (mock backend account store)
    #[error("Storage error: {0}")]
    Storage(#[from] credential_store::StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// Returns true if this error is transient and the operation can be retried.
    ///
    /// Transient errors include:
    /// - Network unavailable
    /// - Rate limiting
    /// - HTTP errors with 5xx status codes
    /// - Connection timeouts
    pub fn is_transient(&self) -> bool {
        match self {
            AuthError::NetworkUnavailable | AuthError::Timeout | AuthError::RateLimited => true,
            AuthError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    return true;
                }
                if let Some(status) = e.status() {
                    return status.is_server_error();
                }
                false
            }
            _ => false,
        }
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_transient_network_unavailable() {
        assert!(AuthError::NetworkUnavailable.is_transient());
    }

    #[test]
    fn test_is_transient_timeout() {
        assert!(AuthError::Timeout.is_transient());
    }

    #[test]
    fn test_is_transient_rate_limited() {
        assert!(AuthError::RateLimited.is_transient());
    }

    #[test]
    fn test_is_not_transient_invalid_credentials() {
        assert!(!AuthError::InvalidCredentials("bad password".to_string()).is_transient());
    }

    #[test]
    fn test_is_not_transient_email_in_use() {
        assert!(!AuthError::EmailAlreadyInUse.is_transient());
    }

    #[test]
    fn test_is_not_transient_state_transition() {
        assert!(!AuthError::InvalidStateTransition("x".to_string()).is_transient());
    }

    #[test]
    fn test_email_in_use_message() {
        assert_eq!(
            AuthError::EmailAlreadyInUse.to_string(),
            "The email address is already in use by another account."
        );
    }
}
