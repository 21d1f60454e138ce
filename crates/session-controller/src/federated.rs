//! Loopback callback server for federated (Google) sign-in.
//!
//! The provider page redirects the browser to
//! `http://localhost:<port>/callback?id_token=..&provider=..`, or to
//! `/callback?error=..` when the user cancels.

use crate::{AuthError, AuthResult};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, error, info};

/// Default callback port.
pub const DEFAULT_CALLBACK_PORT: u16 = 9876;

/// Default callback timeout in seconds.
pub const DEFAULT_CALLBACK_TIMEOUT_SECS: u64 = 120;

const DEFAULT_PROVIDER: &str = "google.com";

/// Outcome of a federated sign-in callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedResult {
    pub success: bool,
    /// Provider ID token (if successful).
    pub id_token: Option<String>,
    /// Provider ID, e.g. `google.com`.
    pub provider: Option<String>,
    /// Error message (if failed).
    pub error: Option<String>,
}

impl FederatedResult {
    pub fn success(id_token: String, provider: String) -> Self {
        Self {
            success: true,
            id_token: Some(id_token),
            provider: Some(provider),
            error: None,
        }
    }

    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            id_token: None,
            provider: None,
            error: Some(error),
        }
    }

    /// Provider token and ID, or the callback error as an `AuthError`.
    pub fn into_token(self) -> AuthResult<(String, String)> {
        match (self.id_token, self.provider) {
            (Some(token), Some(provider)) if self.success => Ok((token, provider)),
            _ => Err(AuthError::FederatedSignIn(
                self.error
                    .unwrap_or_else(|| "Missing required parameters".to_string()),
            )),
        }
    }
}

type ResultSender = Arc<Mutex<Option<oneshot::Sender<FederatedResult>>>>;

/// Waits for the provider redirect on a loopback port.
#[derive(Debug, Clone)]
pub struct FederatedCallbackServer {
    port: u16,
    timeout_secs: u64,
}

impl FederatedCallbackServer {
    pub fn new(port: u16, timeout_secs: u64) -> Self {
        Self { port, timeout_secs }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_CALLBACK_PORT, DEFAULT_CALLBACK_TIMEOUT_SECS)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// URL the provider page must redirect to.
    pub fn callback_url(&self) -> String {
        format!("http://localhost:{}/callback", self.port)
    }

    /// Listen on the callback port until one callback arrives or the timeout
    /// elapses. A timeout yields a failed result, not an error.
    pub async fn wait_for_callback(&self) -> AuthResult<FederatedResult> {
        let addr = format!("127.0.0.1:{}", self.port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            AuthError::FederatedSignIn(format!("Failed to bind to {}: {}", addr, e))
        })?;

        info!(port = self.port, "Federated callback server listening");

        let (tx, rx) = oneshot::channel::<FederatedResult>();
        let tx: ResultSender = Arc::new(Mutex::new(Some(tx)));

        let server_handle = tokio::spawn({
            let tx = tx.clone();
            async move {
                loop {
                    match listener.accept().await {
                        Ok((mut socket, _)) => {
                            let tx = tx.clone();
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(&mut socket, tx).await {
                                    error!(error = %e, "Error handling callback connection");
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "Accept error");
                            break;
                        }
                    }
                }
            }
        });

        let timeout = tokio::time::Duration::from_secs(self.timeout_secs);
        let result = match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => FederatedResult::failure("Internal error: channel closed".to_string()),
            Err(_) => FederatedResult::failure("Federated sign-in timed out".to_string()),
        };

        server_handle.abort();
        Ok(result)
    }
}

/// Decode the request target of a callback request.
///
/// Returns `None` for paths other than `/callback`.
pub fn parse_callback(target: &str) -> Option<FederatedResult> {
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    };
    if path != "/callback" {
        return None;
    }

    let mut id_token = None;
    let mut provider = None;
    let mut error = None;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "id_token" => id_token = Some(value.into_owned()),
            "provider" => provider = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    let result = match (error, id_token) {
        (Some(err), _) => FederatedResult::failure(err),
        (None, Some(token)) if !token.is_empty() => FederatedResult::success(
            token,
            provider.unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
        ),
        _ => FederatedResult::failure("Missing required parameters".to_string()),
    };
    Some(result)
}

async fn handle_connection(
    socket: &mut tokio::net::TcpStream,
    tx: ResultSender,
) -> AuthResult<()> {
    let (reader, mut writer) = socket.split();
    let mut reader = BufReader::new(reader);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    debug!(request_len = request_line.len(), "Received callback request");

    let Some(rest) = request_line.strip_prefix("GET ") else {
        send_response(&mut writer, 405, "Method Not Allowed", "Method Not Allowed").await?;
        return Ok(());
    };
    let target = rest.split(' ').next().unwrap_or_default();

    let Some(result) = parse_callback(target) else {
        send_response(&mut writer, 404, "Not Found", "Not Found").await?;
        return Ok(());
    };

    let page = match &result.error {
        Some(err) => error_page(err),
        None => success_page(),
    };
    send_response(&mut writer, 200, "OK", &page).await?;

    if let Some(tx) = tx.lock().await.take() {
        let _ = tx.send(result);
    }

    Ok(())
}

async fn send_response(
    writer: &mut tokio::net::tcp::WriteHalf<'_>,
    status_code: u16,
    status_text: &str,
    body: &str,
) -> AuthResult<()> {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_code,
        status_text,
        body.len(),
        body
    );
    writer.write_all(response.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

fn success_page() -> String {
    r#"<!DOCTYPE html>
<html>
<head><title>SafeRoute - Signed In</title></head>
<body style="font-family: system-ui; text-align: center; padding: 50px;">
<h1 style="color: #16a34a;">You're signed in</h1>
<p>You can close this window and return to SafeRoute.</p>
<script>setTimeout(() => window.close(), 2000);</script>
</body>
</html>"#
        .to_string()
}

fn error_page(error: &str) -> String {
    let escaped = error
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>SafeRoute - Sign-in Failed</title></head>
<body style="font-family: system-ui; text-align: center; padding: 50px;">
<h1 style="color: #dc2626;">Sign-in failed</h1>
<p>Error: {}</p>
<p>You can close this window and try again.</p>
</body>
</html>"#,
        escaped
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_callback_url() {
        let server = FederatedCallbackServer::new(9876, 120);
        assert_eq!(server.callback_url(), "http://localhost:9876/callback");
    }

    #[test]
    fn test_parse_callback_success() {
        let result = parse_callback("/callback?id_token=abc%2E123&provider=google.com").unwrap();
        assert!(result.success);
        assert_eq!(result.id_token.as_deref(), Some("abc.123"));
        assert_eq!(result.provider.as_deref(), Some("google.com"));
    }

    #[test]
    fn test_parse_callback_defaults_provider() {
        let result = parse_callback("/callback?id_token=tok").unwrap();
        assert_eq!(result.provider.as_deref(), Some("google.com"));
    }

    #[test]
    fn test_parse_callback_error_wins() {
        let result = parse_callback("/callback?error=access+denied&id_token=tok").unwrap();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("access denied"));
    }

    #[test]
    fn test_parse_callback_missing_token() {
        let result = parse_callback("/callback").unwrap();
        assert!(!result.success);
        assert!(result.into_token().is_err());
    }

    #[test]
    fn test_parse_callback_other_path() {
        assert!(parse_callback("/favicon.ico").is_none());
    }

    #[test]
    fn test_into_token() {
        let (token, provider) = FederatedResult::success("t".to_string(), "google.com".to_string())
            .into_token()
            .unwrap();
        assert_eq!(token, "t");
        assert_eq!(provider, "google.com");

        let err = FederatedResult::failure("cancelled".to_string())
            .into_token()
            .unwrap_err();
        assert!(matches!(err, AuthError::FederatedSignIn(msg) if msg == "cancelled"));
    }

    #[test]
    fn test_error_page_escapes_html() {
        let page = error_page("<script>");
        assert!(page.contains("&lt;script&gt;"));
    }

    fn free_port() -> u16 {
        std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port()
    }

    #[tokio::test]
    async fn test_wait_for_callback_receives_token() {
        let port = free_port();
        let server = FederatedCallbackServer::new(port, 5);
        let waiter = tokio::spawn(async move { server.wait_for_callback().await });

        let mut stream = loop {
            match tokio::net::TcpStream::connect(("127.0.0.1", port)).await {
                Ok(stream) => break stream,
                Err(_) => tokio::time::sleep(std::time::Duration::from_millis(10)).await,
            }
        };
        stream
            .write_all(b"GET /callback?id_token=tok&provider=google.com HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK"));

        let result = waiter.await.unwrap().unwrap();
        assert_eq!(result, FederatedResult::success("tok".to_string(), "google.com".to_string()));
    }

    #[tokio::test]
    async fn test_wait_for_callback_times_out() {
        let server = FederatedCallbackServer::new(free_port(), 0);
        let result = server.wait_for_callback().await.unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("timed out"));
    }
}
