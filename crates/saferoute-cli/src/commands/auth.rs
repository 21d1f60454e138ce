//! Account commands.

use super::password_or_prompt;
use crate::output::{self, OutputFormat};
use anyhow::{bail, Result};
use session_controller::validation::{is_valid_email, validate_login, validate_signup};
use session_controller::{Credentials, SessionController, SignUpCredentials};

/// Show the current session.
pub async fn status(controller: &SessionController, format: OutputFormat) -> Result<()> {
    let snapshot = controller.ready().await;
    output::print_session(&snapshot, format);
    Ok(())
}

/// Create an account.
pub async fn signup(
    controller: &SessionController,
    email: String,
    password: Option<String>,
    confirm_password: Option<String>,
    phone: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let password = password_or_prompt(password, "Password: ")?;
    let confirm_password = match confirm_password {
        Some(confirm) => confirm,
        None => password_or_prompt(None, "Confirm password: ")?,
    };

    let mut credentials = SignUpCredentials::new(email, password);
    credentials.phone_number = phone.map(|p| p.split_whitespace().collect());
    validate_signup(&credentials, &confirm_password)?;

    let snapshot = controller.signup(&credentials).await?;
    output::print_success("Account created successfully!", format);
    output::print_session(&snapshot, format);
    Ok(())
}

/// Sign in with email and password.
pub async fn login(
    controller: &SessionController,
    email_or_phone: String,
    password: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let password = password_or_prompt(password, "Password: ")?;
    validate_login(&email_or_phone, &password)?;

    if !is_valid_email(&email_or_phone) {
        bail!("Phone number login requires additional setup. Please use email for now.");
    }

    let snapshot = controller
        .login(&Credentials::new(email_or_phone, password))
        .await?;
    output::print_success("Logged in successfully!", format);
    output::print_session(&snapshot, format);
    Ok(())
}

/// Sign in with Google.
pub async fn login_google(controller: &SessionController, format: OutputFormat) -> Result<()> {
    let snapshot = controller.login_with_federated().await?;
    output::print_success("Signed in with Google successfully!", format);
    output::print_session(&snapshot, format);
    Ok(())
}

/// Sign out and clear the persisted session.
pub async fn logout(controller: &SessionController, format: OutputFormat) -> Result<()> {
    let snapshot = controller.logout().await;
    output::print_success("Logged out successfully", format);
    output::print_session(&snapshot, format);
    Ok(())
}

/// Send a password reset email.
pub async fn reset_password(
    controller: &SessionController,
    email: String,
    format: OutputFormat,
) -> Result<()> {
    if !is_valid_email(&email) {
        bail!("Please enter a valid email address");
    }
    controller.reset_password(&email).await?;
    output::print_success(&format!("Password reset email sent to {}", email), format);
    Ok(())
}
