//! CLI command implementations.

mod auth;
mod demo;
mod profile;

pub use auth::{login, login_google, logout, reset_password, signup, status};
pub use demo::demo;
pub use profile::{carousel_seen, complete_profile, route, ProfileArgs};

use anyhow::Result;

/// Use the password given on the command line, or prompt for it.
fn password_or_prompt(password: Option<String>, prompt: &str) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => Ok(rpassword::prompt_password(prompt)?),
    }
}
