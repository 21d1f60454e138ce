//! Form validation run by callers before they reach the controller.
//!
//! The controller accepts whatever the backend accepts; these checks mirror
//! the rules the sign-up, login and profile screens enforce.

use crate::user::{Profile, SignUpCredentials};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Minimum emergency contacts on a completed profile.
pub const MIN_EMERGENCY_CONTACTS: usize = 2;

const MIN_SIGNUP_PASSWORD_LEN: usize = 8;
const MIN_LOGIN_PASSWORD_LEN: usize = 6;

/// Malformed form input, caught before any backend call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please enter a valid 10-digit phone number")]
    InvalidPhoneNumber,

    #[error("Please enter a valid email or 10-digit phone number")]
    InvalidEmailOrPhone,

    #[error("Password must be at least 8 characters with uppercase, lowercase, and number")]
    WeakPassword,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Please provide at least {0} emergency contacts")]
    NotEnoughEmergencyContacts(usize),
}

pub type ValidationResult<T> = Result<T, ValidationError>;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

fn phone_regex() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"^[0-9]{10}$").unwrap())
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Ten digits, whitespace ignored.
pub fn is_valid_phone_number(phone: &str) -> bool {
    phone_regex().is_match(&strip_whitespace(phone))
}

/// At least 8 characters with a lowercase letter, an uppercase letter and a digit.
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= MIN_SIGNUP_PASSWORD_LEN
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Validate the sign-up form. `confirm_password` must match the password.
pub fn validate_signup(
    credentials: &SignUpCredentials,
    confirm_password: &str,
) -> ValidationResult<()> {
    match credentials.phone_number.as_deref() {
        None | Some("") => return Err(ValidationError::Required("Phone number")),
        Some(phone) if !is_valid_phone_number(phone) => {
            return Err(ValidationError::InvalidPhoneNumber)
        }
        Some(_) => {}
    }

    if credentials.email.is_empty() {
        return Err(ValidationError::Required("Email"));
    }
    if !is_valid_email(&credentials.email) {
        return Err(ValidationError::InvalidEmail);
    }

    if credentials.password.is_empty() {
        return Err(ValidationError::Required("Password"));
    }
    if !is_strong_password(&credentials.password) {
        return Err(ValidationError::WeakPassword);
    }

    if confirm_password.is_empty() {
        return Err(ValidationError::Required("Password confirmation"));
    }
    if credentials.password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }

    Ok(())
}

/// Validate the login form. The identifier may be an email or a phone number.
pub fn validate_login(email_or_phone: &str, password: &str) -> ValidationResult<()> {
    if email_or_phone.is_empty() {
        return Err(ValidationError::Required("Email or phone number"));
    }
    if !is_valid_email(email_or_phone) && !is_valid_phone_number(email_or_phone) {
        return Err(ValidationError::InvalidEmailOrPhone);
    }

    if password.is_empty() {
        return Err(ValidationError::Required("Password"));
    }
    if password.chars().count() < MIN_LOGIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }

    Ok(())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Validate the profile form before completion.
pub fn validate_profile(profile: &Profile) -> ValidationResult<()> {
    if is_blank(&profile.full_name) {
        return Err(ValidationError::Required("Full name"));
    }
    if is_blank(&profile.date_of_birth) {
        return Err(ValidationError::Required("Date of birth"));
    }
    if profile.gender.is_none() {
        return Err(ValidationError::Required("Gender"));
    }
    if is_blank(&profile.home_address) {
        return Err(ValidationError::Required("Home address"));
    }

    let filled = profile
        .emergency_contacts
        .iter()
        .filter(|c| !c.name.trim().is_empty() && !c.phone.trim().is_empty())
        .count();
    if filled < MIN_EMERGENCY_CONTACTS {
        return Err(ValidationError::NotEnoughEmergencyContacts(
            MIN_EMERGENCY_CONTACTS,
        ));
    }

    Ok(())
}
