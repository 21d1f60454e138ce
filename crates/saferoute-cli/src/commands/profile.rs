//! Profile and onboarding commands.

use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use session_controller::validation::validate_profile;
use session_controller::{EmergencyContact, Gender, Profile, SessionController, SosMethod};

/// Profile form fields.
#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[arg(long)]
    pub full_name: String,

    /// Date of birth (DD/MM/YYYY)
    #[arg(long)]
    pub date_of_birth: String,

    /// male, female or other
    #[arg(long, value_parser = parse_gender)]
    pub gender: Gender,

    #[arg(long)]
    pub home_address: String,

    #[arg(long)]
    pub work_address: Option<String>,

    /// power3, power5, shake or voice
    #[arg(long, value_parser = parse_sos_method)]
    pub sos_method: Option<SosMethod>,

    /// Profile photo URI
    #[arg(long)]
    pub photo: Option<String>,

    /// Emergency contact as name:phone[:relationship]; at least two
    #[arg(long = "contact", value_parser = parse_contact)]
    pub contacts: Vec<EmergencyContact>,
}

impl ProfileArgs {
    pub fn into_profile(self) -> Profile {
        Profile {
            full_name: Some(self.full_name),
            date_of_birth: Some(self.date_of_birth),
            gender: Some(self.gender),
            home_address: Some(self.home_address),
            work_address: self.work_address,
            sos_method: self.sos_method,
            profile_photo: self.photo,
            emergency_contacts: self.contacts,
        }
    }
}

pub fn parse_gender(raw: &str) -> Result<Gender, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "male" => Ok(Gender::Male),
        "female" => Ok(Gender::Female),
        "other" => Ok(Gender::Other),
        other => Err(format!("unknown gender '{}'", other)),
    }
}

pub fn parse_sos_method(raw: &str) -> Result<SosMethod, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "power3" => Ok(SosMethod::Power3),
        "power5" => Ok(SosMethod::Power5),
        "shake" => Ok(SosMethod::Shake),
        "voice" => Ok(SosMethod::Voice),
        other => Err(format!("unknown SOS method '{}'", other)),
    }
}

/// Parse `name:phone[:relationship]`.
pub fn parse_contact(raw: &str) -> Result<EmergencyContact, String> {
    let mut parts = raw.splitn(3, ':').map(str::trim);
    let name = parts.next().unwrap_or_default();
    let phone = parts.next().unwrap_or_default();
    if name.is_empty() || phone.is_empty() {
        return Err(format!("expected name:phone[:relationship], got '{}'", raw));
    }
    let relationship = parts.next().filter(|r| !r.is_empty()).map(str::to_string);

    Ok(EmergencyContact {
        name: name.to_string(),
        phone: phone.to_string(),
        relationship,
    })
}

/// Submit the profile form.
pub async fn complete_profile(
    controller: &SessionController,
    args: ProfileArgs,
    format: OutputFormat,
) -> Result<()> {
    let profile = args.into_profile();
    validate_profile(&profile)?;

    let snapshot = controller.complete_profile(profile).await?;
    output::print_success("Profile saved successfully!", format);
    output::print_session(&snapshot, format);
    Ok(())
}

/// Mark the onboarding carousel as seen.
pub async fn carousel_seen(controller: &SessionController, format: OutputFormat) -> Result<()> {
    let snapshot = controller.mark_carousel_seen().await;
    output::print_route(&snapshot, format);
    Ok(())
}

/// Print the screen the current session routes to.
pub async fn route(controller: &SessionController, format: OutputFormat) -> Result<()> {
    let snapshot = controller.ready().await;
    output::print_route(&snapshot, format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_contact() {
        let contact = parse_contact("Mom:5550000000:Parent").unwrap();
        assert_eq!(contact.name, "Mom");
        assert_eq!(contact.phone, "5550000000");
        assert_eq!(contact.relationship.as_deref(), Some("Parent"));

        let bare = parse_contact("Sam : 5551112222").unwrap();
        assert_eq!(bare.name, "Sam");
        assert!(bare.relationship.is_none());

        assert!(parse_contact("OnlyName").is_err());
        assert!(parse_contact(":5551112222").is_err());
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!(parse_gender("Female").unwrap(), Gender::Female);
        assert!(parse_gender("robot").is_err());
        assert_eq!(parse_sos_method("SHAKE").unwrap(), SosMethod::Shake);
        assert!(parse_sos_method("power4").is_err());
    }
}
