//! In-memory walkthrough of the whole account flow.

use crate::output::{self, OutputFormat};
use anyhow::Result;
use credential_store::{CredentialStore, MemoryCredentialStore};
use session_controller::{
    AuthBackend, Credentials, EmergencyContact, Gender, MockAuthBackend, Profile,
    SessionController, SignUpCredentials, SosMethod,
};
use std::sync::Arc;
use std::time::Duration;

const DEMO_EMAIL: &str = "demo@saferoute.app";
const DEMO_PASSWORD: &str = "Demo1234";

fn demo_profile() -> Profile {
    Profile {
        full_name: Some("Demo User".to_string()),
        date_of_birth: Some("01/01/1990".to_string()),
        gender: Some(Gender::Other),
        home_address: Some("1 Safe Street".to_string()),
        sos_method: Some(SosMethod::Power3),
        emergency_contacts: vec![
            EmergencyContact {
                name: "Alex".to_string(),
                phone: "5550000001".to_string(),
                relationship: Some("Sibling".to_string()),
            },
            EmergencyContact {
                name: "Sam".to_string(),
                phone: "5550000002".to_string(),
                relationship: None,
            },
        ],
        ..Profile::default()
    }
}

/// Run onboarding, sign-up, profile, logout and login against a mock
/// backend and an in-memory store, printing the route after each step.
pub async fn demo(format: OutputFormat) -> Result<()> {
    let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
    let backend: Arc<dyn AuthBackend> = Arc::new(MockAuthBackend::with_latency(Duration::ZERO));
    let controller = SessionController::start(store, backend).await;

    let step = |title: &str| {
        if let OutputFormat::Text = format {
            output::print_heading(title);
        }
    };

    step("Fresh install");
    output::print_route(&controller.snapshot(), format);

    step("Carousel seen");
    output::print_route(&controller.mark_carousel_seen().await, format);

    step("Sign up");
    let credentials =
        SignUpCredentials::new(DEMO_EMAIL, DEMO_PASSWORD).with_phone_number("5551234567");
    output::print_route(&controller.signup(&credentials).await?, format);

    step("Complete profile");
    output::print_route(&controller.complete_profile(demo_profile()).await?, format);

    step("Log out");
    output::print_route(&controller.logout().await, format);

    step("Log in");
    let credentials = Credentials::new(DEMO_EMAIL, DEMO_PASSWORD);
    let snapshot = controller.login(&credentials).await?;
    output::print_session(&snapshot, format);

    Ok(())
}
