//! User, identity and profile records.
//!
//! A [`UserRecord`] serializes flat, identity and profile keys side by side,
//! so the persisted `user_record` reads like a single user object:
//!
//! ```json
//! {"uid":"mock_1","email":"a@b.com","emailVerified":false,"fullName":"A B"}
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimal authenticated principal returned by an auth backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Backend user ID
    #[serde(rename = "uid")]
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(
        default,
        rename = "photoURL",
        skip_serializing_if = "Option::is_none"
    )]
    pub photo_url: Option<String>,
    /// Account creation time (RFC 3339), when the backend reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Identity {
    /// Identity with only the required fields set.
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            phone_number: None,
            email_verified: false,
            display_name: None,
            photo_url: None,
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// How the user triggers an SOS alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SosMethod {
    /// Press power button 3 times
    Power3,
    /// Press power button 5 times
    Power5,
    Shake,
    Voice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

/// App-specific profile collected by the profile form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sos_method: Option<SosMethod>,
    /// URI of the profile photo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emergency_contacts: Vec<EmergencyContact>,
}

impl Profile {
    /// Returns true if no profile field is set.
    pub fn is_empty(&self) -> bool {
        *self == Profile::default()
    }

    /// Merge `incoming` into this profile, override by key.
    ///
    /// Set fields replace existing ones, unset fields keep the existing
    /// value. A non-empty contact list replaces the existing list.
    pub fn merge(&mut self, incoming: Profile) {
        fn take<T>(slot: &mut Option<T>, incoming: Option<T>) {
            if incoming.is_some() {
                *slot = incoming;
            }
        }

        take(&mut self.full_name, incoming.full_name);
        take(&mut self.date_of_birth, incoming.date_of_birth);
        take(&mut self.gender, incoming.gender);
        take(&mut self.home_address, incoming.home_address);
        take(&mut self.work_address, incoming.work_address);
        take(&mut self.sos_method, incoming.sos_method);
        take(&mut self.profile_photo, incoming.profile_photo);
        if !incoming.emergency_contacts.is_empty() {
            self.emergency_contacts = incoming.emergency_contacts;
        }
    }
}

/// Identity plus profile, the `user` of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(flatten)]
    pub profile: Profile,
}

impl UserRecord {
    pub fn id(&self) -> &str {
        &self.identity.id
    }

    pub fn email(&self) -> &str {
        &self.identity.email
    }

    pub fn full_name(&self) -> Option<&str> {
        self.profile.full_name.as_deref()
    }
}

impl From<Identity> for UserRecord {
    fn from(identity: Identity) -> Self {
        Self {
            identity,
            profile: Profile::default(),
        }
    }
}

/// Email/password pair for sign-in.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Sign-up form: credentials plus the phone number collected on sign-up.
#[derive(Clone)]
pub struct SignUpCredentials {
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
}

impl SignUpCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            phone_number: None,
        }
    }

    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }
}

impl fmt::Debug for SignUpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("phone_number", &self.phone_number)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_identity() -> Identity {
        Identity {
            phone_number: Some("5551234567".to_string()),
            ..Identity::new("mock_1", "a@b.com")
        }
    }

    #[test]
    fn test_user_record_serializes_flat() {
        let mut user = UserRecord::from(sample_identity());
        user.profile.full_name = Some("A B".to_string());

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["uid"], "mock_1");
        assert_eq!(value["email"], "a@b.com");
        assert_eq!(value["phoneNumber"], "5551234567");
        assert_eq!(value["fullName"], "A B");
        assert!(value.get("identity").is_none());
        assert!(value.get("emergencyContacts").is_none());
    }

    #[test]
    fn test_user_record_parses_app_shape() {
        let json = r#"{
            "uid": "google_mock_1",
            "email": "mockuser@gmail.com",
            "displayName": "Mock User",
            "photoURL": null,
            "phoneNumber": "",
            "emailVerified": true,
            "fullName": "Mock User",
            "gender": "Female",
            "sosMethod": "power3",
            "emergencyContacts": [{"name": "Mom", "phone": "5550000000", "relationship": "Parent"}]
        }"#;

        let user: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(user.id(), "google_mock_1");
        assert!(user.identity.email_verified);
        assert_eq!(user.identity.photo_url, None);
        assert_eq!(user.profile.gender, Some(Gender::Female));
        assert_eq!(user.profile.sos_method, Some(SosMethod::Power3));
        assert_eq!(user.profile.emergency_contacts.len(), 1);
    }

    #[test]
    fn test_profile_merge_overrides_by_key() {
        let mut profile = Profile {
            full_name: Some("Old Name".to_string()),
            home_address: Some("1 Main St".to_string()),
            ..Profile::default()
        };

        profile.merge(Profile {
            full_name: Some("New Name".to_string()),
            work_address: Some("2 Side St".to_string()),
            ..Profile::default()
        });

        assert_eq!(profile.full_name.as_deref(), Some("New Name"));
        assert_eq!(profile.home_address.as_deref(), Some("1 Main St"));
        assert_eq!(profile.work_address.as_deref(), Some("2 Side St"));
    }

    #[test]
    fn test_profile_merge_keeps_contacts_when_incoming_empty() {
        let contact = EmergencyContact {
            name: "Sam".to_string(),
            phone: "5551112222".to_string(),
            relationship: None,
        };
        let mut profile = Profile {
            emergency_contacts: vec![contact.clone()],
            ..Profile::default()
        };

        profile.merge(Profile::default());
        assert_eq!(profile.emergency_contacts, vec![contact]);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("a@b.com", "Abcd1234");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("a@b.com"));
        assert!(!debug.contains("Abcd1234"));

        let signup = SignUpCredentials::new("a@b.com", "Abcd1234").with_phone_number("5551234567");
        assert!(!format!("{:?}", signup).contains("Abcd1234"));
    }
}
