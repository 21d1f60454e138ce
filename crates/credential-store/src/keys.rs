//! Storage key constants.

/// Keys of the persisted session snapshot.
pub struct StorageKeys;

impl StorageKeys {
    /// "true" once identity and profile are both established
    pub const AUTH_COMPLETE: &'static str = "auth_complete";

    /// "true" once the profile form has been submitted
    pub const PROFILE_COMPLETE: &'static str = "profile_complete";

    /// User record (JSON)
    pub const USER_RECORD: &'static str = "user_record";

    /// Device-level onboarding flag, survives logout
    pub const CAROUSEL_SEEN: &'static str = "carousel_seen";

    /// Keys owned by the account session. Logout removes exactly these.
    pub const SESSION_KEYS: [&'static str; 3] = [
        Self::AUTH_COMPLETE,
        Self::PROFILE_COMPLETE,
        Self::USER_RECORD,
    ];
}
