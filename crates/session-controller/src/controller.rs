//! Session controller driving the session FSM.
//!
//! The controller owns the in-memory session, calls the [`AuthBackend`] for
//! remote operations and mirrors every applied transition into the
//! [`CredentialStore`]. Persistence is best-effort: read and write failures
//! are logged and the in-memory state stands.

use crate::backend::AuthBackend;
use crate::session_fsm::{SessionMachine, SessionMachineInput, SessionState};
use crate::user::{Credentials, Profile, SignUpCredentials, UserRecord};
use crate::{AuthError, AuthResult};
use credential_store::{CredentialStore, PersistedSnapshot, SnapshotStore};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Value copy of the session, as observed by the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub user: Option<UserRecord>,
    pub is_authenticated: bool,
    pub needs_profile: bool,
    pub is_loading: bool,
    pub has_seen_carousel: bool,
}

struct SessionData {
    fsm: SessionMachine,
    user: Option<UserRecord>,
    has_seen_carousel: bool,
    is_loading: bool,
    /// Set once the persisted snapshot has been read.
    restored: bool,
    /// Set once any account transition has been applied in memory.
    touched: bool,
}

impl SessionData {
    fn new() -> Self {
        Self {
            fsm: SessionMachine::new(),
            user: None,
            has_seen_carousel: false,
            is_loading: true,
            restored: false,
            touched: false,
        }
    }

    fn state(&self) -> SessionState {
        SessionState::from(self.fsm.state())
    }

    fn snapshot(&self) -> SessionSnapshot {
        let state = self.state();
        SessionSnapshot {
            state,
            user: self.user.clone(),
            is_authenticated: state.is_authenticated(),
            needs_profile: state.needs_profile(),
            is_loading: self.is_loading,
            has_seen_carousel: self.has_seen_carousel,
        }
    }
}

/// Session restored from the persisted snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoredSession {
    Anonymous,
    PendingProfile(UserRecord),
    Authenticated(UserRecord),
}

/// Decode the persisted snapshot into the session it describes.
///
/// A signed-in state without a parseable user record decodes as anonymous.
pub fn decode_snapshot(persisted: &PersistedSnapshot) -> RestoredSession {
    let user = persisted.user_record.as_deref().and_then(|raw| {
        serde_json::from_str::<UserRecord>(raw)
            .map_err(|e| warn!(error = %e, "Ignoring unreadable persisted user record"))
            .ok()
    });

    let pending = match (persisted.auth_complete, persisted.profile_complete) {
        (Some(true), Some(true)) => false,
        (Some(true), _) => true,
        (Some(false), Some(false)) if user.is_some() => true,
        _ => return RestoredSession::Anonymous,
    };

    match user {
        Some(user) if pending => RestoredSession::PendingProfile(user),
        Some(user) => RestoredSession::Authenticated(user),
        None => {
            warn!(pending, "Persisted session has no user record; starting signed out");
            RestoredSession::Anonymous
        }
    }
}

/// Owns the account session and its persisted mirror.
///
/// Transitions are serialized: each public operation holds the transition
/// gate from its backend call until its persistence write finishes, so
/// overlapping calls apply one after another in arrival order.
pub struct SessionController {
    snapshots: SnapshotStore,
    backend: Arc<dyn AuthBackend>,
    inner: Mutex<SessionData>,
    gate: tokio::sync::Mutex<()>,
    state_tx: watch::Sender<SessionSnapshot>,
}

impl SessionController {
    /// Create a controller in the loading state. Performs no I/O.
    pub fn new(store: Arc<dyn CredentialStore>, backend: Arc<dyn AuthBackend>) -> Self {
        let data = SessionData::new();
        let (state_tx, _) = watch::channel(data.snapshot());
        Self {
            snapshots: SnapshotStore::new(store),
            backend,
            inner: Mutex::new(data),
            gate: tokio::sync::Mutex::new(()),
            state_tx,
        }
    }

    /// Create a controller and restore the persisted session before returning.
    pub async fn start(
        store: Arc<dyn CredentialStore>,
        backend: Arc<dyn AuthBackend>,
    ) -> Arc<Self> {
        let controller = Arc::new(Self::new(store, backend));
        controller.restore_from_storage().await;
        controller
    }

    /// Create a controller and restore the persisted session in the
    /// background. Use [`ready`](Self::ready) to wait for the restore.
    pub fn spawn(store: Arc<dyn CredentialStore>, backend: Arc<dyn AuthBackend>) -> Arc<Self> {
        let controller = Arc::new(Self::new(store, backend));
        let restoring = controller.clone();
        tokio::spawn(async move {
            restoring.restore_from_storage().await;
        });
        controller
    }

    fn lock_inner(&self) -> MutexGuard<'_, SessionData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock_inner().snapshot()
    }

    pub fn state(&self) -> SessionState {
        self.lock_inner().state()
    }

    pub fn user(&self) -> Option<UserRecord> {
        self.lock_inner().user.clone()
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state_tx.subscribe()
    }

    /// Wait until the persisted snapshot has been read.
    pub async fn ready(&self) -> SessionSnapshot {
        let mut rx = self.state_tx.subscribe();
        let ready = match rx.wait_for(|s| !s.is_loading).await {
            Ok(snapshot) => Some(snapshot.clone()),
            Err(_) => None,
        };
        ready.unwrap_or_else(|| self.snapshot())
    }

    fn publish(&self, snapshot: &SessionSnapshot) {
        self.state_tx.send_replace(snapshot.clone());
    }

    /// Apply `input` to the FSM and run `update` on the session data.
    ///
    /// Nothing changes when the FSM rejects the input.
    fn transition(
        &self,
        input: &SessionMachineInput,
        update: impl FnOnce(&mut SessionData),
    ) -> AuthResult<SessionSnapshot> {
        let mut data = self.lock_inner();
        let old_state = data.state();

        data.fsm.consume(input).map_err(|_| {
            AuthError::InvalidStateTransition(format!(
                "Cannot apply {:?} in state {:?}",
                input, old_state
            ))
        })?;
        update(&mut *data);
        data.touched = true;

        let snapshot = data.snapshot();
        drop(data);

        if old_state != snapshot.state {
            debug!(
                old_state = ?old_state,
                new_state = ?snapshot.state,
                "Session state transition"
            );
        }
        self.publish(&snapshot);
        Ok(snapshot)
    }

    async fn persist_session(&self, snapshot: &SessionSnapshot) {
        let Some(user) = snapshot.user.as_ref() else {
            return;
        };
        let user_json = match serde_json::to_string(user) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to encode user record; session not persisted");
                return;
            }
        };

        let profile_complete = !snapshot.needs_profile;
        if let Err(e) = self
            .snapshots
            .write_session(snapshot.is_authenticated, profile_complete, user_json)
            .await
        {
            warn!(error = %e, state = ?snapshot.state, "Failed to persist session");
        }
    }

    /// Read the persisted snapshot once and adopt it.
    ///
    /// Runs at most once per controller; later calls return the current
    /// snapshot. `is_loading` is cleared whatever the read outcome. If a
    /// transition was applied before the restore ran, the persisted account
    /// session is ignored and only the onboarding flag is merged in.
    pub async fn restore_from_storage(&self) -> SessionSnapshot {
        let _gate = self.gate.lock().await;

        if self.lock_inner().restored {
            debug!("Session already restored");
            return self.snapshot();
        }

        let persisted = match self.snapshots.read().await {
            Ok(persisted) => persisted,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session; using defaults");
                PersistedSnapshot::default()
            }
        };
        let restored = decode_snapshot(&persisted);

        let snapshot = {
            let mut data = self.lock_inner();
            data.restored = true;
            data.is_loading = false;
            data.has_seen_carousel |= persisted.carousel_seen;

            if data.touched {
                debug!("Session changed before restore; keeping in-memory state");
            } else {
                let (input, user) = match restored {
                    RestoredSession::Anonymous => (None, None),
                    RestoredSession::PendingProfile(user) => {
                        (Some(SessionMachineInput::RestoredPendingProfile), Some(user))
                    }
                    RestoredSession::Authenticated(user) => {
                        (Some(SessionMachineInput::RestoredAuthenticated), Some(user))
                    }
                };
                if let Some(input) = input {
                    if data.fsm.consume(&input).is_ok() {
                        data.user = user;
                    }
                }
            }
            data.snapshot()
        };

        info!(
            state = ?snapshot.state,
            has_seen_carousel = snapshot.has_seen_carousel,
            "Session restored"
        );
        self.publish(&snapshot);
        snapshot
    }

    /// Create an account. The session moves to profile completion.
    pub async fn signup(&self, credentials: &SignUpCredentials) -> AuthResult<SessionSnapshot> {
        let _gate = self.gate.lock().await;

        let identity = self
            .backend
            .sign_up(
                &credentials.email,
                &credentials.password,
                credentials.phone_number.as_deref(),
            )
            .await?;
        info!(user_id = %identity.id, "Signed up");

        let snapshot = self.transition(&SessionMachineInput::SignUpSucceeded, |data| {
            data.user = Some(UserRecord::from(identity));
        })?;
        self.persist_session(&snapshot).await;
        Ok(snapshot)
    }

    /// Sign in with email and password. Never enters profile completion.
    pub async fn login(&self, credentials: &Credentials) -> AuthResult<SessionSnapshot> {
        let _gate = self.gate.lock().await;

        let identity = self
            .backend
            .sign_in(&credentials.email, &credentials.password)
            .await?;
        info!(user_id = %identity.id, "Logged in");

        self.apply_sign_in(UserRecord::from(identity)).await
    }

    /// Sign in through the federated provider. Same outcome as [`login`](Self::login).
    pub async fn login_with_federated(&self) -> AuthResult<SessionSnapshot> {
        let _gate = self.gate.lock().await;

        let identity = self.backend.sign_in_federated().await?;
        info!(user_id = %identity.id, "Logged in with federated provider");

        self.apply_sign_in(UserRecord::from(identity)).await
    }

    async fn apply_sign_in(&self, user: UserRecord) -> AuthResult<SessionSnapshot> {
        let snapshot = self.transition(&SessionMachineInput::SignInSucceeded, |data| {
            data.user = Some(user);
        })?;
        self.persist_session(&snapshot).await;
        Ok(snapshot)
    }

    /// Merge the profile form into the user and finish sign-up.
    ///
    /// Only valid while the profile is pending.
    pub async fn complete_profile(&self, profile: Profile) -> AuthResult<SessionSnapshot> {
        let _gate = self.gate.lock().await;

        let snapshot = self.transition(&SessionMachineInput::ProfileCompleted, |data| {
            if let Some(user) = data.user.as_mut() {
                user.profile.merge(profile);
            }
        })?;
        if let Some(user) = snapshot.user.as_ref() {
            info!(user_id = %user.id(), "Profile completed");
        }

        self.persist_session(&snapshot).await;
        Ok(snapshot)
    }

    /// Sign out locally and at the backend. Always succeeds.
    ///
    /// The onboarding flag survives logout.
    pub async fn logout(&self) -> SessionSnapshot {
        let _gate = self.gate.lock().await;

        if let Err(e) = self.backend.sign_out().await {
            warn!(error = %e, "Backend sign-out failed; clearing local session anyway");
        }

        let snapshot = match self.transition(&SessionMachineInput::SignedOut, |data| {
            data.user = None;
        }) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Sign-out transition rejected");
                self.snapshot()
            }
        };
        info!("Logged out");

        if let Err(e) = self.snapshots.clear_session().await {
            warn!(error = %e, "Failed to clear persisted session");
        }
        snapshot
    }

    /// Record that the onboarding carousel was shown. Idempotent.
    pub async fn mark_carousel_seen(&self) -> SessionSnapshot {
        let _gate = self.gate.lock().await;

        let snapshot = {
            let mut data = self.lock_inner();
            if data.has_seen_carousel {
                return data.snapshot();
            }
            data.has_seen_carousel = true;
            data.snapshot()
        };
        self.publish(&snapshot);

        if let Err(e) = self.snapshots.set_carousel_seen().await {
            warn!(error = %e, "Failed to persist carousel flag");
        }
        snapshot
    }

    /// Ask the backend to send a password reset email. Session state is untouched.
    pub async fn reset_password(&self, email: &str) -> AuthResult<()> {
        self.backend.reset_password(email).await
    }
}
