//! SafeRoute account session.
//!
//! This crate provides:
//! - **session_fsm**: the sign-up → profile → authenticated state machine
//! - **controller**: [`SessionController`], which drives the machine, calls the
//!   auth backend and persists the session through a credential store
//! - **backend**: the [`AuthBackend`] trait with mock and Firebase implementations
//! - **federated**: loopback callback server for Google sign-in
//! - **validation**: form checks callers run before reaching the controller
//! - **routing**: maps a session snapshot to the top-level screen

pub mod backend;
mod controller;
mod error;
pub mod federated;
mod routing;
mod session_fsm;
mod user;
pub mod validation;

pub use backend::{AuthBackend, FirebaseAuthBackend, MockAuthBackend};
pub use controller::{decode_snapshot, RestoredSession, SessionController, SessionSnapshot};
pub use error::{AuthError, AuthResult};
pub use federated::{FederatedCallbackServer, FederatedResult};
pub use routing::{route_for, AppRoute};
pub use session_fsm::{SessionMachine, SessionMachineInput, SessionMachineState, SessionState};
pub use user::{
    Credentials, EmergencyContact, Gender, Identity, Profile, SignUpCredentials, SosMethod,
    UserRecord,
};
pub use validation::ValidationError;
