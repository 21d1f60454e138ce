//! Session state machine using rust-fsm.
//!
//! The account session moves between three states. Which one holds decides
//! which UI flow is reachable: onboarding, profile completion or the app.
//!
//! ## State Diagram
//!
//! ```text
//!                 ┌─────────────────┐
//!                 │    Anonymous    │ (initial)
//!                 └──┬───────────┬──┘
//!   SignUpSucceeded  │           │  SignInSucceeded
//!   RestoredPending- │           │  RestoredAuthenticated
//!   Profile          ▼           ▼
//! ┌─────────────────┐  Profile-  ┌─────────────────┐
//! │ PendingProfile  │ ─────────► │  Authenticated  │
//! └────────┬────────┘ Completed  └────────┬────────┘
//!          │                              │
//!          │ SignedOut                    │ SignedOut
//!          ▼                              ▼
//!      Anonymous                      Anonymous
//! ```
//!
//! Sign-up and sign-in are accepted from every state; a profile can only be
//! completed from `PendingProfile`.

use rust_fsm::*;
use serde::{Deserialize, Serialize};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_machine(Anonymous)

    Anonymous => {
        SignUpSucceeded => PendingProfile,
        SignInSucceeded => Authenticated,
        RestoredPendingProfile => PendingProfile,
        RestoredAuthenticated => Authenticated,
        SignedOut => Anonymous
    },
    PendingProfile => {
        ProfileCompleted => Authenticated,
        SignUpSucceeded => PendingProfile,
        SignInSucceeded => Authenticated,
        SignedOut => Anonymous
    },
    Authenticated => {
        SignUpSucceeded => PendingProfile,
        SignInSucceeded => Authenticated,
        SignedOut => Anonymous
    }
}

pub use session_machine::Input as SessionMachineInput;
pub use session_machine::State as SessionMachineState;
pub use session_machine::StateMachine as SessionMachine;

/// Public view of the session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No identity. Onboarding, sign-up and login are reachable.
    Anonymous,
    /// Identity exists, profile form not yet submitted.
    PendingProfile,
    /// Identity and profile both established.
    Authenticated,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated)
    }

    pub fn needs_profile(&self) -> bool {
        matches!(self, SessionState::PendingProfile)
    }
}

impl From<&SessionMachineState> for SessionState {
    fn from(state: &SessionMachineState) -> Self {
        match state {
            SessionMachineState::Anonymous => SessionState::Anonymous,
            SessionMachineState::PendingProfile => SessionState::PendingProfile,
            SessionMachineState::Authenticated => SessionState::Authenticated,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Anonymous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_INPUTS: [SessionMachineInput; 6] = [
        SessionMachineInput::SignUpSucceeded,
        SessionMachineInput::SignInSucceeded,
        SessionMachineInput::RestoredPendingProfile,
        SessionMachineInput::RestoredAuthenticated,
        SessionMachineInput::ProfileCompleted,
        SessionMachineInput::SignedOut,
    ];

    fn machine_in(inputs: &[SessionMachineInput]) -> SessionMachine {
        let mut machine = SessionMachine::new();
        for input in inputs {
            machine.consume(input).unwrap();
        }
        machine
    }

    #[test]
    fn test_initial_state_is_anonymous() {
        let machine = SessionMachine::new();
        assert_eq!(*machine.state(), SessionMachineState::Anonymous);
    }

    #[test]
    fn test_signup_then_profile_flow() {
        let mut machine = SessionMachine::new();

        machine.consume(&SessionMachineInput::SignUpSucceeded).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::PendingProfile);

        machine.consume(&SessionMachineInput::ProfileCompleted).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::Authenticated);
    }

    #[test]
    fn test_login_skips_profile() {
        let mut machine = SessionMachine::new();

        machine.consume(&SessionMachineInput::SignInSucceeded).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::Authenticated);
    }

    #[test]
    fn test_profile_completion_requires_pending_profile() {
        let mut machine = SessionMachine::new();
        assert!(machine
            .consume(&SessionMachineInput::ProfileCompleted)
            .is_err());
        assert_eq!(*machine.state(), SessionMachineState::Anonymous);

        let mut machine = machine_in(&[SessionMachineInput::SignInSucceeded]);
        assert!(machine
            .consume(&SessionMachineInput::ProfileCompleted)
            .is_err());
        assert_eq!(*machine.state(), SessionMachineState::Authenticated);
    }

    #[test]
    fn test_signed_out_accepted_everywhere() {
        for setup in [
            vec![],
            vec![SessionMachineInput::SignUpSucceeded],
            vec![SessionMachineInput::SignInSucceeded],
        ] {
            let mut machine = machine_in(&setup);
            machine.consume(&SessionMachineInput::SignedOut).unwrap();
            assert_eq!(*machine.state(), SessionMachineState::Anonymous);
        }
    }

    #[test]
    fn test_restore_inputs_only_from_anonymous() {
        let mut machine = machine_in(&[SessionMachineInput::RestoredPendingProfile]);
        assert_eq!(*machine.state(), SessionMachineState::PendingProfile);
        assert!(machine
            .consume(&SessionMachineInput::RestoredAuthenticated)
            .is_err());

        let mut machine = machine_in(&[SessionMachineInput::RestoredAuthenticated]);
        assert_eq!(*machine.state(), SessionMachineState::Authenticated);
        assert!(machine
            .consume(&SessionMachineInput::RestoredPendingProfile)
            .is_err());
    }

    #[test]
    fn test_signup_from_authenticated_returns_to_pending_profile() {
        let mut machine = machine_in(&[SessionMachineInput::SignInSucceeded]);
        machine.consume(&SessionMachineInput::SignUpSucceeded).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::PendingProfile);
    }

    fn machine_at(state: &SessionMachineState) -> SessionMachine {
        match state {
            SessionMachineState::Anonymous => SessionMachine::new(),
            SessionMachineState::PendingProfile => {
                machine_in(&[SessionMachineInput::SignUpSucceeded])
            }
            SessionMachineState::Authenticated => {
                machine_in(&[SessionMachineInput::SignInSucceeded])
            }
        }
    }

    #[test]
    fn test_no_reachable_state_is_both_authenticated_and_pending() {
        let mut frontier = vec![SessionMachineState::Anonymous];
        let mut seen = Vec::new();

        while let Some(state) = frontier.pop() {
            if seen.contains(&state) {
                continue;
            }
            let public = SessionState::from(&state);
            assert!(!(public.is_authenticated() && public.needs_profile()));

            for input in ALL_INPUTS.iter() {
                let mut machine = machine_at(&state);
                if machine.consume(input).is_ok() {
                    frontier.push(machine.state().clone());
                }
            }
            seen.push(state);
        }

        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_session_state_conversion() {
        assert_eq!(
            SessionState::from(&SessionMachineState::Anonymous),
            SessionState::Anonymous
        );
        assert_eq!(
            SessionState::from(&SessionMachineState::PendingProfile),
            SessionState::PendingProfile
        );
        assert_eq!(
            SessionState::from(&SessionMachineState::Authenticated),
            SessionState::Authenticated
        );
    }

    #[test]
    fn test_session_state_flags() {
        assert!(!SessionState::Anonymous.is_authenticated());
        assert!(!SessionState::Anonymous.needs_profile());

        assert!(!SessionState::PendingProfile.is_authenticated());
        assert!(SessionState::PendingProfile.needs_profile());

        assert!(SessionState::Authenticated.is_authenticated());
        assert!(!SessionState::Authenticated.needs_profile());
    }

    #[test]
    fn test_session_state_serializes_snake_case() {
        let json = serde_json::to_string(&SessionState::PendingProfile).unwrap();
        assert_eq!(json, "\"pending_profile\"");
    }
}
