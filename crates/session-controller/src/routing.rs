//! Which top-level screen a session snapshot maps to.

use crate::controller::SessionSnapshot;
use serde::Serialize;

/// Top-level navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "route")]
pub enum AppRoute {
    /// Persisted state not read yet.
    Loading,
    /// Main application.
    App,
    /// Profile form after sign-up.
    ProfileForm,
    /// Signed out: carousel on first run, then login/sign-up.
    Onboarding { show_carousel: bool },
}

pub fn route_for(snapshot: &SessionSnapshot) -> AppRoute {
    if snapshot.is_loading {
        AppRoute::Loading
    } else if snapshot.is_authenticated {
        AppRoute::App
    } else if snapshot.needs_profile {
        AppRoute::ProfileForm
    } else {
        AppRoute::Onboarding {
            show_carousel: !snapshot.has_seen_carousel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_fsm::SessionState;

    fn snapshot(state: SessionState, is_loading: bool, has_seen_carousel: bool) -> SessionSnapshot {
        SessionSnapshot {
            state,
            user: None,
            is_authenticated: state.is_authenticated(),
            needs_profile: state.needs_profile(),
            is_loading,
            has_seen_carousel,
        }
    }

    #[test]
    fn test_loading_wins() {
        let s = snapshot(SessionState::Authenticated, true, true);
        assert_eq!(route_for(&s), AppRoute::Loading);
    }

    #[test]
    fn test_authenticated_goes_to_app() {
        let s = snapshot(SessionState::Authenticated, false, false);
        assert_eq!(route_for(&s), AppRoute::App);
    }

    #[test]
    fn test_pending_profile_goes_to_form() {
        let s = snapshot(SessionState::PendingProfile, false, true);
        assert_eq!(route_for(&s), AppRoute::ProfileForm);
    }

    #[test]
    fn test_anonymous_shows_carousel_once() {
        let first_run = snapshot(SessionState::Anonymous, false, false);
        assert_eq!(
            route_for(&first_run),
            AppRoute::Onboarding { show_carousel: true }
        );

        let returning = snapshot(SessionState::Anonymous, false, true);
        assert_eq!(
            route_for(&returning),
            AppRoute::Onboarding { show_carousel: false }
        );
    }

    #[test]
    fn test_route_serializes_tagged() {
        let json = serde_json::to_value(AppRoute::Onboarding { show_carousel: true }).unwrap();
        assert_eq!(json["route"], "onboarding");
        assert_eq!(json["show_carousel"], true);
    }
}
