//! Shared route-guard helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every protected route applies the same decision: wait while the session
//! initializes, send anonymous users to `/login`, and show a denial when the
//! role check fails.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::config::LOGIN_PATH;
use crate::net::http::{AuthEvent, AuthEvents};
use crate::state::permissions::RolePolicy;
use crate::state::session::{SessionPhase, SessionState};

/// What a protected route should render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardOutcome {
    Loading,
    RedirectToLogin,
    Denied { required: String, actual: String },
    Render,
}

/// Decide how a route requiring `required_role` renders for `state`.
pub fn guard_outcome(state: &SessionState, policy: &RolePolicy, required_role: Option<&str>) -> GuardOutcome {
    match &state.phase {
        SessionPhase::Initializing => GuardOutcome::Loading,
        SessionPhase::Anonymous => GuardOutcome::RedirectToLogin,
        SessionPhase::Authenticated(user) => match required_role {
            Some(required) if !policy.permits(&user.roles, required) => GuardOutcome::Denied {
                required: required.to_owned(),
                actual: user.roles_label(),
            },
            _ => GuardOutcome::Render,
        },
    }
}

/// Text shown when the role check fails.
pub fn denial_message(required: &str, actual: &str) -> String {
    format!("Acesso negado. Perfil necessário: {required}. Seu perfil: {actual}.")
}

/// True once initialization finished and nobody is signed in.
pub fn should_redirect_unauth(state: &SessionState) -> bool {
    state.phase == SessionPhase::Anonymous
}

/// Redirect to `/login` whenever the session settles as anonymous.
pub fn install_unauth_redirect<F>(session: ReadSignal<SessionState>, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        if should_redirect_unauth(&session.get()) {
            navigate(LOGIN_PATH, NavigateOptions::default());
        }
    });
}

/// Navigate to `/login` every time `events` reports an expired session.
pub fn redirect_on_expired<F>(events: &AuthEvents, navigate: F)
where
    F: Fn(&str, NavigateOptions) + 'static,
{
    events.subscribe(move |event| match event {
        AuthEvent::Expired => navigate(LOGIN_PATH, NavigateOptions::default()),
    });
}
