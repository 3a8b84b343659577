//! Route wrapper enforcing sign-in and role checks.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::state::permissions::RolePolicy;
use crate::state::session::SessionState;
use crate::util::auth::{GuardOutcome, denial_message, guard_outcome, install_unauth_redirect};

/// Renders `children` only for a signed-in user holding `required_role`.
///
/// Shows a loading line while the session initializes, redirects anonymous
/// users to `/login`, and shows the required vs. actual role on denial
/// unless `show_denied` is `false`.
#[component]
pub fn ProtectedRoute(
    #[prop(optional, into)] required_role: Option<String>,
    #[prop(default = true)] show_denied: bool,
    children: ChildrenFn,
) -> impl IntoView {
    let session = expect_context::<ReadSignal<SessionState>>();
    let policy = expect_context::<RolePolicy>();
    install_unauth_redirect(session, use_navigate());

    move || match guard_outcome(&session.get(), &policy, required_role.as_deref()) {
        GuardOutcome::Loading => view! { <p class="route-loading">"Carregando..."</p> }.into_any(),
        GuardOutcome::RedirectToLogin => ().into_any(),
        GuardOutcome::Denied { required, actual } => {
            if show_denied {
                view! { <div class="access-denied">{denial_message(&required, &actual)}</div> }.into_any()
            } else {
                ().into_any()
            }
        }
        GuardOutcome::Render => children().into_any(),
    }
}
