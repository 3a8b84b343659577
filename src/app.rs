//! Root application component with routing and context providers.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::hooks::{use_navigate, use_params_map};
use leptos_router::{
    ParamSegment, StaticSegment,
    components::{Route, Router, Routes},
};

use crate::components::protected_route::ProtectedRoute;
use crate::config::ConsoleConfig;
use crate::net::http::{ApiClient, GlooTransport};
use crate::net::resources::ResourceKind;
use crate::pages::{
    dashboard::DashboardPage, login::LoginPage, password::PasswordPage, resource_list::ResourceListPage,
};
use crate::state::session::{Session, SessionState};
use crate::util::auth::redirect_on_expired;
use crate::util::menu::required_role;
use crate::util::storage::BrowserStore;
use crate::util::token_store::TokenStore;

/// The session type used by the running console.
pub type ConsoleSession = Session<GlooTransport, BrowserStore>;

/// Context handle for the session. `Session` is `!Send`, so it lives in
/// local arena storage.
pub type SessionHandle = StoredValue<ConsoleSession, LocalStorage>;

/// Wire the HTTP client, token store and session for `config`.
pub fn build_session(config: &ConsoleConfig) -> ConsoleSession {
    let client = ApiClient::new(
        GlooTransport::new(config.api_base_url.clone()),
        TokenStore::new(BrowserStore),
    );
    Session::new(client, config.role_policy.clone())
}

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="pt-BR">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Provides the session, its read-only state signal and the role policy,
/// then sets up client-side routing.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let config = ConsoleConfig::from_build_env();
    let session = build_session(&config);

    // The session is the only writer; everyone else reads the signal.
    let (state, set_state) = signal(SessionState::default());
    session.subscribe(move |s| set_state.set(s.clone()));

    let handle: SessionHandle = StoredValue::new_local(session);
    provide_context(handle);
    provide_context(state);
    provide_context(config.role_policy);

    // Restore from storage on the client only, so the server render stays in
    // the loading state.
    Effect::new(move || handle.with_value(Session::initialize));

    view! {
        <Stylesheet id="leptos" href="/pkg/imob-console.css"/>
        <Title text="Console"/>

        <Router>
            <SessionExpiryRedirect/>
            <Routes fallback=|| "Página não encontrada.".into_view()>
                <Route path=StaticSegment("login") view=LoginPage/>
                <Route
                    path=StaticSegment("")
                    view=|| view! { <ProtectedRoute><DashboardPage/></ProtectedRoute> }
                />
                <Route
                    path=StaticSegment("password")
                    view=|| view! { <ProtectedRoute><PasswordPage/></ProtectedRoute> }
                />
                <Route path=(StaticSegment("r"), ParamSegment("kind")) view=ResourceRoute/>
            </Routes>
        </Router>
    }
}

/// Navigates to the login view whenever any request comes back 401.
#[component]
fn SessionExpiryRedirect() -> impl IntoView {
    let handle = expect_context::<SessionHandle>();
    let navigate = use_navigate();
    handle.with_value(|session| redirect_on_expired(session.client().events(), navigate));
}

/// `/r/:kind`: resource list behind the kind's role requirement.
#[component]
fn ResourceRoute() -> impl IntoView {
    let params = use_params_map();
    move || {
        let slug = params.with(|p| p.get("kind")).unwrap_or_default();
        match ResourceKind::from_slug(&slug) {
            Some(kind) => view! {
                <ProtectedRoute required_role=required_role(kind)>
                    <ResourceListPage kind/>
                </ProtectedRoute>
            }
            .into_any(),
            None => view! { <p class="not-found">"Página não encontrada."</p> }.into_any(),
        }
    }
}
