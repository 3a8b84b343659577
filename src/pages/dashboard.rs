//! Authenticated landing page: greeting, role-filtered menu and logout.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use crate::app::SessionHandle;
use crate::config::LOGIN_PATH;
use crate::net::types::User;
use crate::state::permissions::RolePolicy;
use crate::state::session::SessionState;
use crate::util::menu::visible_menu;

/// Greeting line, falling back to the email when the name is blank.
pub fn greeting(user: &User) -> String {
    let name = user.name.trim();
    let who = if name.is_empty() { user.email.as_str() } else { name };
    format!("Olá, {who}")
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let session = expect_context::<ReadSignal<SessionState>>();
    let policy = expect_context::<RolePolicy>();
    let handle = expect_context::<SessionHandle>();
    let navigate = use_navigate();

    let on_logout = move |_| {
        handle.with_value(|s| s.logout());
        navigate(LOGIN_PATH, NavigateOptions::default());
    };

    let header = move || {
        session.with(|s| {
            s.user().map(|user| {
                view! {
                    <div class="dashboard-user">
                        <span class="dashboard-user__greeting">{greeting(user)}</span>
                        <span class="dashboard-user__roles">{user.roles_label()}</span>
                    </div>
                }
            })
        })
    };

    let menu = move || {
        let items = session.with(|s| visible_menu(s, &policy));
        items
            .into_iter()
            .map(|item| {
                view! {
                    <li class="dashboard-menu__item">
                        <A href=item.path()>{item.label()}</A>
                    </li>
                }
            })
            .collect_view()
    };

    view! {
        <div class="dashboard-page">
            <header class="dashboard-header">
                {header}
                <A href="/password">"Alterar senha"</A>
                <button class="dashboard-logout" on:click=on_logout>"Sair"</button>
            </header>
            <nav>
                <ul class="dashboard-menu">{menu}</ul>
            </nav>
        </div>
    }
}
