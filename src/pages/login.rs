//! Email + password login page.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::app::SessionHandle;
use crate::state::session::SessionState;

/// Shown for every rejected login, whatever the cause.
pub const LOGIN_FAILED_MESSAGE: &str = "Não foi possível entrar. Verifique e-mail e senha e tente novamente.";
const MISSING_FIELDS_MESSAGE: &str = "Informe e-mail e senha.";
const INVALID_EMAIL_MESSAGE: &str = "Informe um e-mail válido.";

/// Trim the email and require both fields. The password is kept as typed.
pub fn validate_login_input(email: &str, password: &str) -> Result<(String, String), &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(MISSING_FIELDS_MESSAGE);
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => return Err(INVALID_EMAIL_MESSAGE),
    }
    Ok((email.to_owned(), password.to_owned()))
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let session = expect_context::<ReadSignal<SessionState>>();
    let handle = expect_context::<SessionHandle>();
    let navigate = use_navigate();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());

    // Signed-in users have nothing to do here.
    let navigate_home = navigate.clone();
    Effect::new(move || {
        if session.get().is_authenticated() {
            navigate_home("/", NavigateOptions::default());
        }
    });

    let busy = move || session.get().login_pending;

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if session.get_untracked().login_pending {
            return;
        }
        let (email_value, password_value) = match validate_login_input(&email.get(), &password.get()) {
            Ok(values) => values,
            Err(message) => {
                info.set(message.to_owned());
                return;
            }
        };
        info.set(String::new());

        #[cfg(feature = "hydrate")]
        {
            let console = handle.get_value();
            let navigate = navigate.clone();
            leptos::task::spawn_local(async move {
                if console.login(&email_value, &password_value).await {
                    password.set(String::new());
                    navigate("/", NavigateOptions::default());
                } else {
                    info.set(LOGIN_FAILED_MESSAGE.to_owned());
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = (email_value, password_value, handle, &navigate);
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Console Imobiliário"</h1>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="voce@exemplo.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Senha"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=busy>
                        {move || if busy() { "Entrando..." } else { "Entrar" }}
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
            </div>
        </div>
    }
}
