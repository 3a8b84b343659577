//! Password change for the signed-in user.

#[cfg(test)]
#[path = "password_test.rs"]
mod password_test;

use leptos::prelude::*;
use leptos_router::components::A;

use crate::app::SessionHandle;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const PASSWORD_CHANGED_MESSAGE: &str = "Senha alterada com sucesso.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PasswordFormError {
    #[error("Preencha todos os campos.")]
    MissingField,
    #[error("A nova senha deve ter pelo menos {MIN_PASSWORD_LEN} caracteres.")]
    TooShort,
    #[error("A confirmação não confere com a nova senha.")]
    Mismatch,
    #[error("A nova senha deve ser diferente da atual.")]
    Unchanged,
}

/// Check the form before anything is sent.
///
/// # Errors
///
/// The first [`PasswordFormError`] that applies, in field order.
pub fn validate_password_change(current: &str, new: &str, confirm: &str) -> Result<(), PasswordFormError> {
    if current.is_empty() || new.is_empty() || confirm.is_empty() {
        return Err(PasswordFormError::MissingField);
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordFormError::TooShort);
    }
    if new != confirm {
        return Err(PasswordFormError::Mismatch);
    }
    if new == current {
        return Err(PasswordFormError::Unchanged);
    }
    Ok(())
}

#[component]
pub fn PasswordPage() -> impl IntoView {
    let handle = expect_context::<SessionHandle>();
    let current = RwSignal::new(String::new());
    let new = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let (current_value, new_value) = (current.get(), new.get());
        if let Err(e) = validate_password_change(&current_value, &new_value, &confirm.get()) {
            info.set(e.to_string());
            return;
        }
        busy.set(true);
        info.set(String::new());

        #[cfg(feature = "hydrate")]
        {
            let console = handle.get_value();
            leptos::task::spawn_local(async move {
                match console.change_password(&current_value, &new_value).await {
                    Ok(()) => {
                        for field in [current, new, confirm] {
                            field.set(String::new());
                        }
                        info.set(PASSWORD_CHANGED_MESSAGE.to_owned());
                    }
                    Err(e) => {
                        log::warn!("password change failed: {e}");
                        info.set(e.user_message());
                    }
                }
                busy.set(false);
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (handle, current_value, new_value);
            busy.set(false);
        }
    };

    let field = move |label: &'static str, signal: RwSignal<String>| {
        view! {
            <label class="password-field">
                <span>{label}</span>
                <input
                    type="password"
                    prop:value=move || signal.get()
                    on:input=move |ev| signal.set(event_target_value(&ev))
                />
            </label>
        }
    };

    view! {
        <div class="password-page">
            <A href="/">"Voltar"</A>
            <h1>"Alterar senha"</h1>
            <form class="password-form" on:submit=on_submit>
                {field("Senha atual", current)}
                {field("Nova senha", new)}
                {field("Confirmar nova senha", confirm)}
                <button type="submit" disabled=move || busy.get()>"Salvar"</button>
            </form>
            <Show when=move || !info.get().is_empty()>
                <p class="password-message">{move || info.get()}</p>
            </Show>
        </div>
    }
}
