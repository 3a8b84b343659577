//! Generic list view for one resource collection.
//!
//! Loads the collection once per mount and offers the row actions the kind
//! supports: activate/deactivate (properties and users) and delete. Request
//! failures are shown inline through [`ApiError::user_message`]; a 401 has
//! already signed the session out by the time it reaches this page.

#[cfg(test)]
#[path = "resource_list_test.rs"]
mod resource_list_test;

use leptos::prelude::*;
use leptos_router::components::A;

use crate::app::SessionHandle;
use crate::net::http::{ApiError, Transport};
use crate::net::resources::{ResourceApi, ResourceKind};
use crate::net::types::ResourceRecord;
use crate::util::storage::KeyValueStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordAction {
    Activate,
    Deactivate,
    Delete,
}

impl RecordAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Activate => "Ativar",
            Self::Deactivate => "Desativar",
            Self::Delete => "Excluir",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            Self::Activate => "Registro ativado.",
            Self::Deactivate => "Registro desativado.",
            Self::Delete => "Registro excluído.",
        }
    }
}

pub fn record_status_label(record: &ResourceRecord) -> &'static str {
    match record.is_active() {
        Some(true) => "Ativo",
        Some(false) => "Inativo",
        None => "-",
    }
}

/// Activation action offered for `record`, if `kind` supports one.
/// Records without an explicit flag are treated as active.
pub fn toggle_action(kind: ResourceKind, record: &ResourceRecord) -> Option<RecordAction> {
    if !kind.supports_activation() {
        return None;
    }
    match record.is_active() {
        Some(false) => Some(RecordAction::Activate),
        _ => Some(RecordAction::Deactivate),
    }
}

/// Mirror a successful action into the loaded list without refetching.
pub fn apply_action(records: &mut Vec<ResourceRecord>, id: &str, action: RecordAction) {
    match action {
        RecordAction::Delete => records.retain(|r| r.id != id),
        RecordAction::Activate | RecordAction::Deactivate => {
            let active = action == RecordAction::Activate;
            if let Some(record) = records.iter_mut().find(|r| r.id == id) {
                let field = ["active", "ativo", "isActive"]
                    .into_iter()
                    .find(|f| record.fields.contains_key(*f))
                    .unwrap_or("active");
                record.fields.insert(field.to_owned(), serde_json::Value::Bool(active));
            }
        }
    }
}

/// Perform `action` on the record `id`.
///
/// # Errors
///
/// Any [`ApiError`] from the request.
pub async fn run_action<T: Transport, K: KeyValueStore>(
    api: &ResourceApi<T, K>,
    id: &str,
    action: RecordAction,
) -> Result<(), ApiError> {
    match action {
        RecordAction::Activate => api.set_active(id, true).await,
        RecordAction::Deactivate => api.set_active(id, false).await,
        RecordAction::Delete => api.delete(id).await,
    }
}

#[cfg(feature = "hydrate")]
fn confirm_delete(label: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(&format!("Excluir \"{label}\"?")).ok())
        .unwrap_or(false)
}

#[component]
pub fn ResourceListPage(kind: ResourceKind) -> impl IntoView {
    let handle = expect_context::<SessionHandle>();
    let records = RwSignal::new(Vec::<ResourceRecord>::new());
    let loading = RwSignal::new(true);
    let info = RwSignal::new(String::new());

    #[cfg(feature = "hydrate")]
    {
        let api = ResourceApi::new(handle.with_value(|s| s.client().clone()), kind);
        leptos::task::spawn_local(async move {
            match api.list().await {
                Ok(list) => records.set(list),
                Err(e) => {
                    log::warn!("loading {} failed: {e}", kind.slug());
                    info.set(e.user_message());
                }
            }
            loading.set(false);
        });
    }

    let on_action = move |id: String, label: String, action: RecordAction| {
        #[cfg(feature = "hydrate")]
        {
            if action == RecordAction::Delete && !confirm_delete(&label) {
                return;
            }
            let api = ResourceApi::new(handle.with_value(|s| s.client().clone()), kind);
            leptos::task::spawn_local(async move {
                match run_action(&api, &id, action).await {
                    Ok(()) => {
                        records.update(|list| apply_action(list, &id, action));
                        info.set(action.success_message().to_owned());
                    }
                    Err(e) => info.set(e.user_message()),
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = (id, label, action, handle);
    };

    let rows = move || {
        records
            .get()
            .into_iter()
            .map(|record| {
                let label = record.label();
                let status = record_status_label(&record);
                let toggle = toggle_action(kind, &record).map(|action| {
                    let (id, label) = (record.id.clone(), label.clone());
                    view! {
                        <button on:click=move |_| on_action(id.clone(), label.clone(), action)>
                            {action.label()}
                        </button>
                    }
                });
                let (id, delete_label) = (record.id.clone(), label.clone());
                view! {
                    <tr>
                        <td>{record.id.clone()}</td>
                        <td>{label}</td>
                        <td>{status}</td>
                        <td class="resource-actions">
                            {toggle}
                            <button
                                class="resource-actions__delete"
                                on:click=move |_| on_action(id.clone(), delete_label.clone(), RecordAction::Delete)
                            >
                                {RecordAction::Delete.label()}
                            </button>
                        </td>
                    </tr>
                }
            })
            .collect_view()
    };

    view! {
        <div class="resource-page">
            <header class="resource-header">
                <A href="/">"Voltar"</A>
                <h1>{kind.title()}</h1>
            </header>
            <Show when=move || !info.get().is_empty()>
                <p class="resource-message">{move || info.get()}</p>
            </Show>
            <Show
                when=move || !loading.get()
                fallback=|| view! { <p class="resource-loading">"Carregando..."</p> }
            >
                <Show
                    when=move || !records.with(Vec::is_empty)
                    fallback=|| view! { <p class="resource-empty">"Nenhum registro."</p> }
                >
                    <table class="resource-table">
                        <thead>
                            <tr>
                                <th>"ID"</th>
                                <th>"Nome"</th>
                                <th>"Status"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>{rows}</tbody>
                    </table>
                </Show>
            </Show>
        </div>
    }
}
