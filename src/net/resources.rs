//! REST collections managed by the console.
//!
//! Each entity kind exposes the same list/get/create/update/delete surface;
//! properties and users additionally support soft enable/disable.

#[cfg(test)]
#[path = "resources_test.rs"]
mod resources_test;

use super::http::{ApiClient, ApiError, HttpRequest, Method, Transport};
use super::types::ResourceRecord;
use crate::util::storage::KeyValueStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Imobs,
    Collaborators,
    Users,
    Questionnaires,
    Responses,
}

impl ResourceKind {
    pub const ALL: [Self; 5] =
        [Self::Imobs, Self::Collaborators, Self::Users, Self::Questionnaires, Self::Responses];

    /// URL slug, shared by the API collection and the console route.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::Imobs => "imobs",
            Self::Collaborators => "collaborators",
            Self::Users => "users",
            Self::Questionnaires => "questionnaires",
            Self::Responses => "responses",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Imobs => "Imóveis",
            Self::Collaborators => "Colaboradores",
            Self::Users => "Usuários",
            Self::Questionnaires => "Questionários",
            Self::Responses => "Respostas",
        }
    }

    #[must_use]
    pub fn supports_activation(self) -> bool {
        matches!(self, Self::Imobs | Self::Users)
    }

    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }
}

#[must_use]
pub fn collection_path(kind: ResourceKind) -> String {
    format!("/{}", kind.slug())
}

#[must_use]
pub fn item_path(kind: ResourceKind, id: &str) -> String {
    format!("/{}/{id}", kind.slug())
}

/// `PATCH` path for enabling/disabling a record, if the kind supports it.
#[must_use]
pub fn activation_path(kind: ResourceKind, id: &str, active: bool) -> Option<String> {
    if !kind.supports_activation() {
        return None;
    }
    let action = if active { "activate" } else { "deactivate" };
    Some(format!("{}/{action}", item_path(kind, id)))
}

/// Typed access to one collection.
pub struct ResourceApi<T, K> {
    client: ApiClient<T, K>,
    kind: ResourceKind,
}

impl<T: Transport, K: KeyValueStore> ResourceApi<T, K> {
    pub fn new(client: ApiClient<T, K>, kind: ResourceKind) -> Self {
        Self { client, kind }
    }

    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request.
    pub async fn list(&self) -> Result<Vec<ResourceRecord>, ApiError> {
        self.client.get_json(&collection_path(self.kind)).await
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request.
    pub async fn get(&self, id: &str) -> Result<ResourceRecord, ApiError> {
        self.client.get_json(&item_path(self.kind, id)).await
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request.
    pub async fn create(&self, fields: &serde_json::Value) -> Result<ResourceRecord, ApiError> {
        self.client
            .send_json(Method::Post, &collection_path(self.kind), fields)
            .await
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request.
    pub async fn update(&self, id: &str, fields: &serde_json::Value) -> Result<ResourceRecord, ApiError> {
        self.client
            .send_json(Method::Put, &item_path(self.kind, id), fields)
            .await
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from the request.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .send_empty(HttpRequest::new(Method::Delete, item_path(self.kind, id)))
            .await
    }

    /// Soft-enable or soft-disable a record.
    ///
    /// # Errors
    ///
    /// [`ApiError::Status`] with 405 when the kind has no activation
    /// endpoints; otherwise any [`ApiError`] from the request.
    pub async fn set_active(&self, id: &str, active: bool) -> Result<(), ApiError> {
        let Some(path) = activation_path(self.kind, id, active) else {
            return Err(ApiError::Status {
                status: 405,
                message: Some(format!("{} não pode ser ativado/desativado.", self.kind.title())),
            });
        };
        self.client.send_empty(HttpRequest::new(Method::Patch, path)).await
    }
}
