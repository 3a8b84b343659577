//! Wire DTOs for the console/backend boundary.
//!
//! DESIGN
//! ======
//! The backend is loose about identifier types (numeric or string ids) and
//! about role shape (`role` vs `roles`), so decoding normalizes both here and
//! the rest of the client only ever sees `String` ids and a role list.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize};

/// An authenticated console user, as persisted under the `user` storage key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UserWire")]
pub struct User {
    /// Backend identifier, or a `local:<email>` placeholder when the login
    /// response did not carry one.
    pub id: String,
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role labels (e.g. `"ADMIN"`, `"USER"`).
    pub roles: Vec<String>,
}

impl User {
    /// Roles joined for display, or `"nenhum"` when the user has none.
    #[must_use]
    pub fn roles_label(&self) -> String {
        if self.roles.is_empty() {
            "nenhum".to_owned()
        } else {
            self.roles.join(", ")
        }
    }
}

#[derive(Deserialize)]
struct UserWire {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    roles: Vec<String>,
    #[serde(default)]
    role: Option<String>,
}

impl From<UserWire> for User {
    fn from(wire: UserWire) -> Self {
        Self {
            id: wire.id,
            email: wire.email,
            name: wire.name,
            roles: merge_roles(wire.roles, wire.role),
        }
    }
}

fn merge_roles(mut roles: Vec<String>, role: Option<String>) -> Vec<String> {
    if let Some(role) = role.filter(|r| !r.trim().is_empty()) {
        if !roles.contains(&role) {
            roles.push(role);
        }
    }
    roles
}

/// Body of `POST /auth/login`.
#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Success payload of `POST /auth/login`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<LoginUser>,
}

/// Partial profile optionally returned alongside the token.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginUser {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl LoginUser {
    /// All roles carried by the response, `role` and `roles` combined.
    #[must_use]
    pub fn role_list(&self) -> Vec<String> {
        merge_roles(self.roles.clone(), self.role.clone())
    }
}

/// Body of `PUT /users/{id}/password`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeRequest<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

/// Error body some endpoints return on failure.
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// A record from one of the generic resource collections.
///
/// Only `id` is typed; every other field is kept as-is so the list view can
/// render whatever the backend sends for each entity kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

const LABEL_FIELDS: [&str; 6] = ["name", "nome", "title", "titulo", "email", "endereco"];
const ACTIVE_FIELDS: [&str; 3] = ["active", "ativo", "isActive"];

impl ResourceRecord {
    /// Best human-readable label for list rows, falling back to the id.
    #[must_use]
    pub fn label(&self) -> String {
        LABEL_FIELDS
            .iter()
            .find_map(|field| {
                self.fields
                    .get(*field)
                    .and_then(serde_json::Value::as_str)
                    .filter(|s| !s.trim().is_empty())
            })
            .map_or_else(|| self.id.clone(), str::to_owned)
    }

    /// Soft-disable flag, if the record carries one.
    #[must_use]
    pub fn is_active(&self) -> Option<bool> {
        ACTIVE_FIELDS
            .iter()
            .find_map(|field| self.fields.get(*field).and_then(serde_json::Value::as_bool))
    }
}

fn id_from_value<E: Error>(value: serde_json::Value) -> Result<String, E> {
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        _ => Err(E::custom("expected string or numeric id")),
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    id_from_value(value)
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        value => id_from_value::<D::Error>(value).map(Some),
    }
}
