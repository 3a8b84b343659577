//! Login, logout and password change against the backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Stateless operations over the API client. Persisting a successful login
//! is the session's job; this layer only talks to the network and shapes
//! the user profile.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::fmt;

use super::http::{ApiClient, ApiError, HttpRequest, Method, Transport};
use super::types::{LoginRequest, LoginResponse, PasswordChangeRequest, User};
use crate::util::storage::KeyValueStore;

pub const LOGIN_ENDPOINT: &str = "/auth/login";

fn password_endpoint(user_id: &str) -> String {
    format!("/users/{user_id}/password")
}

/// Email/password pair for a single login attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("network error: {0}")]
    Network(String),
}

/// Local part of an email address, used as the fallback display name.
#[must_use]
pub fn email_local_part(email: &str) -> &str {
    email.split_once('@').map_or(email, |(local, _)| local)
}

const PLACEHOLDER_ID_PREFIX: &str = "local:";

/// Stable id for profiles the backend returned without one.
#[must_use]
pub fn placeholder_user_id(email: &str) -> String {
    format!("{PLACEHOLDER_ID_PREFIX}{email}")
}

/// True for ids minted by [`placeholder_user_id`]; the backend has no
/// record under them.
#[must_use]
pub fn is_placeholder_user_id(user_id: &str) -> bool {
    user_id.starts_with(PLACEHOLDER_ID_PREFIX)
}

/// Build the session profile from the login response, filling gaps from
/// the submitted email.
#[must_use]
pub fn build_user(credentials: &Credentials, response: &LoginResponse) -> User {
    let profile = response.user.clone().unwrap_or_default();
    let email = profile
        .email
        .clone()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| credentials.email.clone());
    let name = profile
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email_local_part(&email).to_owned());
    let id = profile
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| placeholder_user_id(&email));
    User { id, email, name, roles: profile.role_list() }
}

/// Auth operations over a shared [`ApiClient`].
pub struct AuthService<T, K> {
    client: ApiClient<T, K>,
}

impl<T, K> Clone for AuthService<T, K> {
    fn clone(&self) -> Self {
        Self { client: self.client.clone() }
    }
}

impl<T: Transport, K: KeyValueStore> AuthService<T, K> {
    pub fn new(client: ApiClient<T, K>) -> Self {
        Self { client }
    }

    /// Exchange credentials for a token and profile. Nothing is persisted.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] for any non-2xx reply or a reply
    /// without a token, [`AuthError::Network`] if the server is unreachable.
    pub async fn login(&self, credentials: &Credentials) -> Result<(String, User), AuthError> {
        let body = LoginRequest { email: &credentials.email, password: &credentials.password };
        let request = HttpRequest::new(Method::Post, LOGIN_ENDPOINT)
            .with_json(&body)
            .map_err(|_| AuthError::InvalidCredentials)?;
        // The login endpoint is unauthenticated; a 401 here means bad
        // credentials, not an expired session.
        let response = self
            .client
            .send_anonymous(request)
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        if !response.is_success() {
            log::debug!("login rejected with status {}", response.status);
            return Err(AuthError::InvalidCredentials);
        }

        let parsed: LoginResponse = response.json().map_err(|_| AuthError::InvalidCredentials)?;
        let Some(token) = parsed.access_token.clone().filter(|t| !t.is_empty()) else {
            log::warn!("login response did not include an access token");
            return Err(AuthError::InvalidCredentials);
        };
        Ok((token, build_user(credentials, &parsed)))
    }

    /// Drop persisted credentials. Navigation is left to the caller.
    pub fn logout(&self) {
        self.client.tokens().clear();
    }

    /// Change the password of `user_id`.
    ///
    /// # Errors
    ///
    /// [`ApiError::MissingUserId`] without sending anything when `user_id`
    /// is a placeholder; otherwise any [`ApiError`], with server `message`
    /// fields carried through.
    pub async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        if user_id.is_empty() || is_placeholder_user_id(user_id) {
            log::warn!("password change skipped: profile has no server id");
            return Err(ApiError::MissingUserId);
        }
        let body = PasswordChangeRequest { current_password, new_password };
        let request = HttpRequest::new(Method::Put, password_endpoint(user_id)).with_json(&body)?;
        self.client.send_empty(request).await
    }
}
