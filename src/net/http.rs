//! Request facade for every backend call.
//!
//! Client-side (hydrate): requests go out through `gloo-net`.
//! Server-side (SSR) and native builds: [`GlooTransport`] fails every request
//! with "not available on server".
//!
//! ERROR HANDLING
//! ==============
//! A 401 on an authenticated request is the only failure handled here: the
//! token store is cleared and [`AuthEvent::Expired`] is emitted, then the
//! caller still gets `Err(ApiError::Unauthorized)`. Navigation belongs to
//! whoever subscribes to the event. Every other status reaches the caller.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::ErrorBody;
use crate::util::storage::KeyValueStore;
use crate::util::token_store::TokenStore;

pub const STATUS_UNAUTHORIZED: u16 = 401;
pub const STATUS_FORBIDDEN: u16 = 403;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// An outbound request, relative to the API base URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), headers: Vec::new(), body: None }
    }

    /// Attach a JSON body and the matching content type.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if `body` cannot be serialized.
    pub fn with_json<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        let raw = serde_json::to_string(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.headers.push(("Content-Type".to_owned(), "application/json".to_owned()));
        self.body = Some(raw);
        Ok(self)
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] on malformed or mismatched JSON.
    pub fn json<R: DeserializeOwned>(&self) -> Result<R, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Server-provided `message` field, when the body carries one.
    #[must_use]
    pub fn server_message(&self) -> Option<String> {
        serde_json::from_str::<ErrorBody>(&self.body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
    }
}

/// The request never produced a response.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("session expired")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden { message: Option<String> },
    #[error("server returned {status}")]
    Status { status: u16, message: Option<String> },
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    /// The signed-in profile came without a backend id.
    #[error("profile has no server id")]
    MissingUserId,
}

impl ApiError {
    /// Classify a non-2xx response.
    #[must_use]
    pub fn from_response(response: &HttpResponse) -> Self {
        let message = response.server_message();
        match response.status {
            STATUS_UNAUTHORIZED => Self::Unauthorized,
            STATUS_FORBIDDEN => Self::Forbidden { message },
            status => Self::Status { status, message },
        }
    }

    /// Message suitable for rendering in the console.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "Sessão expirada. Faça login novamente.".to_owned(),
            Self::Forbidden { message } => message
                .clone()
                .unwrap_or_else(|| "Você não tem permissão para esta ação.".to_owned()),
            Self::Status { status, message } => message
                .clone()
                .unwrap_or_else(|| format!("Erro do servidor ({status}).")),
            Self::Network(_) => "Falha ao contactar o servidor.".to_owned(),
            Self::Decode(_) => "Resposta inesperada do servidor.".to_owned(),
            Self::MissingUserId => {
                "Perfil sem identificador do servidor. Faça login novamente para alterar a senha.".to_owned()
            }
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        Self::Network(e.0)
    }
}

/// Sends a request and yields the raw response.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response was received.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Join the API base URL and a request path without doubling slashes.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') { format!("{base}{path}") } else { format!("{base}/{path}") }
}

/// Browser transport backed by `gloo-net`.
#[derive(Clone, Debug)]
pub struct GlooTransport {
    base_url: String,
}

impl GlooTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }
}

impl Transport for GlooTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        #[cfg(feature = "hydrate")]
        {
            use gloo_net::http::{Method as GlooMethod, RequestBuilder};

            let url = join_url(&self.base_url, &request.path);
            let method = match request.method {
                Method::Get => GlooMethod::GET,
                Method::Post => GlooMethod::POST,
                Method::Put => GlooMethod::PUT,
                Method::Patch => GlooMethod::PATCH,
                Method::Delete => GlooMethod::DELETE,
            };
            let mut builder = RequestBuilder::new(&url).method(method);
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            let built = match request.body {
                Some(body) => builder.body(body),
                None => builder.build(),
            }
            .map_err(|e| TransportError(e.to_string()))?;
            let resp = built.send().await.map_err(|e| TransportError(e.to_string()))?;
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            Ok(HttpResponse { status, body })
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (&self.base_url, request);
            Err(TransportError("not available on server".to_owned()))
        }
    }
}

/// Session-level signals raised by the HTTP layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    /// A request was rejected with 401; stored credentials are gone.
    Expired,
}

type Listener = Rc<dyn Fn(AuthEvent)>;

/// Listener list for [`AuthEvent`]s. Clones share the list.
#[derive(Clone, Default)]
pub struct AuthEvents {
    listeners: Rc<RefCell<Vec<Listener>>>,
}

impl AuthEvents {
    pub fn subscribe(&self, listener: impl Fn(AuthEvent) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    pub fn emit(&self, event: AuthEvent) {
        // Listeners may subscribe while being notified.
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(event);
        }
    }
}

struct ClientInner<T, K> {
    transport: T,
    tokens: TokenStore<K>,
    events: AuthEvents,
}

/// Authenticated API client. Clones share transport, token store and events.
pub struct ApiClient<T, K> {
    inner: Rc<ClientInner<T, K>>,
}

impl<T, K> Clone for ApiClient<T, K> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<T: Transport, K: KeyValueStore> ApiClient<T, K> {
    pub fn new(transport: T, tokens: TokenStore<K>) -> Self {
        Self {
            inner: Rc::new(ClientInner { transport, tokens, events: AuthEvents::default() }),
        }
    }

    pub fn tokens(&self) -> &TokenStore<K> {
        &self.inner.tokens
    }

    pub fn events(&self) -> &AuthEvents {
        &self.inner.events
    }

    /// Send with the stored bearer token attached.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unauthorized`] after a 401 (store already cleared and
    /// [`AuthEvent::Expired`] emitted), [`ApiError::Network`] when the
    /// transport fails. Other statuses are returned as `Ok`.
    pub async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        if let Some(token) = self.inner.tokens.token() {
            request.headers.push(("Authorization".to_owned(), format!("Bearer {token}")));
        }
        let method = request.method;
        let path = request.path.clone();
        let response = self.inner.transport.send(request).await.map_err(|e| {
            log::warn!("{} {path} failed: {e}", method.as_str());
            ApiError::from(e)
        })?;

        if response.status == STATUS_UNAUTHORIZED {
            log::warn!("{} {path} rejected with 401; clearing session", method.as_str());
            self.inner.tokens.clear();
            self.inner.events.emit(AuthEvent::Expired);
            return Err(ApiError::Unauthorized);
        }
        Ok(response)
    }

    /// Send without credentials and without 401 interception.
    ///
    /// # Errors
    ///
    /// [`ApiError::Network`] when the transport fails.
    pub async fn send_anonymous(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        Ok(self.inner.transport.send(request).await?)
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`]; non-2xx statuses are classified by [`ApiError::from_response`].
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let response = self.send(HttpRequest::new(Method::Get, path)).await?;
        expect_success(&response)?;
        response.json()
    }

    /// Send a JSON body and decode a JSON reply.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`]; non-2xx statuses are classified by [`ApiError::from_response`].
    pub async fn send_json<B: Serialize, R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let request = HttpRequest::new(method, path).with_json(body)?;
        let response = self.send(request).await?;
        expect_success(&response)?;
        response.json()
    }

    /// Send a request whose reply body is ignored.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`]; non-2xx statuses are classified by [`ApiError::from_response`].
    pub async fn send_empty(&self, request: HttpRequest) -> Result<(), ApiError> {
        let response = self.send(request).await?;
        expect_success(&response)
    }
}

fn expect_success(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() { Ok(()) } else { Err(ApiError::from_response(response)) }
}
