//! Auth-session state for the current console user.
//!
//! SYSTEM CONTEXT
//! ==============
//! [`Session`] is the only writer of session state. It is created once by
//! the app root, injected through context, and mirrored into a read-only
//! signal via [`Session::subscribe`] for route guards and pages.
//!
//! TRANSITIONS
//! ===========
//! `Initializing -> Anonymous | Authenticated` once, from the token store.
//! `Anonymous -> Authenticated` on a successful `login`.
//! `Authenticated -> Anonymous` on `logout` or a 401 from any request.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::RefCell;
use std::rc::Rc;

use super::permissions::RolePolicy;
use crate::net::auth::{AuthService, Credentials};
use crate::net::http::{ApiClient, ApiError, AuthEvent, Transport};
use crate::net::types::User;
use crate::util::storage::KeyValueStore;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// Token store not read yet.
    #[default]
    Initializing,
    Anonymous,
    Authenticated(User),
}

/// Read-only snapshot handed to consumers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub phase: SessionPhase,
    /// A login request is in flight.
    pub login_pending: bool,
}

impl SessionState {
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match &self.phase {
            SessionPhase::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == SessionPhase::Initializing
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    /// `false` unless authenticated; otherwise delegated to `policy`.
    #[must_use]
    pub fn has_permission(&self, policy: &RolePolicy, required: &str) -> bool {
        self.user().is_some_and(|user| policy.permits(&user.roles, required))
    }
}

type StateListener = Rc<dyn Fn(&SessionState)>;

#[derive(Default)]
struct SessionCore {
    state: RefCell<SessionState>,
    listeners: RefCell<Vec<StateListener>>,
}

impl SessionCore {
    fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    fn update(&self, apply: impl FnOnce(&mut SessionState)) {
        apply(&mut *self.state.borrow_mut());
        let snapshot = self.snapshot();
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    fn set_phase(&self, phase: SessionPhase) {
        self.update(|s| s.phase = phase);
    }

    fn expire(&self) {
        if self.snapshot().is_authenticated() {
            log::info!("session expired; signing out");
            self.set_phase(SessionPhase::Anonymous);
        }
    }
}

/// Releases the single-flight login slot when the attempt finishes or its
/// future is dropped.
struct LoginFlight {
    core: Rc<SessionCore>,
}

impl LoginFlight {
    fn begin(core: &Rc<SessionCore>) -> Option<Self> {
        if core.state.borrow().login_pending {
            return None;
        }
        core.update(|s| s.login_pending = true);
        Some(Self { core: Rc::clone(core) })
    }
}

impl Drop for LoginFlight {
    fn drop(&mut self) {
        self.core.update(|s| s.login_pending = false);
    }
}

/// The console session: state machine over the token store and auth service.
pub struct Session<T, K> {
    client: ApiClient<T, K>,
    auth: AuthService<T, K>,
    policy: RolePolicy,
    core: Rc<SessionCore>,
}

impl<T, K> Clone for Session<T, K> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            auth: self.auth.clone(),
            policy: self.policy.clone(),
            core: Rc::clone(&self.core),
        }
    }
}

impl<T: Transport, K: KeyValueStore> Session<T, K> {
    /// Create the session in `Initializing` and hook it to the client's 401
    /// events.
    pub fn new(client: ApiClient<T, K>, policy: RolePolicy) -> Self {
        let core = Rc::new(SessionCore::default());
        let weak_core = Rc::downgrade(&core);
        client.events().subscribe(move |event| match event {
            AuthEvent::Expired => {
                if let Some(core) = weak_core.upgrade() {
                    core.expire();
                }
            }
        });
        let auth = AuthService::new(client.clone());
        Self { client, auth, policy, core }
    }

    pub fn client(&self) -> &ApiClient<T, K> {
        &self.client
    }

    pub fn policy(&self) -> &RolePolicy {
        &self.policy
    }

    pub fn state(&self) -> SessionState {
        self.core.snapshot()
    }

    /// Register `listener` for every state change. It is called once
    /// immediately with the current state.
    pub fn subscribe(&self, listener: impl Fn(&SessionState) + 'static) {
        let listener: StateListener = Rc::new(listener);
        self.core.listeners.borrow_mut().push(Rc::clone(&listener));
        listener(&self.core.snapshot());
    }

    /// Restore the session from the token store. No network access; only
    /// the first call has any effect.
    pub fn initialize(&self) {
        if !self.core.snapshot().is_loading() {
            return;
        }
        let tokens = self.client.tokens();
        match tokens.read() {
            Some(record) => {
                log::info!("restored session for {}", record.user.email);
                self.core.set_phase(SessionPhase::Authenticated(record.user));
            }
            None => {
                if tokens.has_partial_record() {
                    log::warn!("discarding incomplete stored session");
                    tokens.clear();
                }
                self.core.set_phase(SessionPhase::Anonymous);
            }
        }
    }

    /// Attempt a login. Returns `true` once the token store and session
    /// both hold the new user; `false` on any failure, leaving both as they
    /// were. Overlapping calls are rejected.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        let Some(_flight) = LoginFlight::begin(&self.core) else {
            log::warn!("login ignored: another attempt is in progress");
            return false;
        };
        let credentials = Credentials::new(email.trim(), password);
        let (token, user) = match self.auth.login(&credentials).await {
            Ok(result) => result,
            Err(e) => {
                log::warn!("login failed for {}: {e}", credentials.email);
                return false;
            }
        };
        if let Err(e) = self.client.tokens().write(&token, &user) {
            log::error!("could not persist session: {e}");
            return false;
        }
        log::info!("signed in as {}", user.email);
        self.core.set_phase(SessionPhase::Authenticated(user));
        true
    }

    /// Sign out. Idempotent; navigation is the caller's job.
    pub fn logout(&self) {
        self.auth.logout();
        if self.core.snapshot().phase != SessionPhase::Anonymous {
            self.core.set_phase(SessionPhase::Anonymous);
        }
    }

    #[must_use]
    pub fn has_permission(&self, required: &str) -> bool {
        self.core.state.borrow().has_permission(&self.policy, required)
    }

    /// Change the signed-in user's password.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unauthorized`] without a session, otherwise whatever the
    /// password endpoint returns.
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<(), ApiError> {
        let Some(user_id) = self.core.snapshot().user().map(|u| u.id.clone()) else {
            return Err(ApiError::Unauthorized);
        };
        self.auth.change_password(&user_id, current_password, new_password).await
    }
}
