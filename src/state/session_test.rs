use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::executor::block_on;

use super::*;
use crate::net::http::{HttpRequest, HttpResponse, Method, TransportError};
use crate::net::test_support::{ScriptedTransport, make_client, make_user};
use crate::util::storage::MemoryStore;
use crate::util::token_store::TokenStore;

// =============================================================
// Helpers
// =============================================================

fn make_session(policy: RolePolicy) -> (Session<ScriptedTransport, MemoryStore>, ScriptedTransport, MemoryStore) {
    let (client, transport, memory) = make_client();
    (Session::new(client, policy), transport, memory)
}

fn signed_in_session() -> (Session<ScriptedTransport, MemoryStore>, ScriptedTransport, MemoryStore) {
    let (session, transport, memory) = make_session(RolePolicy::Exact);
    session.initialize();
    transport.reply(200, r#"{"access_token": "tok123", "user": {"id": 1, "name": "Ana", "role": "USER"}}"#);
    assert!(block_on(session.login("a@b.com", "secret")));
    (session, transport, memory)
}

/// Transport whose single reply is released by the test.
#[derive(Clone)]
struct GatedTransport {
    gate: Rc<RefCell<Option<oneshot::Receiver<HttpResponse>>>>,
    sent: Rc<Cell<usize>>,
}

impl Transport for GatedTransport {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.sent.set(self.sent.get() + 1);
        let gate = self.gate.borrow_mut().take();
        match gate {
            Some(rx) => rx.await.map_err(|_| TransportError("gate dropped".to_owned())),
            None => Err(TransportError("gate already used".to_owned())),
        }
    }
}

fn gated_session() -> (Session<GatedTransport, MemoryStore>, GatedTransport, oneshot::Sender<HttpResponse>) {
    let (tx, rx) = oneshot::channel();
    let transport = GatedTransport { gate: Rc::new(RefCell::new(Some(rx))), sent: Rc::new(Cell::new(0)) };
    let client = ApiClient::new(transport.clone(), TokenStore::new(MemoryStore::new()));
    let session = Session::new(client, RolePolicy::Exact);
    session.initialize();
    (session, transport, tx)
}

// =============================================================
// SessionState
// =============================================================

#[test]
fn session_state_default_is_initializing() {
    let state = SessionState::default();
    assert!(state.is_loading());
    assert!(!state.login_pending);
    assert!(state.user().is_none());
}

#[test]
fn anonymous_state_has_no_permission() {
    let state = SessionState { phase: SessionPhase::Anonymous, login_pending: false };
    assert!(!state.has_permission(&RolePolicy::Exact, crate::state::permissions::ANY_ROLE));
}

// =============================================================
// initialize
// =============================================================

#[test]
fn initialize_empty_store_is_anonymous() {
    let (session, transport, _) = make_session(RolePolicy::Exact);
    session.initialize();
    assert_eq!(session.state().phase, SessionPhase::Anonymous);
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn initialize_restores_stored_session_without_network() {
    let (client, transport, _) = make_client();
    let user = make_user("USER");
    client.tokens().write("T", &user).unwrap();
    let session = Session::new(client, RolePolicy::Exact);

    session.initialize();
    assert_eq!(session.state().phase, SessionPhase::Authenticated(user));
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn initialize_discards_partial_record() {
    let (session, _, memory) = make_session(RolePolicy::Exact);
    memory.set("token", "T").unwrap();
    session.initialize();
    assert_eq!(session.state().phase, SessionPhase::Anonymous);
    assert!(memory.is_empty());
}

#[test]
fn initialize_runs_once() {
    let (session, _, memory) = make_session(RolePolicy::Exact);
    session.initialize();
    TokenStore::new(memory.clone()).write("T", &make_user("USER")).unwrap();
    session.initialize();
    assert_eq!(session.state().phase, SessionPhase::Anonymous);
}

// =============================================================
// login
// =============================================================

#[test]
fn login_success_persists_and_authenticates() {
    let (session, transport, memory) = make_session(RolePolicy::Exact);
    session.initialize();
    transport.reply(200, r#"{"access_token": "tok123"}"#);

    assert!(block_on(session.login("a@b.com", "secret")));

    let record = TokenStore::new(memory).read().unwrap();
    assert_eq!(record.token, "tok123");
    assert_eq!(record.user.name, "a");
    assert_eq!(session.state().user(), Some(&record.user));
    assert!(!session.state().login_pending);
}

#[test]
fn login_bad_request_stays_anonymous_with_empty_store() {
    let (session, transport, memory) = make_session(RolePolicy::Exact);
    session.initialize();
    transport.reply(400, "");
    assert!(!block_on(session.login("a@b.com", "wrong")));
    assert_eq!(session.state().phase, SessionPhase::Anonymous);
    assert!(memory.is_empty());
}

#[test]
fn login_network_failure_returns_false() {
    let (session, transport, _) = make_session(RolePolicy::Exact);
    session.initialize();
    transport.fail("offline");
    assert!(!block_on(session.login("a@b.com", "secret")));
    assert_eq!(session.state().phase, SessionPhase::Anonymous);
}

#[test]
fn failed_relogin_leaves_store_byte_for_byte() {
    let (session, transport, memory) = signed_in_session();
    let before = memory.snapshot();
    transport.reply(401, "");
    assert!(!block_on(session.login("a@b.com", "wrong")));
    assert_eq!(memory.snapshot(), before);
    assert!(session.state().is_authenticated());
}

#[test]
fn login_storage_failure_returns_false_and_keeps_state() {
    let (session, transport, memory) = make_session(RolePolicy::Exact);
    session.initialize();
    memory.reject_writes_to("user");
    transport.reply(200, r#"{"access_token": "tok123"}"#);
    assert!(!block_on(session.login("a@b.com", "secret")));
    assert!(memory.is_empty());
    assert_eq!(session.state().phase, SessionPhase::Anonymous);
}

#[test]
fn login_true_iff_store_has_token_and_user() {
    let (session, transport, memory) = make_session(RolePolicy::Exact);
    session.initialize();
    transport
        .reply(400, "")
        .reply(200, r#"{"access_token": "t1"}"#)
        .fail("offline")
        .reply(200, r#"{"nothing": true}"#)
        .reply(200, r#"{"access_token": "t2"}"#);
    let tokens = TokenStore::new(memory);
    for _ in 0..5 {
        let before = tokens.read();
        let ok = block_on(session.login("a@b.com", "secret"));
        let after = tokens.read();
        if ok {
            assert!(after.as_ref().is_some_and(|r| !r.token.is_empty()));
        } else {
            assert_eq!(after, before);
        }
    }
    assert_eq!(tokens.read().unwrap().token, "t2");
}

#[test]
fn overlapping_login_is_rejected_without_request() {
    let (session, transport, tx) = gated_session();
    let mut first = Box::pin(session.login("a@b.com", "secret"));
    assert!((&mut first).now_or_never().is_none());
    assert!(session.state().login_pending);

    assert!(!block_on(session.login("a@b.com", "secret")));
    assert_eq!(transport.sent.get(), 1);

    tx.send(HttpResponse { status: 200, body: r#"{"access_token": "tok"}"#.to_owned() })
        .unwrap();
    assert!(block_on(first));
    assert!(!session.state().login_pending);
    assert!(session.state().is_authenticated());
}

#[test]
fn dropped_login_releases_flight() {
    let (session, _, _tx) = gated_session();
    let mut first = Box::pin(session.login("a@b.com", "secret"));
    assert!((&mut first).now_or_never().is_none());
    drop(first);
    assert!(!session.state().login_pending);
    assert_eq!(session.state().phase, SessionPhase::Anonymous);
}

// =============================================================
// logout / 401
// =============================================================

#[test]
fn logout_clears_store_and_state() {
    let (session, _, memory) = signed_in_session();
    session.logout();
    assert!(memory.is_empty());
    assert_eq!(session.state().phase, SessionPhase::Anonymous);
}

#[test]
fn logout_twice_matches_once() {
    let (session, _, memory) = signed_in_session();
    session.logout();
    let once = (session.state(), memory.snapshot());
    session.logout();
    assert_eq!((session.state(), memory.snapshot()), once);
}

#[test]
fn unauthorized_response_signs_out() {
    let (session, transport, memory) = signed_in_session();
    let navigated = Rc::new(Cell::new(false));
    let flag = Rc::clone(&navigated);
    session.client().events().subscribe(move |_| flag.set(true));
    transport.reply(401, "");

    let result = block_on(session.client().send(HttpRequest::new(Method::Get, "/questionnaires")));
    assert_eq!(result, Err(ApiError::Unauthorized));
    assert!(memory.is_empty());
    assert_eq!(session.state().phase, SessionPhase::Anonymous);
    assert!(navigated.get());
}

#[test]
fn unauthorized_and_logout_converge() {
    let (a, a_transport, a_memory) = signed_in_session();
    a_transport.reply(401, "");
    let _ = block_on(a.client().send(HttpRequest::new(Method::Get, "/imobs")));

    let (b, _, b_memory) = signed_in_session();
    b.logout();

    assert_eq!(a.state(), b.state());
    assert_eq!(a_memory.snapshot(), b_memory.snapshot());
}

// =============================================================
// permissions / subscribers
// =============================================================

#[test]
fn has_permission_uses_policy() {
    let (session, transport, _) = make_session(RolePolicy::parse("ADMIN>USER"));
    session.initialize();
    assert!(!session.has_permission("USER"));
    transport.reply(200, r#"{"access_token": "t", "user": {"role": "ADMIN"}}"#);
    assert!(block_on(session.login("a@b.com", "secret")));
    assert!(session.has_permission("USER"));
    assert!(session.has_permission("ADMIN"));
}

#[test]
fn exact_policy_user_cannot_act_as_admin() {
    let (session, _, _) = signed_in_session();
    assert!(session.has_permission("USER"));
    assert!(!session.has_permission("ADMIN"));
}

#[test]
fn subscriber_sees_current_and_later_states() {
    let (session, transport, _) = make_session(RolePolicy::Exact);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    session.subscribe(move |state| log.borrow_mut().push(state.clone()));

    session.initialize();
    transport.reply(200, r#"{"access_token": "t"}"#);
    assert!(block_on(session.login("a@b.com", "secret")));

    let seen = seen.borrow();
    assert!(seen[0].is_loading());
    assert_eq!(seen[1].phase, SessionPhase::Anonymous);
    assert!(seen.iter().any(|s| s.login_pending));
    let last = seen.last().unwrap();
    assert!(last.is_authenticated());
    assert!(!last.login_pending);
}

#[test]
fn change_password_requires_session() {
    let (session, transport, _) = make_session(RolePolicy::Exact);
    session.initialize();
    assert_eq!(block_on(session.change_password("a", "b")), Err(ApiError::Unauthorized));
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn change_password_targets_current_user() {
    let (session, transport, _) = signed_in_session();
    transport.reply(204, "");
    block_on(session.change_password("old", "new")).unwrap();
    assert_eq!(transport.requests().last().unwrap().path, "/users/1/password");
}

#[test]
fn change_password_without_server_id_sends_nothing() {
    let (session, transport, _) = make_session(RolePolicy::Exact);
    session.initialize();
    transport.reply(200, r#"{"access_token": "tok123"}"#);
    assert!(block_on(session.login("a@b.com", "secret")));
    assert_eq!(session.state().user().unwrap().id, "local:a@b.com");

    let result = block_on(session.change_password("old-secret", "new-secret"));
    assert_eq!(result, Err(ApiError::MissingUserId));
    assert_eq!(transport.request_count(), 1);
    assert!(result.unwrap_err().user_message().contains("identificador do servidor"));
}
