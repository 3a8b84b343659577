//! Scripted transport and fixtures shared by network/session tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::http::{ApiClient, HttpRequest, HttpResponse, Transport, TransportError};
use super::types::User;
use crate::util::storage::MemoryStore;
use crate::util::token_store::TokenStore;

/// Replays queued responses in order and records every request.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    replies: Rc<RefCell<VecDeque<Result<HttpResponse, TransportError>>>>,
    requests: Rc<RefCell<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
    pub fn reply(&self, status: u16, body: &str) -> &Self {
        self.replies
            .borrow_mut()
            .push_back(Ok(HttpResponse { status, body: body.to_owned() }));
        self
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.replies.borrow_mut().push_back(Err(TransportError(message.to_owned())));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(request);
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted reply".to_owned())))
    }
}

pub fn make_client() -> (ApiClient<ScriptedTransport, MemoryStore>, ScriptedTransport, MemoryStore) {
    let transport = ScriptedTransport::default();
    let memory = MemoryStore::new();
    let client = ApiClient::new(transport.clone(), TokenStore::new(memory.clone()));
    (client, transport, memory)
}

pub fn make_user(role: &str) -> User {
    User {
        id: "u1".to_owned(),
        email: "a@b.com".to_owned(),
        name: "a".to_owned(),
        roles: vec![role.to_owned()],
    }
}
