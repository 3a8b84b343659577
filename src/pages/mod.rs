//! Route-level screens.
//!
//! Pages read session state from context and talk to the backend through
//! the session's API client. Validation and message formatting live in plain
//! functions next to each page so they can be tested without a DOM.

pub mod dashboard;
pub mod login;
pub mod password;
pub mod resource_list;
