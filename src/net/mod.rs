//! Networking modules for the REST backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `http` is the single request facade (bearer attach + 401 handling),
//! `auth` and `resources` are endpoint wrappers on top of it, and `types`
//! defines the wire schema.

pub mod auth;
pub mod http;
pub mod resources;
#[cfg(test)]
pub(crate) mod test_support;
pub mod types;
