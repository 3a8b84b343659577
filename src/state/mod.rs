//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! `session` owns the authentication state machine; `permissions` holds the
//! role policy it consults.

pub mod permissions;
pub mod session;
