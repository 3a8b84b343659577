//! Utility helpers shared across console modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Browser storage and routing decisions, kept out of page and component
//! code.

pub mod auth;
pub mod menu;
pub mod storage;
pub mod token_store;
