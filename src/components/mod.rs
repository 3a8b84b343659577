//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read session state from Leptos context providers and wrap
//! page content.

pub mod protected_route;
