//! # imob-console
//!
//! Leptos + WASM admin console for a real-estate backend: login, session
//! persistence, role-based route guards and generic resource lists.
//!
//! All backend traffic goes through [`net::http::ApiClient`], which attaches
//! the stored bearer token and signs the session out on any 401.
//!
//! ## Hosting
//!
//! The `hydrate` entry point attaches to server-rendered markup, so the
//! bundle needs a host built with the `ssr` feature that serves
//! [`app::shell`] (for example a `leptos_axum` router). This crate ships no
//! such host.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// Browser entry point: install logging and hydrate the markup produced by
/// [`app::shell`].
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
