//! Build-time console configuration.
//!
//! The WASM bundle has no process environment at runtime, so settings are
//! captured with `option_env!` when the crate is compiled:
//!
//! - `CONSOLE_API_URL`: backend base URL (default `http://localhost:3000`).
//! - `CONSOLE_ROLE_HIERARCHY`: role ranking such as `ADMIN>USER`; empty
//!   means exact role matching (default `ADMIN>USER`).

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::state::permissions::RolePolicy;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_ROLE_HIERARCHY: &str = "ADMIN>USER";

/// Route of the login view.
pub const LOGIN_PATH: &str = "/login";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub api_base_url: String,
    pub role_policy: RolePolicy,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self::from_values(None, None)
    }
}

impl ConsoleConfig {
    /// Configuration baked in at compile time.
    #[must_use]
    pub fn from_build_env() -> Self {
        Self::from_values(option_env!("CONSOLE_API_URL"), option_env!("CONSOLE_ROLE_HIERARCHY"))
    }

    #[must_use]
    pub fn from_values(api_url: Option<&str>, role_hierarchy: Option<&str>) -> Self {
        let api_base_url = api_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_owned();
        let role_policy = RolePolicy::parse(role_hierarchy.unwrap_or(DEFAULT_ROLE_HIERARCHY));
        Self { api_base_url, role_policy }
    }
}
