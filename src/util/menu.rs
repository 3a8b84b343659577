//! Role-filtered navigation entries for the dashboard.

#[cfg(test)]
#[path = "menu_test.rs"]
mod menu_test;

use crate::net::resources::ResourceKind;
use crate::state::permissions::{ANY_ROLE, RolePolicy};
use crate::state::session::SessionState;

pub const ADMIN_ROLE: &str = "ADMIN";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuItem {
    pub kind: ResourceKind,
    pub required_role: &'static str,
}

impl MenuItem {
    #[must_use]
    pub fn path(self) -> String {
        resource_route(self.kind)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        self.kind.title()
    }
}

/// Console route for a resource list.
#[must_use]
pub fn resource_route(kind: ResourceKind) -> String {
    format!("/r/{}", kind.slug())
}

/// Role needed to open a resource view.
#[must_use]
pub fn required_role(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Users => ADMIN_ROLE,
        _ => ANY_ROLE,
    }
}

/// Every entry, in display order.
#[must_use]
pub fn menu_items() -> Vec<MenuItem> {
    ResourceKind::ALL
        .into_iter()
        .map(|kind| MenuItem { kind, required_role: required_role(kind) })
        .collect()
}

/// Entries the current session may open.
#[must_use]
pub fn visible_menu(state: &SessionState, policy: &RolePolicy) -> Vec<MenuItem> {
    menu_items()
        .into_iter()
        .filter(|item| state.has_permission(policy, item.required_role))
        .collect()
}
