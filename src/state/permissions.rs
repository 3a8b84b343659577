//! Role comparison for views and actions.
//!
//! DESIGN
//! ======
//! Whether a higher role implies a lower one is deployment policy, so the
//! check is a [`RolePolicy`] value rather than a hard-coded rule.

#[cfg(test)]
#[path = "permissions_test.rs"]
mod permissions_test;

/// Requirement satisfied by any authenticated user.
pub const ANY_ROLE: &str = "*";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RolePolicy {
    /// A requirement is met only by holding that exact role.
    #[default]
    Exact,
    /// Roles ordered highest first; a role meets every requirement at or
    /// below its rank.
    Ranked(Vec<String>),
}

impl RolePolicy {
    /// Parse `"ADMIN>USER"` into a ranking. Blank input means [`RolePolicy::Exact`].
    #[must_use]
    pub fn parse(hierarchy: &str) -> Self {
        let order: Vec<String> = hierarchy
            .split('>')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_owned)
            .collect();
        if order.is_empty() { Self::Exact } else { Self::Ranked(order) }
    }

    /// Whether `roles` satisfy `required`.
    #[must_use]
    pub fn permits(&self, roles: &[String], required: &str) -> bool {
        if required == ANY_ROLE || roles.iter().any(|r| r == required) {
            return true;
        }
        match self {
            Self::Exact => false,
            Self::Ranked(order) => {
                let rank = |role: &str| order.iter().position(|r| r == role);
                let Some(needed) = rank(required) else {
                    return false;
                };
                roles.iter().filter_map(|r| rank(r)).any(|held| held <= needed)
            }
        }
    }
}
