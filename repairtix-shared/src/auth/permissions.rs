/// Role-based access control
///
/// Authorization in RepairTix is a capability check over a static
/// role→permission mapping. Permissions are strings of the form
/// `resource:action` (e.g. `tickets:write`); grants may use wildcards
/// (`*` for everything, `tickets:*` for every action on a resource).
///
/// # Roles
///
/// - **owner**: full control, including billing and integrations
/// - **manager**: runs a shop — everything except billing and company
///   deletion
/// - **technician**: works tickets and inventory
/// - **front_desk**: customer intake — customers, assets, tickets,
///   invoices, payments
///
/// # Example
///
/// ```
/// use repairtix_shared::auth::permissions::UserRole;
///
/// assert!(UserRole::Owner.has_permission("billing:manage"));
/// assert!(UserRole::Technician.has_permission("tickets:write"));
/// assert!(!UserRole::FrontDesk.has_permission("users:manage"));
/// ```

use serde::{Deserialize, Serialize};

/// User role within a company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full control: billing, integrations, delete company
    Owner,

    /// Manages users, locations, catalog, purchase orders
    Manager,

    /// Works tickets, adjusts inventory
    Technician,

    /// Customer intake: customers, assets, tickets, invoices, payments
    FrontDesk,
}

/// Grants for each role. `*` matches everything; `resource:*` matches
/// every action on that resource.
const OWNER_GRANTS: &[&str] = &["*"];

const MANAGER_GRANTS: &[&str] = &[
    "company:read",
    "company:manage",
    "locations:*",
    "users:*",
    "customers:*",
    "assets:*",
    "tickets:*",
    "catalog:*",
    "inventory:*",
    "purchase-orders:*",
    "invoices:*",
    "payments:*",
    "billing:read",
];

const TECHNICIAN_GRANTS: &[&str] = &[
    "company:read",
    "locations:read",
    "customers:read",
    "assets:read",
    "assets:write",
    "tickets:read",
    "tickets:write",
    "catalog:read",
    "inventory:read",
    "inventory:write",
    "purchase-orders:read",
    "invoices:read",
];

const FRONT_DESK_GRANTS: &[&str] = &[
    "company:read",
    "locations:read",
    "customers:read",
    "customers:write",
    "assets:read",
    "assets:write",
    "tickets:read",
    "tickets:write",
    "catalog:read",
    "inventory:read",
    "invoices:read",
    "invoices:write",
    "payments:read",
    "payments:write",
];

impl UserRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Owner => "owner",
            UserRole::Manager => "manager",
            UserRole::Technician => "technician",
            UserRole::FrontDesk => "front_desk",
        }
    }

    /// Parses role from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(UserRole::Owner),
            "manager" => Some(UserRole::Manager),
            "technician" => Some(UserRole::Technician),
            "front_desk" => Some(UserRole::FrontDesk),
            _ => None,
        }
    }

    /// Returns the static grant list for this role
    pub fn grants(&self) -> &'static [&'static str] {
        match self {
            UserRole::Owner => OWNER_GRANTS,
            UserRole::Manager => MANAGER_GRANTS,
            UserRole::Technician => TECHNICIAN_GRANTS,
            UserRole::FrontDesk => FRONT_DESK_GRANTS,
        }
    }

    /// Checks whether this role holds a permission
    ///
    /// `required` must be a concrete `resource:action` string; grants may
    /// be wildcards.
    pub fn has_permission(&self, required: &str) -> bool {
        self.grants()
            .iter()
            .any(|grant| grant_matches(grant, required))
    }
}

/// Checks whether a single grant covers a required permission
fn grant_matches(grant: &str, required: &str) -> bool {
    if grant == "*" || grant == required {
        return true;
    }

    // "tickets:*" covers "tickets:read", "tickets:write", ...
    if let Some(resource) = grant.strip_suffix(":*") {
        if let Some((required_resource, _)) = required.split_once(':') {
            return resource == required_resource;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [
            UserRole::Owner,
            UserRole::Manager,
            UserRole::Technician,
            UserRole::FrontDesk,
        ] {
            assert_eq!(UserRole::from_str(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::from_str("janitor"), None);
    }

    #[test]
    fn test_grant_matches() {
        assert!(grant_matches("*", "anything:at-all"));
        assert!(grant_matches("tickets:read", "tickets:read"));
        assert!(grant_matches("tickets:*", "tickets:read"));
        assert!(grant_matches("tickets:*", "tickets:write"));
        assert!(!grant_matches("tickets:*", "invoices:read"));
        assert!(!grant_matches("tickets:read", "tickets:write"));
    }

    #[test]
    fn test_owner_has_everything() {
        for permission in [
            "billing:manage",
            "integrations:manage",
            "users:manage",
            "tickets:write",
            "company:delete",
        ] {
            assert!(
                UserRole::Owner.has_permission(permission),
                "owner should hold {}",
                permission
            );
        }
    }

    #[test]
    fn test_manager_boundaries() {
        assert!(UserRole::Manager.has_permission("users:manage"));
        assert!(UserRole::Manager.has_permission("purchase-orders:write"));
        assert!(UserRole::Manager.has_permission("billing:read"));
        assert!(!UserRole::Manager.has_permission("billing:manage"));
        assert!(!UserRole::Manager.has_permission("integrations:manage"));
    }

    #[test]
    fn test_technician_boundaries() {
        assert!(UserRole::Technician.has_permission("tickets:write"));
        assert!(UserRole::Technician.has_permission("inventory:write"));
        assert!(!UserRole::Technician.has_permission("customers:write"));
        assert!(!UserRole::Technician.has_permission("users:manage"));
        assert!(!UserRole::Technician.has_permission("payments:write"));
    }

    #[test]
    fn test_front_desk_boundaries() {
        assert!(UserRole::FrontDesk.has_permission("customers:write"));
        assert!(UserRole::FrontDesk.has_permission("payments:write"));
        assert!(!UserRole::FrontDesk.has_permission("inventory:write"));
        assert!(!UserRole::FrontDesk.has_permission("users:manage"));
        assert!(!UserRole::FrontDesk.has_permission("billing:manage"));
    }
}
