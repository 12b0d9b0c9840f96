use std::collections::HashMap;

/// Roles whose holders may act on any resource regardless of ownership.
pub const ADMIN_ROLES: &[&str] = &["super_admin", "regional_manager"];

/// Roles restricted to resources they own.
pub const SELF_SERVICE_ROLES: &[&str] = &["outlet_owner"];

/// Maps role names to their granted permissions.
///
/// Permissions use the `action:resource` form; `*` grants everything and
/// `action:*` grants an action on every resource type.
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    grants: HashMap<String, Vec<String>>,
}

impl RoleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The platform's built-in role matrix.
    pub fn ssdp_defaults() -> Self {
        let mut table = Self::new();
        table.grant("super_admin", &["*"]);
        table.grant(
            "regional_manager",
            &[
                "read:outlet",
                "read:order",
                "read:sales_rep",
                "read:driver",
                "read:vehicle",
                "read:report",
                "read:invoice",
                "read:financial",
                "create:sales_rep",
                "update:sales_rep",
                "create:route",
                "update:route",
                "approve:order",
            ],
        );
        table.grant(
            "sales_rep",
            &[
                "read:outlet",
                "read:product",
                "read:order",
                "read:route",
                "read:sales_rep",
                "create:order",
                "create:outlet",
                "update:order",
            ],
        );
        table.grant(
            "driver",
            &["read:route", "read:order", "read:vehicle", "read:outlet", "update:order"],
        );
        table.grant(
            "finance_officer",
            &[
                "read:invoice",
                "read:payment",
                "read:order",
                "read:outlet",
                "read:financial",
                "read:report",
                "create:invoice",
                "create:payment",
                "update:invoice",
                "export:financial",
            ],
        );
        table.grant(
            "outlet_owner",
            &[
                "read:outlet",
                "read:order",
                "read:invoice",
                "read:payment",
                "read:product",
                "create:order",
            ],
        );
        table
    }

    /// Add or replace a role's grant list.
    pub fn grant(&mut self, role: impl Into<String>, permissions: &[&str]) {
        self.grants.insert(
            role.into(),
            permissions.iter().map(|p| p.to_string()).collect(),
        );
    }

    /// Permissions for a role; unknown roles hold nothing.
    pub fn permissions_of(&self, role: &str) -> &[String] {
        self.grants.get(role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Evaluate a single `action:resource` permission for a role.
    ///
    /// Matches in order: the exact permission, the global wildcard `*`,
    /// then the per-action wildcard `action:*`.
    pub fn allows(&self, role: &str, permission: &str) -> bool {
        let granted = self.permissions_of(role);
        if granted.iter().any(|p| p == permission) {
            return true;
        }
        if granted.iter().any(|p| p == "*") {
            return true;
        }
        if let Some((action, _)) = permission.split_once(':') {
            let action_wildcard = format!("{action}:*");
            if granted.iter().any(|p| *p == action_wildcard) {
                return true;
            }
        }
        false
    }
}
