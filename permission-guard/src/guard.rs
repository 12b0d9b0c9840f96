use crate::error::{GuardError, Result};
use crate::roles::{RoleTable, ADMIN_ROLES, SELF_SERVICE_ROLES};
use audit_engine::{AuditAction, AuditEvent, AuditLogger, ResourceType, Severity};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// The authenticated identity a request acts as. The web layer fills this
/// from its session; request metadata flows through to the audit trail.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: String,
    pub role: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: role.into(),
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn with_ip(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// RBAC policy evaluator. Every access decision, granted or denied, is
/// written to the audit trail.
pub struct PermissionGuard {
    roles: RoleTable,
    audit: Arc<AuditLogger>,
}

impl PermissionGuard {
    /// Guard over the platform's built-in role matrix.
    pub fn new(audit: Arc<AuditLogger>) -> Self {
        Self::with_roles(audit, RoleTable::ssdp_defaults())
    }

    /// Guard over a custom role matrix, e.g. for tenant-specific roles.
    pub fn with_roles(audit: Arc<AuditLogger>, roles: RoleTable) -> Self {
        Self { roles, audit }
    }

    /// Pure policy lookup. Does not touch the audit trail; use
    /// [`check_access`](Self::check_access) on request paths.
    pub fn has_permission(&self, role: &str, permission: &str) -> bool {
        self.roles.allows(role, permission)
    }

    /// Evaluate an action against a resource type and record the decision.
    ///
    /// The permission string is composed here as `action:resource_type`, so
    /// the `permission_requested` detail and the entry's `resource_type` can
    /// never disagree. Exactly one audit entry is written per call. A denial
    /// is an ordinary `Ok(false)`; `Err` means the decision could not be
    /// recorded.
    pub async fn check_access(
        &self,
        caller: &Caller,
        action: &str,
        resource_type: ResourceType,
        resource_id: &str,
    ) -> Result<bool> {
        let permission = format!("{action}:{resource_type}");
        let granted = self.has_permission(&caller.role, &permission);

        let (audit_action, severity) = if granted {
            (map_audit_action(action), Severity::Info)
        } else {
            (AuditAction::AccessDenied, Severity::Warning)
        };

        let mut event = AuditEvent::new(&caller.user_id, audit_action, resource_type, resource_id)
            .with_detail("user_role", json!(caller.role))
            .with_detail("permission_requested", json!(permission))
            .with_detail("access_granted", json!(granted))
            .with_severity(severity);
        if let Some(ref ip) = caller.ip_address {
            event = event.with_ip(ip.clone());
        }
        if let Some(ref agent) = caller.user_agent {
            event = event.with_user_agent(agent.clone());
        }
        self.audit.log(event).await?;

        if granted {
            debug!(
                user_id = %caller.user_id,
                role = %caller.role,
                permission,
                "access granted"
            );
        } else {
            warn!(
                user_id = %caller.user_id,
                role = %caller.role,
                permission,
                "access denied"
            );
        }
        Ok(granted)
    }

    /// Like [`check_access`](Self::check_access) but turns a denial into
    /// [`GuardError::AccessDenied`]. Intended as the request interceptor
    /// seam: call it before the handler body runs.
    pub async fn authorize(
        &self,
        caller: &Caller,
        action: &str,
        resource_type: ResourceType,
        resource_id: &str,
    ) -> Result<()> {
        if self
            .check_access(caller, action, resource_type, resource_id)
            .await?
        {
            Ok(())
        } else {
            Err(GuardError::AccessDenied {
                permission: format!("{action}:{resource_type}"),
            })
        }
    }

    /// Ownership policy layered on top of the role matrix.
    ///
    /// Admin roles own everything, self-service roles own exactly their own
    /// record, and internal staff roles are trusted for resources their
    /// permissions already reach.
    pub fn check_resource_ownership(
        &self,
        caller: &Caller,
        resource_owner_id: &str,
    ) -> bool {
        if ADMIN_ROLES.contains(&caller.role.as_str()) {
            return true;
        }
        if SELF_SERVICE_ROLES.contains(&caller.role.as_str()) {
            return caller.user_id == resource_owner_id;
        }
        true
    }

    /// Grant list for a role, for UIs and diagnostics.
    pub fn get_user_permissions(&self, role: &str) -> Vec<String> {
        self.roles.permissions_of(role).to_vec()
    }
}

/// Derive the audit action from a permission's action segment. Unrecognized
/// actions are treated as reads.
pub fn map_audit_action(permission: &str) -> AuditAction {
    let action = permission.split(':').next().unwrap_or(permission);
    match action {
        "create" => AuditAction::Create,
        "read" => AuditAction::Read,
        "update" => AuditAction::Update,
        "delete" => AuditAction::Delete,
        "approve" => AuditAction::Approve,
        "reject" => AuditAction::Reject,
        "export" => AuditAction::Export,
        _ => AuditAction::Read,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_mapping_defaults_to_read() {
        assert_eq!(map_audit_action("create:order"), AuditAction::Create);
        assert_eq!(map_audit_action("export:financial"), AuditAction::Export);
        assert_eq!(map_audit_action("frobnicate:order"), AuditAction::Read);
        assert_eq!(map_audit_action("read"), AuditAction::Read);
    }
}
