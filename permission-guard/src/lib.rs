//! Role-based access control for SSDP services.
//!
//! A [`PermissionGuard`] evaluates `action:resource` permissions against a
//! [`RoleTable`] and writes every decision to the shared audit trail, so the
//! access log and the policy can never drift apart. Handlers call
//! [`PermissionGuard::authorize`] up front and bubble the error; lower-level
//! code that needs the boolean calls [`PermissionGuard::check_access`].

pub mod error;
pub mod guard;
pub mod roles;

pub use error::{GuardError, Result};
pub use guard::{map_audit_action, Caller, PermissionGuard};
pub use roles::{RoleTable, ADMIN_ROLES, SELF_SERVICE_ROLES};
