use audit_engine::AuditError;
use thiserror::Error;

/// Errors surfaced by the permission guard.
#[derive(Error, Debug)]
pub enum GuardError {
    /// Raised only at the interceptor seam; an ordinary policy check
    /// reports a denial as `Ok(false)` instead.
    #[error("access denied: missing permission '{permission}'")]
    AccessDenied { permission: String },

    /// The mandatory audit write failed. A decision that cannot be
    /// recorded must not be treated as granted.
    #[error("audit trail error: {0}")]
    Audit(#[from] AuditError),
}

pub type Result<T> = std::result::Result<T, GuardError>;
