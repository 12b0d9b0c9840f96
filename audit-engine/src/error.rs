use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    /// An audit record that exists only in process memory breaks the
    /// 7-year retention guarantee; this is the one hard-error path in the
    /// trust core.
    #[error("audit persistence failed: {0}")]
    Persistence(String),

    #[error("audit serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AuditError>;
