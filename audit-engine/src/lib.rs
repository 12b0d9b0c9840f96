//! Tamper-evident audit logging for SSDP services.
//!
//! Every security-relevant event becomes an [`AuditLog`] carrying a SHA-256
//! checksum over its identity fields, so post-hoc tampering is detectable
//! via [`AuditLogger::verify_log_integrity`]. Records are held in an
//! in-process trail for querying and forwarded to a pluggable [`AuditSink`]
//! for durability.
//!
//! ```no_run
//! use audit_engine::{AuditAction, AuditEvent, AuditLogger, ResourceType};
//! use audit_engine::sink::MemorySink;
//! use std::sync::Arc;
//!
//! # async fn example() -> audit_engine::Result<()> {
//! let logger = AuditLogger::new(Arc::new(MemorySink::new()));
//! let entry = logger
//!     .log(AuditEvent::new("user-1", AuditAction::Read, ResourceType::Outlet, "outlet-42"))
//!     .await?;
//! assert!(entry.verify_integrity());
//! # Ok(())
//! # }
//! ```

pub mod entry;
pub mod error;
pub mod logger;
pub mod sink;

pub use entry::{AuditAction, AuditEvent, AuditLog, ResourceType, Severity};
pub use error::{AuditError, Result};
pub use logger::{
    AuditLogger, ExportFormat, LogQuery, DEFAULT_QUERY_LIMIT, DEFAULT_RETENTION_YEARS, EXPORT_CAP,
};
pub use sink::{AuditSink, JsonlSink, MemorySink};
