use crate::entry::{AuditAction, AuditEvent, AuditLog, ResourceType, Severity};
use crate::error::Result;
use crate::sink::AuditSink;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// HIPAA/PDPL retention requirement.
pub const DEFAULT_RETENTION_YEARS: i64 = 7;

/// Default result cap for [`AuditLogger::get_logs`].
pub const DEFAULT_QUERY_LIMIT: usize = 100;

/// Hard cap for [`AuditLogger::export_logs`].
pub const EXPORT_CAP: usize = 10_000;

const CSV_HEADER: &str = "id,timestamp,user_id,action,resource_type,resource_id,severity";

/// Query filters for the audit trail. All supplied predicates are ANDed.
#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    pub user_id: Option<String>,
    pub resource_type: Option<ResourceType>,
    pub resource_id: Option<String>,
    pub action: Option<AuditAction>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    /// Result cap; defaults to [`DEFAULT_QUERY_LIMIT`] when unset.
    pub limit: Option<usize>,
}

impl LogQuery {
    fn matches(&self, log: &AuditLog) -> bool {
        if let Some(ref user_id) = self.user_id {
            if log.user_id != *user_id {
                return false;
            }
        }
        if let Some(resource_type) = self.resource_type {
            if log.resource_type != resource_type {
                return false;
            }
        }
        if let Some(ref resource_id) = self.resource_id {
            if log.resource_id != *resource_id {
                return false;
            }
        }
        if let Some(action) = self.action {
            if log.action != action {
                return false;
            }
        }
        if let Some(from) = self.from_date {
            if log.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.to_date {
            if log.timestamp > to {
                return false;
            }
        }
        true
    }
}

/// Export formats for compliance reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

/// Main audit logging service.
///
/// Holds the append-only in-process trail behind a lock so concurrent
/// `log()` calls never interleave into a corrupted entry, and forwards
/// every record to the durable [`AuditSink`]. Construct one instance per
/// process and share it behind an `Arc`.
pub struct AuditLogger {
    store: RwLock<Vec<AuditLog>>,
    sink: Arc<dyn AuditSink>,
    retention_years: i64,
}

impl AuditLogger {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self {
            store: RwLock::new(Vec::new()),
            sink,
            retention_years: DEFAULT_RETENTION_YEARS,
        }
    }

    pub fn with_retention_years(mut self, years: i64) -> Self {
        self.retention_years = years;
        self
    }

    /// Record one security-relevant event.
    ///
    /// The entry is always retained in the in-process trail; a sink failure
    /// surfaces as [`crate::AuditError::Persistence`] so the caller knows
    /// durability was not achieved, but the record itself is not dropped.
    pub async fn log(&self, event: AuditEvent) -> Result<AuditLog> {
        let entry = AuditLog::new(event);
        self.store.write().push(entry.clone());

        if let Err(err) = self.sink.append(&entry).await {
            warn!(
                id = %entry.id,
                error = %err,
                "audit record retained in memory but durable append failed"
            );
            return Err(err);
        }

        debug!(
            id = %entry.id,
            action = %entry.action,
            resource_type = %entry.resource_type,
            "audit record persisted"
        );
        Ok(entry)
    }

    /// Log data access with field-level tracking.
    pub async fn log_data_access(
        &self,
        user_id: &str,
        resource_type: ResourceType,
        resource_id: &str,
        fields_accessed: &[&str],
        ip_address: Option<&str>,
    ) -> Result<AuditLog> {
        let mut event = AuditEvent::new(user_id, AuditAction::Read, resource_type, resource_id)
            .with_detail("fields_accessed", json!(fields_accessed));
        if let Some(ip) = ip_address {
            event = event.with_ip(ip);
        }
        self.log(event).await
    }

    /// Log modifications to data; destructive actions escalate to warning.
    pub async fn log_modification(
        &self,
        user_id: &str,
        action: AuditAction,
        resource_type: ResourceType,
        resource_id: &str,
        changes: Option<Map<String, Value>>,
        ip_address: Option<&str>,
    ) -> Result<AuditLog> {
        let severity = if action.is_destructive() {
            Severity::Warning
        } else {
            Severity::Info
        };
        let mut event = AuditEvent::new(user_id, action, resource_type, resource_id)
            .with_severity(severity);
        if let Some(changes) = changes {
            event = event.with_detail("changes", Value::Object(changes));
        }
        if let Some(ip) = ip_address {
            event = event.with_ip(ip);
        }
        self.log(event).await
    }

    /// Log security-related events such as rate-limit hits or lockouts.
    pub async fn log_security_event(
        &self,
        user_id: &str,
        event_type: &str,
        details: Option<Map<String, Value>>,
        severity: Severity,
    ) -> Result<AuditLog> {
        let mut merged = Map::new();
        merged.insert("event_type".to_string(), json!(event_type));
        if let Some(details) = details {
            merged.extend(details);
        }

        self.log(
            AuditEvent::new(
                user_id,
                AuditAction::AccessDenied,
                ResourceType::System,
                "security_event",
            )
            .with_details(merged)
            .with_severity(severity),
        )
        .await
    }

    /// Query the trail. Returns matches sorted by timestamp descending,
    /// truncated to the query limit; the underlying store is untouched.
    pub fn get_logs(&self, query: &LogQuery) -> Vec<AuditLog> {
        let store = self.store.read();
        let mut matched: Vec<AuditLog> = store
            .iter()
            .filter(|log| query.matches(log))
            .cloned()
            .collect();
        drop(store);

        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matched.truncate(query.limit.unwrap_or(DEFAULT_QUERY_LIMIT));
        matched
    }

    /// Export the trail for compliance reporting, capped at [`EXPORT_CAP`]
    /// records.
    pub fn export_logs(
        &self,
        from_date: Option<DateTime<Utc>>,
        to_date: Option<DateTime<Utc>>,
        format: ExportFormat,
    ) -> Result<String> {
        let query = LogQuery {
            from_date,
            to_date,
            limit: Some(EXPORT_CAP),
            ..LogQuery::default()
        };
        let logs = self.get_logs(&query);

        match format {
            ExportFormat::Json => Ok(serde_json::to_string_pretty(&logs)?),
            ExportFormat::Csv => {
                let mut out = String::from(CSV_HEADER);
                for log in &logs {
                    out.push('\n');
                    out.push_str(&csv_row(log));
                }
                Ok(out)
            }
        }
    }

    /// Verify a single entry; false for unknown ids and checksum mismatches.
    pub fn verify_log_integrity(&self, log_id: Uuid) -> bool {
        let store = self.store.read();
        match store.iter().find(|log| log.id == log_id) {
            None => {
                warn!(id = %log_id, "integrity check requested for unknown audit log");
                false
            }
            Some(log) => {
                let intact = log.verify_integrity();
                if !intact {
                    // Checksum mismatch means the record was altered after
                    // creation; escalate rather than absorb silently.
                    warn!(id = %log_id, "audit log failed integrity verification");
                }
                intact
            }
        }
    }

    /// Purge entries older than the retention period. Returns the number of
    /// records removed.
    pub fn cleanup_old_logs(&self) -> usize {
        let cutoff = Utc::now() - Duration::days(self.retention_years * 365);
        let mut store = self.store.write();
        let before = store.len();
        store.retain(|log| log.timestamp >= cutoff);
        let removed = before - store.len();
        drop(store);

        if removed > 0 {
            info!(removed, "retention sweep purged expired audit logs");
        }
        removed
    }

    /// Reload previously persisted records, e.g. on process restart.
    pub fn restore(&self, entries: Vec<AuditLog>) {
        self.store.write().extend(entries);
    }

    /// Number of records currently held in the in-process trail.
    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn csv_row(log: &AuditLog) -> String {
    format!(
        "{},{},{},{},{},{},{}",
        log.id,
        log.timestamp.to_rfc3339(),
        csv_escape(&log.user_id),
        log.action,
        log.resource_type,
        csv_escape(&log.resource_id),
        log.severity
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    fn logger() -> AuditLogger {
        AuditLogger::new(Arc::new(MemorySink::new()))
    }

    async fn seed(logger: &AuditLogger) {
        logger
            .log(AuditEvent::new(
                "alice",
                AuditAction::Read,
                ResourceType::Outlet,
                "outlet-1",
            ))
            .await
            .unwrap();
        logger
            .log(AuditEvent::new(
                "bob",
                AuditAction::Create,
                ResourceType::Order,
                "order-1",
            ))
            .await
            .unwrap();
        logger
            .log(AuditEvent::new(
                "alice",
                AuditAction::Update,
                ResourceType::Order,
                "order-1",
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn get_logs_applies_all_filters() {
        let logger = logger();
        seed(&logger).await;

        let by_user = logger.get_logs(&LogQuery {
            user_id: Some("alice".to_string()),
            ..LogQuery::default()
        });
        assert_eq!(by_user.len(), 2);
        assert!(by_user.iter().all(|log| log.user_id == "alice"));

        let by_user_and_resource = logger.get_logs(&LogQuery {
            user_id: Some("alice".to_string()),
            resource_type: Some(ResourceType::Order),
            ..LogQuery::default()
        });
        assert_eq!(by_user_and_resource.len(), 1);
        assert_eq!(by_user_and_resource[0].action, AuditAction::Update);

        let none = logger.get_logs(&LogQuery {
            user_id: Some("mallory".to_string()),
            ..LogQuery::default()
        });
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn get_logs_sorts_descending_and_respects_limit() {
        let logger = logger();
        seed(&logger).await;

        let all = logger.get_logs(&LogQuery::default());
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

        let limited = logger.get_logs(&LogQuery {
            limit: Some(2),
            ..LogQuery::default()
        });
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].id, all[0].id);

        // Query must not mutate the store
        assert_eq!(logger.len(), 3);
    }

    #[tokio::test]
    async fn date_filters_bound_the_result() {
        let logger = logger();
        seed(&logger).await;

        let future = logger.get_logs(&LogQuery {
            from_date: Some(Utc::now() + Duration::hours(1)),
            ..LogQuery::default()
        });
        assert!(future.is_empty());

        let past = logger.get_logs(&LogQuery {
            to_date: Some(Utc::now() - Duration::hours(1)),
            ..LogQuery::default()
        });
        assert!(past.is_empty());

        let window = logger.get_logs(&LogQuery {
            from_date: Some(Utc::now() - Duration::hours(1)),
            to_date: Some(Utc::now() + Duration::hours(1)),
            ..LogQuery::default()
        });
        assert_eq!(window.len(), 3);
    }

    #[tokio::test]
    async fn cleanup_removes_exactly_the_expired_entries() {
        let logger = logger();
        seed(&logger).await;

        // Age one record past the retention horizon. The timestamp rewrite
        // deliberately breaks that record's checksum; the sweep only looks
        // at timestamps.
        let mut expired = AuditLog::new(AuditEvent::new(
            "charlie",
            AuditAction::Login,
            ResourceType::User,
            "charlie",
        ));
        expired.timestamp = Utc::now() - Duration::days(DEFAULT_RETENTION_YEARS * 365 + 30);
        let expired_id = expired.id;
        logger.restore(vec![expired]);
        assert_eq!(logger.len(), 4);

        let removed = logger.cleanup_old_logs();
        assert_eq!(removed, 1);
        assert_eq!(logger.len(), 3);
        assert!(logger
            .get_logs(&LogQuery::default())
            .iter()
            .all(|log| log.id != expired_id));

        // Idempotent once expired entries are gone
        assert_eq!(logger.cleanup_old_logs(), 0);
    }

    #[tokio::test]
    async fn verify_log_integrity_handles_unknown_ids() {
        let logger = logger();
        let entry = logger
            .log(AuditEvent::new(
                "alice",
                AuditAction::Read,
                ResourceType::Phi,
                "rec-1",
            ))
            .await
            .unwrap();

        assert!(logger.verify_log_integrity(entry.id));
        assert!(!logger.verify_log_integrity(Uuid::new_v4()));
    }

    #[tokio::test]
    async fn log_modification_escalates_destructive_actions() {
        let logger = logger();

        let deleted = logger
            .log_modification(
                "admin",
                AuditAction::Delete,
                ResourceType::Product,
                "sku-9",
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(deleted.severity, Severity::Warning);

        let updated = logger
            .log_modification(
                "admin",
                AuditAction::Update,
                ResourceType::Product,
                "sku-9",
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(updated.severity, Severity::Info);
    }

    #[tokio::test]
    async fn log_security_event_merges_event_type_into_details() {
        let logger = logger();

        let mut details = Map::new();
        details.insert("attempts".to_string(), json!(5));
        let entry = logger
            .log_security_event("anonymous", "rate_limit_exceeded", Some(details), Severity::Warning)
            .await
            .unwrap();

        assert_eq!(entry.action, AuditAction::AccessDenied);
        assert_eq!(entry.resource_type, ResourceType::System);
        assert_eq!(entry.details["event_type"], "rate_limit_exceeded");
        assert_eq!(entry.details["attempts"], 5);
    }

    #[tokio::test]
    async fn csv_export_escapes_embedded_delimiters() {
        let logger = logger();
        logger
            .log(AuditEvent::new(
                "o'neill, jack",
                AuditAction::Read,
                ResourceType::Report,
                "monthly \"sales\"",
            ))
            .await
            .unwrap();

        let csv = logger.export_logs(None, None, ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].contains("\"o'neill, jack\""));
        assert!(lines[1].contains("\"monthly \"\"sales\"\"\""));
    }

    #[tokio::test]
    async fn json_export_roundtrips() {
        let logger = logger();
        seed(&logger).await;

        let json = logger.export_logs(None, None, ExportFormat::Json).unwrap();
        let parsed: Vec<AuditLog> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 3);
        assert!(parsed.iter().all(AuditLog::verify_integrity));
    }
}
