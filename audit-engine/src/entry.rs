// Audit entry types and structures
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Audit action types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Read,
    Update,
    Delete,
    Login,
    Logout,
    AccessDenied,
    Export,
    Approve,
    Reject,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Read => "read",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::Login => "login",
            AuditAction::Logout => "logout",
            AuditAction::AccessDenied => "access_denied",
            AuditAction::Export => "export",
            AuditAction::Approve => "approve",
            AuditAction::Reject => "reject",
        }
    }

    /// Destructive actions escalate modification logs to warning severity.
    pub fn is_destructive(&self) -> bool {
        matches!(self, AuditAction::Delete)
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource types for audit logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    User,
    Outlet,
    Order,
    Invoice,
    Payment,
    SalesRep,
    Driver,
    Vehicle,
    Product,
    Route,
    Report,
    System,
    /// Protected Health Information (healthcare integration)
    Phi,
    Financial,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::User => "user",
            ResourceType::Outlet => "outlet",
            ResourceType::Order => "order",
            ResourceType::Invoice => "invoice",
            ResourceType::Payment => "payment",
            ResourceType::SalesRep => "sales_rep",
            ResourceType::Driver => "driver",
            ResourceType::Vehicle => "vehicle",
            ResourceType::Product => "product",
            ResourceType::Route => "route",
            ResourceType::Report => "report",
            ResourceType::System => "system",
            ResourceType::Phi => "phi",
            ResourceType::Financial => "financial",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for one audit record.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub user_id: String,
    pub action: AuditAction,
    pub resource_type: ResourceType,
    pub resource_id: String,
    pub details: Map<String, Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub severity: Severity,
}

impl AuditEvent {
    pub fn new(
        user_id: impl Into<String>,
        action: AuditAction,
        resource_type: ResourceType,
        resource_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            action,
            resource_type,
            resource_id: resource_id.into(),
            details: Map::new(),
            ip_address: None,
            user_agent: None,
            severity: Severity::Info,
        }
    }

    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = details;
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    pub fn with_ip(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// Individual audit log entry with a tamper-evident checksum.
///
/// The checksum is computed once at construction over the identity fields
/// and never recomputed in place; any later mutation of those fields breaks
/// [`verify_integrity`](Self::verify_integrity).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub action: AuditAction,
    pub resource_type: ResourceType,
    pub resource_id: String,
    pub details: Map<String, Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub severity: Severity,
    pub checksum: String,
}

impl AuditLog {
    pub fn new(event: AuditEvent) -> Self {
        let timestamp = Utc::now();
        let checksum = Self::checksum_of(
            &timestamp,
            &event.user_id,
            event.action,
            event.resource_type,
            &event.resource_id,
        );

        Self {
            id: Uuid::new_v4(),
            timestamp,
            user_id: event.user_id,
            action: event.action,
            resource_type: event.resource_type,
            resource_id: event.resource_id,
            details: event.details,
            ip_address: event.ip_address,
            user_agent: event.user_agent,
            severity: event.severity,
            checksum,
        }
    }

    fn checksum_of(
        timestamp: &DateTime<Utc>,
        user_id: &str,
        action: AuditAction,
        resource_type: ResourceType,
        resource_id: &str,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(timestamp.to_rfc3339().as_bytes());
        hasher.update(user_id.as_bytes());
        hasher.update(action.as_str().as_bytes());
        hasher.update(resource_type.as_str().as_bytes());
        hasher.update(resource_id.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Recompute the checksum and compare against the stored value.
    pub fn verify_integrity(&self) -> bool {
        self.checksum
            == Self::checksum_of(
                &self.timestamp,
                &self.user_id,
                self.action,
                self.resource_type,
                &self.resource_id,
            )
    }
}
