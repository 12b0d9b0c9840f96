use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Regulatory standards the validator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceStandard {
    /// Saudi e-invoicing (Fatoora Phase 2).
    Zatca,
    /// Saudi Personal Data Protection Law.
    Pdpl,
    /// US healthcare privacy rule, for health-sector integrations.
    Hipaa,
    /// Saudi national health insurance exchange.
    Nphies,
}

impl ComplianceStandard {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStandard::Zatca => "zatca",
            ComplianceStandard::Pdpl => "pdpl",
            ComplianceStandard::Hipaa => "hipaa",
            ComplianceStandard::Nphies => "nphies",
        }
    }
}

impl fmt::Display for ComplianceStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Violation severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ViolationSeverity {
    pub const ALL: [ViolationSeverity; 4] = [
        ViolationSeverity::Low,
        ViolationSeverity::Medium,
        ViolationSeverity::High,
        ViolationSeverity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationSeverity::Low => "low",
            ViolationSeverity::Medium => "medium",
            ViolationSeverity::High => "high",
            ViolationSeverity::Critical => "critical",
        }
    }
}

impl fmt::Display for ViolationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One concrete failure of a regulatory rule, timestamped at detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceViolation {
    pub standard: ComplianceStandard,
    pub severity: ViolationSeverity,
    pub message: String,
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl ComplianceViolation {
    pub fn new(
        standard: ComplianceStandard,
        severity: ViolationSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            standard,
            severity,
            message: message.into(),
            field: None,
            details: Map::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}
