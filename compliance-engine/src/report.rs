use crate::violation::{ComplianceStandard, ComplianceViolation, ViolationSeverity};
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary of every violation the validator has recorded.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    pub total_violations: usize,
    /// Counts per standard; standards with no violations are omitted.
    pub by_standard: BTreeMap<ComplianceStandard, usize>,
    /// Counts per severity; every severity appears, zero or not.
    pub by_severity: BTreeMap<ViolationSeverity, usize>,
    pub critical_violations: usize,
    pub is_compliant: bool,
}

impl ComplianceReport {
    pub fn from_violations(violations: &[ComplianceViolation]) -> Self {
        let mut by_standard = BTreeMap::new();
        let mut by_severity: BTreeMap<ViolationSeverity, usize> =
            ViolationSeverity::ALL.iter().map(|s| (*s, 0)).collect();

        for violation in violations {
            *by_standard.entry(violation.standard).or_insert(0) += 1;
            *by_severity.entry(violation.severity).or_insert(0) += 1;
        }

        let critical_violations = by_severity
            .get(&ViolationSeverity::Critical)
            .copied()
            .unwrap_or(0);

        Self {
            total_violations: violations.len(),
            by_standard,
            by_severity,
            critical_violations,
            is_compliant: violations.is_empty(),
        }
    }
}
