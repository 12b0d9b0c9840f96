//! Regulatory compliance validation for SSDP services.
//!
//! Validates records against the standards the platform operates under:
//! ZATCA Phase 2 e-invoicing, the Saudi Personal Data Protection Law,
//! HIPAA for health-sector integrations and NPHIES claim exchange.
//! Validation is pure and infallible; a record either yields violations or
//! it does not. Findings the caller wants tracked are passed to
//! [`ComplianceValidator::record`] and summarized by
//! [`ComplianceValidator::get_compliance_report`].

pub mod report;
pub mod validator;
pub mod violation;

pub use report::ComplianceReport;
pub use validator::{
    is_encrypted_envelope, ComplianceValidator, NPHIES_OID_URN, VAT_TOLERANCE, ZATCA_VAT_RATE,
};
pub use violation::{ComplianceStandard, ComplianceViolation, ViolationSeverity};
