use crate::report::ComplianceReport;
use crate::violation::{ComplianceStandard, ComplianceViolation, ViolationSeverity};
use lazy_static::lazy_static;
use parking_lot::RwLock;
use regex::Regex;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Saudi VAT registration numbers: 15 digits, starting with 3, ending 03.
const SAUDI_VAT_PATTERN: &str = r"^3\d{12}03$";

/// Versioned ciphertext envelope produced by the platform's field
/// encryption. A value matching this shape is encrypted at rest.
const ENVELOPE_PATTERN: &str = r"^v\d+:[A-Za-z0-9+/]+={0,2}:[A-Za-z0-9+/]+={0,2}$";

lazy_static! {
    static ref SAUDI_VAT_RE: Regex = Regex::new(SAUDI_VAT_PATTERN).expect("valid VAT regex");
    static ref ENVELOPE_RE: Regex = Regex::new(ENVELOPE_PATTERN).expect("valid envelope regex");
}

/// ZATCA Phase 2 standard VAT rate.
pub const ZATCA_VAT_RATE: f64 = 0.15;

/// Tolerance for VAT amount comparison after rounding to halalas.
pub const VAT_TOLERANCE: f64 = 0.01;

/// Health-sector OID namespace required on NPHIES patient identifiers.
pub const NPHIES_OID_URN: &str = "urn:oid:1.3.6.1.4.1.61026";

const ZATCA_REQUIRED_FIELDS: &[&str] = &[
    "invoice_number",
    "issue_date",
    "issue_time",
    "supplier_vat_number",
    "customer_name",
    "line_items",
    "total_excluding_vat",
    "vat_amount",
    "total_including_vat",
];

const PDPL_PII_FIELDS: &[&str] = &[
    "national_id",
    "iqama_id",
    "passport_number",
    "phone",
    "email",
    "address",
    "birth_date",
];

const HIPAA_PHI_FIELDS: &[&str] = &[
    "patient_id",
    "medical_record_number",
    "diagnosis",
    "treatment",
    "prescription",
    "lab_results",
];

const NPHIES_REQUIRED_FIELDS: &[&str] = &[
    "claim_id",
    "patient_id",
    "provider_id",
    "service_date",
    "diagnosis_code",
    "service_code",
];

/// Data types whose collection requires documented consent under PDPL.
const CONSENT_DATA_TYPES: &[&str] = &["customer", "outlet", "employee"];

/// True when a value carries the platform's ciphertext envelope.
pub fn is_encrypted_envelope(value: &str) -> bool {
    ENVELOPE_RE.is_match(value)
}

fn round_halalas(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn present(data: &Value, field: &str) -> bool {
    !matches!(data.get(field), None | Some(Value::Null))
}

/// Absent, null, empty strings and empty collections all count as missing.
fn truthy(data: &Value, field: &str) -> bool {
    match data.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(_)) => true,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Multi-standard compliance validator.
///
/// The `validate_*` methods are pure: they return the violations they find
/// without touching shared state. Callers that want findings reflected in
/// [`get_compliance_report`](Self::get_compliance_report) pass them to
/// [`record`](Self::record) explicitly.
#[derive(Default)]
pub struct ComplianceValidator {
    violations: RwLock<Vec<ComplianceViolation>>,
}

impl ComplianceValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate an invoice against ZATCA Phase 2 e-invoicing rules.
    pub fn validate_zatca_invoice(&self, invoice: &Value) -> Vec<ComplianceViolation> {
        let mut violations = Vec::new();

        for field in ZATCA_REQUIRED_FIELDS {
            if !present(invoice, field) {
                violations.push(
                    ComplianceViolation::new(
                        ComplianceStandard::Zatca,
                        ViolationSeverity::Critical,
                        format!("Required field missing: {field}"),
                    )
                    .with_field(*field),
                );
            }
        }

        if let Some(vat_number) = invoice.get("supplier_vat_number").filter(|v| !v.is_null()) {
            if !SAUDI_VAT_RE.is_match(&stringify(vat_number)) {
                violations.push(
                    ComplianceViolation::new(
                        ComplianceStandard::Zatca,
                        ViolationSeverity::Critical,
                        "Invalid Saudi VAT number format. Must be 15 digits starting with 3 and ending with 03",
                    )
                    .with_field("supplier_vat_number"),
                );
            }
        }

        let amounts = (
            invoice.get("total_excluding_vat").and_then(Value::as_f64),
            invoice.get("vat_amount").and_then(Value::as_f64),
            invoice.get("total_including_vat").and_then(Value::as_f64),
        );
        if let (Some(total_excluding), Some(vat_amount), Some(_)) = amounts {
            let expected = round_halalas(total_excluding * ZATCA_VAT_RATE);
            let actual = round_halalas(vat_amount);
            if (expected - actual).abs() > VAT_TOLERANCE {
                violations.push(
                    ComplianceViolation::new(
                        ComplianceStandard::Zatca,
                        ViolationSeverity::High,
                        format!("VAT calculation incorrect. Expected {expected}, got {actual}"),
                    )
                    .with_field("vat_amount")
                    .with_detail("expected", json!(expected))
                    .with_detail("actual", json!(actual)),
                );
            }
        }

        if let Some(items) = invoice.get("line_items").and_then(Value::as_array) {
            for (idx, item) in items.iter().enumerate() {
                if !truthy(item, "description") {
                    violations.push(
                        ComplianceViolation::new(
                            ComplianceStandard::Zatca,
                            ViolationSeverity::Medium,
                            format!("Line item {} missing description", idx + 1),
                        )
                        .with_field(format!("line_items[{idx}].description")),
                    );
                }
            }
        }

        violations
    }

    /// Validate a record against the Saudi Personal Data Protection Law.
    ///
    /// PII must carry the ciphertext envelope, and records about people
    /// (`customer`, `outlet`, `employee`) must document collection consent.
    pub fn validate_pdpl_data(&self, data: &Value, data_type: &str) -> Vec<ComplianceViolation> {
        let mut violations = Vec::new();

        for field in PDPL_PII_FIELDS {
            if truthy(data, field) {
                let value = stringify(&data[*field]);
                if !is_encrypted_envelope(&value) {
                    violations.push(
                        ComplianceViolation::new(
                            ComplianceStandard::Pdpl,
                            ViolationSeverity::Critical,
                            format!("PII field \"{field}\" must be encrypted at rest"),
                        )
                        .with_field(*field),
                    );
                }
            }
        }

        if CONSENT_DATA_TYPES.contains(&data_type) && !truthy(data, "consent_date") {
            violations.push(
                ComplianceViolation::new(
                    ComplianceStandard::Pdpl,
                    ViolationSeverity::High,
                    "Data collection consent not documented",
                )
                .with_field("consent_date"),
            );
        }

        violations
    }

    /// Validate protected health information for HIPAA encryption-at-rest.
    pub fn validate_hipaa_phi(&self, phi_data: &Value) -> Vec<ComplianceViolation> {
        let mut violations = Vec::new();

        for field in HIPAA_PHI_FIELDS {
            if truthy(phi_data, field) {
                let value = stringify(&phi_data[*field]);
                if !is_encrypted_envelope(&value) {
                    violations.push(
                        ComplianceViolation::new(
                            ComplianceStandard::Hipaa,
                            ViolationSeverity::Critical,
                            format!("PHI field \"{field}\" must be encrypted"),
                        )
                        .with_field(*field),
                    );
                }
            }
        }

        violations
    }

    /// Validate an insurance claim against NPHIES identifier requirements.
    pub fn validate_nphies_claim(&self, claim: &Value) -> Vec<ComplianceViolation> {
        let mut violations = Vec::new();

        for field in NPHIES_REQUIRED_FIELDS {
            if !truthy(claim, field) {
                violations.push(
                    ComplianceViolation::new(
                        ComplianceStandard::Nphies,
                        ViolationSeverity::Critical,
                        format!("Required NPHIES field missing: {field}"),
                    )
                    .with_field(*field),
                );
            }
        }

        if let Some(patient_id) = claim.get("patient_id").filter(|v| !v.is_null()) {
            if !stringify(patient_id).starts_with(NPHIES_OID_URN) {
                violations.push(
                    ComplianceViolation::new(
                        ComplianceStandard::Nphies,
                        ViolationSeverity::High,
                        format!("Patient ID must use the {NPHIES_OID_URN} namespace"),
                    )
                    .with_field("patient_id"),
                );
            }
        }

        violations
    }

    /// Run several standards over one record, keyed by standard.
    ///
    /// PDPL takes the data type from the record's `type` field, defaulting
    /// to `unknown` (which exempts it from the consent rule).
    pub fn validate_all(
        &self,
        data: &Value,
        standards: &[ComplianceStandard],
    ) -> BTreeMap<ComplianceStandard, Vec<ComplianceViolation>> {
        let mut results = BTreeMap::new();
        for standard in standards {
            let violations = match standard {
                ComplianceStandard::Zatca => self.validate_zatca_invoice(data),
                ComplianceStandard::Pdpl => {
                    let data_type = data
                        .get("type")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown");
                    self.validate_pdpl_data(data, data_type)
                }
                ComplianceStandard::Hipaa => self.validate_hipaa_phi(data),
                ComplianceStandard::Nphies => self.validate_nphies_claim(data),
            };
            results.insert(*standard, violations);
        }
        results
    }

    /// Add findings to the validator's running tally. Validation never
    /// records implicitly; the caller decides what counts.
    pub fn record(&self, violations: Vec<ComplianceViolation>) {
        if violations.is_empty() {
            return;
        }
        debug!(count = violations.len(), "recording compliance violations");
        self.violations.write().extend(violations);
    }

    /// Snapshot of everything recorded so far.
    pub fn violations(&self) -> Vec<ComplianceViolation> {
        self.violations.read().clone()
    }

    /// Summarize the recorded violations.
    pub fn get_compliance_report(&self) -> ComplianceReport {
        ComplianceReport::from_violations(&self.violations.read())
    }
}
