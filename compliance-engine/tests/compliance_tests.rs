use compliance_engine::{
    ComplianceStandard, ComplianceValidator, ViolationSeverity,
};
use serde_json::json;

#[test]
fn invoice_audit_end_to_end() {
    let validator = ComplianceValidator::new();

    let good = json!({
        "invoice_number": "INV-2026-1001",
        "issue_date": "2026-08-30",
        "issue_time": "09:00:00",
        "supplier_vat_number": "301234567890003",
        "customer_name": "Bateel Outlet Riyadh",
        "line_items": [
            {"description": "Kunafa tray", "quantity": 4},
            {"description": "Baklava box", "quantity": 12}
        ],
        "total_excluding_vat": 1000.0,
        "vat_amount": 150.0,
        "total_including_vat": 1150.0
    });
    validator.record(validator.validate_zatca_invoice(&good));
    assert!(validator.get_compliance_report().is_compliant);

    let mut bad = good.clone();
    bad["vat_amount"] = json!(100.0);
    let violations = validator.validate_zatca_invoice(&bad);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].details["expected"], json!(150.0));
    assert_eq!(violations[0].details["actual"], json!(100.0));
    validator.record(violations);

    let report = validator.get_compliance_report();
    assert!(!report.is_compliant);
    assert_eq!(report.total_violations, 1);
    assert_eq!(report.by_standard[&ComplianceStandard::Zatca], 1);
    assert_eq!(report.by_severity[&ViolationSeverity::High], 1);
    assert_eq!(report.critical_violations, 0);
}

#[test]
fn validate_all_dispatches_per_standard() {
    let validator = ComplianceValidator::new();

    // A customer record with plaintext PII and no consent documentation.
    let record = json!({
        "type": "customer",
        "phone": "+966501234567",
        "email": "v3:bm9uY2Vub25jZQ==:Y2lwaGVydGV4dA=="
    });

    let results = validator.validate_all(
        &record,
        &[ComplianceStandard::Pdpl, ComplianceStandard::Hipaa],
    );
    assert_eq!(results.len(), 2);

    let pdpl = &results[&ComplianceStandard::Pdpl];
    assert_eq!(pdpl.len(), 2);
    assert!(pdpl.iter().any(|v| v.field.as_deref() == Some("phone")));
    assert!(pdpl.iter().any(|v| v.field.as_deref() == Some("consent_date")));

    // No PHI fields present at all.
    assert!(results[&ComplianceStandard::Hipaa].is_empty());
}

#[test]
fn report_severity_table_is_always_complete() {
    let validator = ComplianceValidator::new();
    validator.record(validator.validate_nphies_claim(&json!({
        "claim_id": "clm-7",
        "patient_id": "patient-7",
        "provider_id": "prv-1",
        "service_date": "2026-08-20",
        "diagnosis_code": "J06.9",
        "service_code": "99212"
    })));

    let report = validator.get_compliance_report();
    assert_eq!(report.total_violations, 1);
    for severity in ViolationSeverity::ALL {
        assert!(report.by_severity.contains_key(&severity));
    }
    assert_eq!(report.by_severity[&ViolationSeverity::High], 1);
    assert_eq!(report.by_severity[&ViolationSeverity::Critical], 0);
}
