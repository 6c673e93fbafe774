//! Merge engine — reconciles the pre-fill record with the technician's
//! form input into the canonical submission record.
//!
//! Precedence: fields rendered read-only on the form (identity and legal
//! fields) always take the pre-fill value, no matter what the client
//! posted — a tampered payload cannot alter them. Everything else is
//! user-authoritative, with the pre-fill as fallback where one exists.
//! Required fields that end up blank fail with a `ValidationError` naming
//! the field; validation failure has no side effects.

use crate::error::ValidationError;
use crate::types::{PrefillRecord, SubmissionRecord, UserInput};

/// A required editable field: user value wins, pre-fill is the fallback,
/// blank is a rejection naming the form key.
fn required(
    user: &UserInput,
    key: &str,
    prefill_value: &str,
) -> Result<String, ValidationError> {
    user.text(key)
        .or_else(|| {
            let trimmed = prefill_value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .ok_or_else(|| ValidationError::missing(key))
}

/// A tester credential: locked to the pre-fill when it was successfully
/// derived upstream, otherwise required from the form.
fn credential(
    user: &UserInput,
    key: &str,
    prefill_value: &str,
) -> Result<String, ValidationError> {
    if !prefill_value.trim().is_empty() {
        return Ok(prefill_value.to_string());
    }
    user.text(key).ok_or_else(|| ValidationError::missing(key))
}

/// Merge pre-fill and user input into a submission record.
pub fn merge(
    prefill: &PrefillRecord,
    user: &UserInput,
) -> Result<SubmissionRecord, ValidationError> {
    let work_carried_out = user.list("work_carried_out");
    if work_carried_out.is_empty() {
        return Err(ValidationError::missing("work_carried_out"));
    }

    if !user.0.contains_key("certification_statement") {
        return Err(ValidationError::missing("certification_statement"));
    }
    if !user.flag("certification_statement") {
        return Err(ValidationError::InvalidField {
            field: "certification_statement".to_string(),
            reason: "the compliance statement must be affirmed".to_string(),
        });
    }

    Ok(SubmissionRecord {
        // Read-only: pre-fill always wins, user values for these keys are
        // ignored outright.
        certificate_serial: prefill.certificate_serial.clone(),
        property_name: prefill.property_name.clone(),
        customer_company: prefill.customer_company.clone(),
        installer_company: prefill.installer_company.clone(),
        installer_licence: prefill.installer_licence.clone(),
        installer_street: prefill.installer_street.clone(),
        installer_suburb: prefill.installer_suburb.clone(),
        installer_state: prefill.installer_state.clone(),
        installer_post_code: prefill.installer_post_code.clone(),
        installer_phone: prefill.installer_phone.clone(),
        tester_street: prefill.tester_street.clone(),
        tester_suburb: prefill.tester_suburb.clone(),
        tester_state: prefill.tester_state.clone(),
        tester_post_code: prefill.tester_post_code.clone(),

        // Site address.
        street_number: required(user, "street_number", "")?,
        street_name: required(user, "street_name", "")?,
        suburb: required(user, "suburb", "")?,
        state: required(user, "state", "")?,
        post_code: required(user, "post_code", "")?,
        nmi: required(user, "nmi", "")?,

        // Customer identity and address.
        customer_first_name: required(user, "customer_first_name", &prefill.customer_first_name)?,
        customer_last_name: required(user, "customer_last_name", &prefill.customer_last_name)?,
        customer_street: required(user, "customer_street", "")?,
        customer_suburb: required(user, "customer_suburb", "")?,
        customer_state: required(user, "customer_state", "")?,
        customer_post_code: required(user, "customer_post_code", "")?,

        installation_type: required(user, "installation_type", "")?,
        work_carried_out,
        special_conditions: user.list("special_conditions"),

        // Tester credentials: locked when derived upstream.
        tester_first_name: credential(user, "tester_first_name", &prefill.tester_first_name)?,
        tester_last_name: credential(user, "tester_last_name", &prefill.tester_last_name)?,
        tester_licence: credential(user, "license_number", &prefill.tester_licence)?,
        tester_licence_expiry: credential(user, "license_expiry", &prefill.tester_licence_expiry)?,

        test_date: required(user, "test_date", "")?,
        energy_provider: required(user, "energy_provider", "")?,
        certification_statement: true,

        meter_provider_email: user.text("meter_provider_email"),
        owner_email: user.text("owner_email"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn prefill() -> PrefillRecord {
        PrefillRecord {
            certificate_serial: "JOB-42".to_string(),
            property_name: "Rouse Hill Depot".to_string(),
            customer_company: "Acme Holdings".to_string(),
            tester_first_name: "Jane".to_string(),
            tester_last_name: "Doe".to_string(),
            tester_licence: "L-5521".to_string(),
            tester_licence_expiry: "2027-03-01".to_string(),
            ..PrefillRecord::default()
        }
    }

    fn valid_input() -> UserInput {
        let value = json!({
            "street_number": "12",
            "street_name": "Windsor Road",
            "suburb": "Rouse Hill",
            "state": "NSW",
            "post_code": "2155",
            "nmi": "4102937465",
            "customer_first_name": "Sam",
            "customer_last_name": "Carter",
            "customer_street": "9 George Street",
            "customer_suburb": "Parramatta",
            "customer_state": "NSW",
            "customer_post_code": "2150",
            "installation_type": "New installation",
            "work_carried_out": ["Switchboard", "Wiring"],
            "special_conditions": [],
            "test_date": "2026-02-11",
            "energy_provider": "Ausgrid",
            "certification_statement": true
        });
        match value {
            Value::Object(map) => UserInput(map.into_iter().collect()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn read_only_fields_cannot_be_overridden() {
        let mut input = valid_input();
        input
            .0
            .insert("certificate_serial".to_string(), json!("HACKED"));
        input.0.insert("property_name".to_string(), json!("HACKED"));
        input
            .0
            .insert("installer_licence".to_string(), json!("HACKED"));

        let merged = merge(&prefill(), &input).unwrap();
        assert_eq!(merged.certificate_serial, "JOB-42");
        assert_eq!(merged.property_name, "Rouse Hill Depot");
        assert_eq!(merged.installer_licence, "");
    }

    #[test]
    fn derived_tester_credentials_are_locked() {
        let mut input = valid_input();
        input.0.insert("license_number".to_string(), json!("FAKE-1"));
        input.0.insert("tester_first_name".to_string(), json!("Mal"));

        let merged = merge(&prefill(), &input).unwrap();
        assert_eq!(merged.tester_licence, "L-5521");
        assert_eq!(merged.tester_first_name, "Jane");
    }

    #[test]
    fn underived_tester_credentials_come_from_the_form() {
        let mut bare = prefill();
        bare.tester_licence = String::new();
        let mut input = valid_input();
        input
            .0
            .insert("license_number".to_string(), json!("EL-99812"));

        let merged = merge(&bare, &input).unwrap();
        assert_eq!(merged.tester_licence, "EL-99812");
    }

    #[test]
    fn underived_tester_credential_missing_from_form_is_rejected() {
        let mut bare = prefill();
        bare.tester_licence_expiry = String::new();

        let err = merge(&bare, &valid_input()).unwrap_err();
        assert_eq!(err, ValidationError::missing("license_expiry"));
    }

    #[test]
    fn missing_required_field_names_the_field() {
        let mut input = valid_input();
        input.0.remove("nmi");

        let err = merge(&prefill(), &input).unwrap_err();
        assert_eq!(err, ValidationError::missing("nmi"));
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let mut input = valid_input();
        input.0.insert("suburb".to_string(), json!("   "));

        let err = merge(&prefill(), &input).unwrap_err();
        assert_eq!(err, ValidationError::missing("suburb"));
    }

    #[test]
    fn empty_work_carried_out_is_rejected() {
        let mut input = valid_input();
        input.0.insert("work_carried_out".to_string(), json!([]));

        let err = merge(&prefill(), &input).unwrap_err();
        assert_eq!(err, ValidationError::missing("work_carried_out"));
    }

    #[test]
    fn absent_certification_statement_is_rejected() {
        let mut input = valid_input();
        input.0.remove("certification_statement");

        let err = merge(&prefill(), &input).unwrap_err();
        assert_eq!(err, ValidationError::missing("certification_statement"));
    }

    #[test]
    fn unaffirmed_certification_statement_is_rejected() {
        let mut input = valid_input();
        input
            .0
            .insert("certification_statement".to_string(), json!(false));

        let err = merge(&prefill(), &input).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "certification_statement"
        ));
    }

    #[test]
    fn special_conditions_may_be_empty() {
        let merged = merge(&prefill(), &valid_input()).unwrap();
        assert!(merged.special_conditions.is_empty());
        assert_eq!(merged.work_carried_out.len(), 2);
    }

    #[test]
    fn checkbox_style_affirmation_is_accepted() {
        let mut input = valid_input();
        input
            .0
            .insert("certification_statement".to_string(), json!("on"));

        assert!(merge(&prefill(), &input).is_ok());
    }

    #[test]
    fn optional_emails_pass_through_verbatim() {
        let mut input = valid_input();
        input
            .0
            .insert("owner_email".to_string(), json!("owner@example.com"));

        let merged = merge(&prefill(), &input).unwrap();
        assert_eq!(merged.owner_email.as_deref(), Some("owner@example.com"));
        assert_eq!(merged.meter_provider_email, None);
    }
}
