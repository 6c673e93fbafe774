//! Field derivation — upstream job payload to pre-fill record.
//!
//! `derive` is pure and total: it never fails, and every canonical field
//! is present in its output (empty string when the upstream payload has
//! nothing usable). The upstream key set varies between jobs, so each
//! field is probed at the paths the field-service platform is known to
//! use, newest first.

use crate::types::{PrefillRecord, UpstreamPayload};

// ─── Installer identity (fixed legal entity) ──────────────────

pub const INSTALLER_COMPANY: &str = "Watts Next Electrical Pty Ltd";
pub const INSTALLER_LICENCE: &str = "EC-338127";
pub const INSTALLER_STREET: &str = "Unit 4, 28 Prince William Drive";
pub const INSTALLER_SUBURB: &str = "Seven Hills";
pub const INSTALLER_STATE: &str = "NSW";
pub const INSTALLER_POST_CODE: &str = "2147";
pub const INSTALLER_PHONE: &str = "(02) 9674 5512";

/// Split a combined technician name on whitespace: first token is the
/// first name, remaining tokens joined by single spaces are the last
/// name. A single-word name yields an empty last name.
fn split_name(full: &str) -> (String, String) {
    let mut tokens = full.split_whitespace();
    let first = tokens.next().unwrap_or("").to_string();
    let rest: Vec<&str> = tokens.collect();
    (first, rest.join(" "))
}

/// Derive the pre-fill record for a new session.
pub fn derive(upstream: &UpstreamPayload) -> PrefillRecord {
    let certificate_serial = upstream
        .first_at(&[&["ID"], &["JobId"], &["job_id"]])
        .unwrap_or_default();

    let property_name = upstream
        .first_at(&[&["Site", "Name"], &["site_name"]])
        .unwrap_or_default();

    let customer_company = upstream
        .first_at(&[&["Customer", "CompanyName"], &["customer_name"]])
        .unwrap_or_default();

    let customer_first_name = upstream
        .first_at(&[&["Customer", "GivenName"], &["customer_first_name"]])
        .unwrap_or_default();
    let customer_last_name = upstream
        .first_at(&[&["Customer", "FamilyName"], &["customer_last_name"]])
        .unwrap_or_default();

    // Technician name: separate fields win; fall back to splitting the
    // combined display name.
    let tester_first = upstream.first_at(&[&["Technician", "FirstName"], &["technician_first_name"]]);
    let tester_last = upstream.first_at(&[&["Technician", "LastName"], &["technician_last_name"]]);
    let (tester_first_name, tester_last_name) = match (tester_first, tester_last) {
        (Some(first), Some(last)) => (first, last),
        (Some(first), None) => (first, String::new()),
        _ => upstream
            .first_at(&[&["Technician", "Name"], &["technician_name"]])
            .map(|full| split_name(&full))
            .unwrap_or_default(),
    };

    let tester_licence = upstream
        .first_at(&[&["Technician", "LicenceNumber"], &["technician_licence"]])
        .unwrap_or_default();
    let tester_licence_expiry = upstream
        .first_at(&[&["Technician", "LicenceExpiry"], &["technician_licence_expiry"]])
        .unwrap_or_default();

    PrefillRecord {
        certificate_serial,
        property_name,
        customer_first_name,
        customer_last_name,
        customer_company,

        installer_company: INSTALLER_COMPANY.to_string(),
        installer_licence: INSTALLER_LICENCE.to_string(),
        installer_street: INSTALLER_STREET.to_string(),
        installer_suburb: INSTALLER_SUBURB.to_string(),
        installer_state: INSTALLER_STATE.to_string(),
        installer_post_code: INSTALLER_POST_CODE.to_string(),
        installer_phone: INSTALLER_PHONE.to_string(),

        tester_first_name,
        tester_last_name,
        tester_licence,
        tester_licence_expiry,
        // Tester and installer share the office address; only the licence
        // credentials are technician-specific.
        tester_street: INSTALLER_STREET.to_string(),
        tester_suburb: INSTALLER_SUBURB.to_string(),
        tester_state: INSTALLER_STATE.to_string(),
        tester_post_code: INSTALLER_POST_CODE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> UpstreamPayload {
        match value {
            serde_json::Value::Object(map) => UpstreamPayload(map),
            _ => panic!("test payload must be an object"),
        }
    }

    #[test]
    fn derive_is_total_over_empty_payload() {
        let prefill = derive(&UpstreamPayload::default());
        assert_eq!(prefill.certificate_serial, "");
        assert_eq!(prefill.property_name, "");
        assert_eq!(prefill.tester_first_name, "");
        assert_eq!(prefill.tester_last_name, "");
        // Installer block is constant regardless of upstream content.
        assert_eq!(prefill.installer_company, INSTALLER_COMPANY);
        assert_eq!(prefill.installer_licence, INSTALLER_LICENCE);
    }

    #[test]
    fn splits_combined_technician_name() {
        let prefill = derive(&payload(json!({
            "Technician": { "Name": "Jane Doe" }
        })));
        assert_eq!(prefill.tester_first_name, "Jane");
        assert_eq!(prefill.tester_last_name, "Doe");
    }

    #[test]
    fn multi_word_surname_joins_with_single_spaces() {
        let prefill = derive(&payload(json!({
            "Technician": { "Name": "Jan  van  der Berg" }
        })));
        assert_eq!(prefill.tester_first_name, "Jan");
        assert_eq!(prefill.tester_last_name, "van der Berg");
    }

    #[test]
    fn single_word_name_has_empty_last_name() {
        let prefill = derive(&payload(json!({
            "Technician": { "Name": "Prince" }
        })));
        assert_eq!(prefill.tester_first_name, "Prince");
        assert_eq!(prefill.tester_last_name, "");
    }

    #[test]
    fn separate_name_fields_win_over_combined() {
        let prefill = derive(&payload(json!({
            "Technician": {
                "Name": "Wrong Person",
                "FirstName": "Alex",
                "LastName": "Nguyen"
            }
        })));
        assert_eq!(prefill.tester_first_name, "Alex");
        assert_eq!(prefill.tester_last_name, "Nguyen");
    }

    #[test]
    fn numeric_job_id_becomes_serial() {
        let prefill = derive(&payload(json!({ "ID": 10452 })));
        assert_eq!(prefill.certificate_serial, "10452");
    }

    #[test]
    fn nested_site_and_customer_fields() {
        let prefill = derive(&payload(json!({
            "Site": { "Name": "Rouse Hill Depot" },
            "Customer": { "CompanyName": "Acme Holdings" }
        })));
        assert_eq!(prefill.property_name, "Rouse Hill Depot");
        assert_eq!(prefill.customer_company, "Acme Holdings");
    }

    #[test]
    fn tester_address_is_the_office_block() {
        let prefill = derive(&payload(json!({
            "Technician": { "Name": "Jane Doe", "LicenceNumber": "L-5521" }
        })));
        assert_eq!(prefill.tester_licence, "L-5521");
        assert_eq!(prefill.tester_street, INSTALLER_STREET);
        assert_eq!(prefill.tester_suburb, INSTALLER_SUBURB);
        assert_eq!(prefill.tester_post_code, INSTALLER_POST_CODE);
    }
}
