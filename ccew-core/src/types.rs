//! Canonical data model for the CCEW workflow.
//!
//! Three records move through the pipeline: the verbatim upstream job
//! payload, the derived pre-fill record, and the merged submission record.
//! Only the submission record travels past the merge boundary — arbitrary
//! upstream/user keys never leak downstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

// ─── Upstream payload ─────────────────────────────────────────

/// The job payload exactly as the field-service platform sent it.
/// Stored verbatim on the session and read-only after creation. The key
/// set is upstream-defined and partially optional; lookups are therefore
/// best-effort and never fail.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct UpstreamPayload(pub serde_json::Map<String, Value>);

impl UpstreamPayload {
    /// Walk a nested object path (e.g. `["Customer", "CompanyName"]`) and
    /// return the value as a trimmed non-empty string. Numbers are
    /// stringified so numeric job ids work as serials.
    pub fn str_at(&self, path: &[&str]) -> Option<String> {
        let (first, rest) = path.split_first()?;
        let mut current = self.0.get(*first)?;
        for key in rest {
            current = current.get(*key)?;
        }
        match current {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// First path that yields a value, in order.
    pub fn first_at(&self, paths: &[&[&str]]) -> Option<String> {
        paths.iter().find_map(|path| self.str_at(path))
    }
}

// ─── User input ───────────────────────────────────────────────

/// The raw form post — opaque keys, untyped values. The merge engine is
/// the only consumer; it pulls typed fields out and drops everything else.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct UserInput(pub BTreeMap<String, Value>);

impl UserInput {
    /// Trimmed non-empty string for a key, if present.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Checkbox-style boolean. HTML forms post `"on"`/`"true"`; a JSON
    /// client posts `true`. Anything else is false.
    pub fn flag(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => {
                matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "on" | "yes")
            }
            _ => false,
        }
    }

    /// Multi-select: an array of strings, or a single string for the
    /// degenerate one-selection post. Blank entries are dropped.
    pub fn list(&self, key: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        match self.0.get(key) {
            Some(Value::Array(items)) => {
                for item in items {
                    if let Value::String(s) = item {
                        let trimmed = s.trim();
                        if !trimmed.is_empty() {
                            out.insert(trimmed.to_string());
                        }
                    }
                }
            }
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if !trimmed.is_empty() {
                    out.insert(trimmed.to_string());
                }
            }
            _ => {}
        }
        out
    }
}

// ─── Pre-fill record ──────────────────────────────────────────

/// Fields derivable from the upstream job before the technician touches
/// the form. Every field is always present — underivable fields are empty
/// strings, never absent keys — so consumers can rely on key existence.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrefillRecord {
    /// Certificate serial — the upstream job id.
    pub certificate_serial: String,
    /// Property / site name.
    pub property_name: String,

    pub customer_first_name: String,
    pub customer_last_name: String,
    pub customer_company: String,

    // Installer identity — fixed legal-entity block, never derived.
    pub installer_company: String,
    pub installer_licence: String,
    pub installer_street: String,
    pub installer_suburb: String,
    pub installer_state: String,
    pub installer_post_code: String,
    pub installer_phone: String,

    // Tester identity — technician credentials from upstream, office
    // address shared with the installer block.
    pub tester_first_name: String,
    pub tester_last_name: String,
    pub tester_licence: String,
    pub tester_licence_expiry: String,
    pub tester_street: String,
    pub tester_suburb: String,
    pub tester_state: String,
    pub tester_post_code: String,
}

// ─── Submission record ────────────────────────────────────────

/// The final canonical certificate record: pre-fill fields merged with the
/// technician's form input. This is the only shape the PDF renderer and
/// email dispatcher ever see.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub certificate_serial: String,
    pub property_name: String,

    // Installation site address.
    pub street_number: String,
    pub street_name: String,
    pub suburb: String,
    pub state: String,
    pub post_code: String,
    /// AEMO national metering identifier for the connection point.
    pub nmi: String,

    pub customer_first_name: String,
    pub customer_last_name: String,
    pub customer_company: String,
    pub customer_street: String,
    pub customer_suburb: String,
    pub customer_state: String,
    pub customer_post_code: String,

    pub installation_type: String,
    /// At least one selection is required.
    pub work_carried_out: BTreeSet<String>,
    /// May be empty.
    pub special_conditions: BTreeSet<String>,

    pub installer_company: String,
    pub installer_licence: String,
    pub installer_street: String,
    pub installer_suburb: String,
    pub installer_state: String,
    pub installer_post_code: String,
    pub installer_phone: String,

    pub tester_first_name: String,
    pub tester_last_name: String,
    pub tester_licence: String,
    pub tester_licence_expiry: String,
    pub tester_street: String,
    pub tester_suburb: String,
    pub tester_state: String,
    pub tester_post_code: String,

    pub test_date: String,
    pub energy_provider: String,
    /// The technician's affirmation that the work complies. Must be true
    /// for the merge to succeed.
    pub certification_statement: bool,

    pub meter_provider_email: Option<String>,
    pub owner_email: Option<String>,
}

// ─── Recipients ───────────────────────────────────────────────

/// Resolved distribution addresses for a completed certificate.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipientSet {
    /// The energy provider's certificate mailbox.
    pub primary: String,
    /// Optional stakeholder copies (meter provider, property owner).
    pub secondary: Vec<String>,
}

impl RecipientSet {
    /// Primary followed by secondaries, in order.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.secondary.iter().map(String::as_str))
    }
}

// ─── Session ──────────────────────────────────────────────────

/// Session lifecycle state. `Completed` is terminal.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Pending,
    Completed,
}

/// One certificate workflow, from upstream generation request to
/// distribution. `submission`, `completed_at` and `routed_recipient` are
/// `Some` iff `state` is `Completed`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub state: SessionState,
    pub upstream: UpstreamPayload,
    pub prefill: PrefillRecord,
    pub submission: Option<SubmissionRecord>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub routed_recipient: Option<String>,
}

impl Session {
    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }
}
