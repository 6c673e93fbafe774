//! Session events — the audit trail for every certificate workflow.
//!
//! Appended by the engine at each lifecycle step and kept per session in
//! the store. The trail is what support reads when a certificate "didn't
//! arrive": it shows exactly how far distribution got before failing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum SessionEvent {
    SessionCreated {
        session_id: Uuid,
        certificate_serial: String,
    },
    SubmissionValidated {
        energy_provider: String,
    },
    CertificateRendered {
        bytes: usize,
    },
    DistributionFailed {
        reason: String,
    },
    SessionCompleted {
        recipient: String,
        at: DateTime<Utc>,
    },
}
