//! CCEW session lifecycle and data-reconciliation engine.
//!
//! Relays field-service job data into a Certificate of Compliance for
//! Electrical Work (CCEW) workflow: a session is created from an upstream
//! job payload, a technician completes the form against that session, and
//! submission drives certificate rendering, email distribution and the
//! terminal state transition.
//!
//! The pipeline, leaf to root:
//!
//! - [`prefill`] — pure derivation of the pre-fill record from the
//!   upstream payload.
//! - [`store`] — concurrency-safe session storage and lifecycle
//!   transitions.
//! - [`merge`] — reconciliation of pre-filled and user-submitted fields.
//! - [`routing`] — energy-provider recipient resolution.
//! - [`engine`] — the orchestrator tying it together over the rendering
//!   and dispatch collaborator traits.

pub mod engine;
pub mod error;
pub mod events;
pub mod merge;
pub mod prefill;
pub mod routing;
pub mod store;
pub mod types;

pub use engine::{CcewEngine, CertificateDispatcher, CertificateRenderer};
pub use error::{CcewError, DistributionError, ValidationError};
pub use store::{MemoryStore, SessionStore};
pub use types::{
    PrefillRecord, RecipientSet, Session, SessionState, SubmissionRecord, UpstreamPayload,
    UserInput,
};
