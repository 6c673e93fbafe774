//! Workflow orchestrator — sequences the session lifecycle.
//!
//! `generate` creates a Pending session from an upstream job payload;
//! `submit` merges the form input, resolves recipients, drives the
//! rendering and dispatch collaborators, and only then marks the session
//! Completed. Distribution and the store transition are one logical unit:
//! any collaborator failure leaves the session Pending so an identical
//! retry can succeed.

use crate::error::{CcewError, DistributionError};
use crate::events::SessionEvent;
use crate::routing::resolve_recipients;
use crate::store::SessionStore;
use crate::types::{RecipientSet, SubmissionRecord, UpstreamPayload, UserInput};
use crate::merge;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

// ─── Collaborator contracts ───────────────────────────────────

/// Renders the certificate document from a canonical submission record.
#[async_trait]
pub trait CertificateRenderer: Send + Sync {
    async fn render(&self, submission: &SubmissionRecord) -> Result<Vec<u8>, DistributionError>;
}

/// Sends the rendered certificate to the resolved recipients.
#[async_trait]
pub trait CertificateDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        document: &[u8],
        recipients: &RecipientSet,
        submission: &SubmissionRecord,
    ) -> Result<(), DistributionError>;
}

// ─── Outcomes ─────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateOutcome {
    pub session_id: Uuid,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// The primary mailbox the certificate was sent to.
    pub recipient: String,
}

// ─── Engine ───────────────────────────────────────────────────

pub struct CcewEngine {
    store: Arc<dyn SessionStore>,
    renderer: Arc<dyn CertificateRenderer>,
    dispatcher: Arc<dyn CertificateDispatcher>,
    /// Sessions with a submit currently distributing. The session lock is
    /// not held across collaborator calls; this set is what rejects a
    /// concurrent duplicate submit instead.
    in_flight: Mutex<HashSet<Uuid>>,
}

impl CcewEngine {
    pub fn new(
        store: Arc<dyn SessionStore>,
        renderer: Arc<dyn CertificateRenderer>,
        dispatcher: Arc<dyn CertificateDispatcher>,
    ) -> Self {
        Self {
            store,
            renderer,
            dispatcher,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Create a new certificate session from an upstream job payload.
    pub async fn generate(&self, upstream: UpstreamPayload) -> Result<GenerateOutcome, CcewError> {
        let session_id = self.store.create(upstream).await?;
        let session = self.store.get(session_id).await?;
        self.store
            .append_event(
                session_id,
                SessionEvent::SessionCreated {
                    session_id,
                    certificate_serial: session.prefill.certificate_serial.clone(),
                },
            )
            .await?;
        Ok(GenerateOutcome { session_id })
    }

    /// Submit the completed form for a session and distribute the
    /// certificate.
    pub async fn submit(
        &self,
        session_id: Uuid,
        input: UserInput,
    ) -> Result<SubmitOutcome, CcewError> {
        {
            let mut in_flight = self.in_flight.lock().await;
            if !in_flight.insert(session_id) {
                return Err(CcewError::SubmissionInFlight { session_id });
            }
        }
        let result = self.submit_inner(session_id, input).await;
        self.in_flight.lock().await.remove(&session_id);
        result
    }

    async fn submit_inner(
        &self,
        session_id: Uuid,
        input: UserInput,
    ) -> Result<SubmitOutcome, CcewError> {
        let session = self.store.get(session_id).await?;
        if session.is_completed() {
            return Err(CcewError::AlreadyCompleted { session_id });
        }

        let submission = match merge::merge(&session.prefill, &input) {
            Ok(submission) => submission,
            Err(err) => {
                warn!(%session_id, error = %err, "submission rejected");
                return Err(err.into());
            }
        };
        self.store
            .append_event(
                session_id,
                SessionEvent::SubmissionValidated {
                    energy_provider: submission.energy_provider.clone(),
                },
            )
            .await?;

        let recipients = resolve_recipients(&submission);

        let document = match self.renderer.render(&submission).await {
            Ok(document) => document,
            Err(err) => return self.distribution_failed(session_id, err).await,
        };
        self.store
            .append_event(
                session_id,
                SessionEvent::CertificateRendered {
                    bytes: document.len(),
                },
            )
            .await?;

        if let Err(err) = self
            .dispatcher
            .dispatch(&document, &recipients, &submission)
            .await
        {
            return self.distribution_failed(session_id, err).await;
        }

        let completed = self
            .store
            .complete(session_id, submission, recipients.primary.clone())
            .await?;
        self.store
            .append_event(
                session_id,
                SessionEvent::SessionCompleted {
                    recipient: recipients.primary.clone(),
                    at: completed.completed_at.unwrap_or_else(Utc::now),
                },
            )
            .await?;
        info!(%session_id, recipient = %recipients.primary, "certificate distributed");

        Ok(SubmitOutcome {
            recipient: recipients.primary,
        })
    }

    /// Record a distribution failure and surface it. The session stays
    /// Pending — `complete` was never reached.
    async fn distribution_failed(
        &self,
        session_id: Uuid,
        err: DistributionError,
    ) -> Result<SubmitOutcome, CcewError> {
        warn!(%session_id, error = %err, "distribution failed, session stays pending");
        self.store
            .append_event(
                session_id,
                SessionEvent::DistributionFailed {
                    reason: err.to_string(),
                },
            )
            .await?;
        Err(err.into())
    }
}
