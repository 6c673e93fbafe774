//! Session store — keyed, lifecycle-managed holder of session state.
//!
//! The engine operates exclusively through the [`SessionStore`] trait so
//! the backend stays pluggable ([`MemoryStore`] here, a database later).
//! All reads clone the session out; the only mutation is `complete`, which
//! performs its state check and write atomically under the write lock, so
//! a partially-completed record can never be observed and the second of
//! two racing completions gets a clean `AlreadyCompleted`.

use crate::error::CcewError;
use crate::events::SessionEvent;
use crate::prefill;
use crate::types::{Session, SessionState, SubmissionRecord, UpstreamPayload};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Derive the pre-fill, allocate a fresh id and store a new Pending
    /// session. The id is a v4 UUID — 128 random bits, collisions are
    /// cryptographically negligible and ids are never reused.
    async fn create(&self, upstream: UpstreamPayload) -> Result<Uuid, CcewError>;

    /// Read-only lookup.
    async fn get(&self, id: Uuid) -> Result<Session, CcewError>;

    /// Transition `Pending → Completed`. Never silently overwrites a
    /// completed session.
    async fn complete(
        &self,
        id: Uuid,
        submission: SubmissionRecord,
        routed_recipient: String,
    ) -> Result<Session, CcewError>;

    /// Append an audit event. Returns the event's sequence number.
    async fn append_event(&self, id: Uuid, event: SessionEvent) -> Result<u64, CcewError>;

    /// The session's audit trail, in append order.
    async fn events(&self, id: Uuid) -> Result<Vec<SessionEvent>, CcewError>;
}

// ─── In-memory backend ────────────────────────────────────────

#[derive(Default)]
struct Inner {
    sessions: HashMap<Uuid, Session>,
    event_log: HashMap<Uuid, Vec<SessionEvent>>,
}

/// In-memory session store. Sessions are never evicted; a TTL policy is a
/// known gap, not something this backend invents.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create(&self, upstream: UpstreamPayload) -> Result<Uuid, CcewError> {
        let id = Uuid::new_v4();
        let session = Session {
            id,
            state: SessionState::Pending,
            prefill: prefill::derive(&upstream),
            upstream,
            submission: None,
            created_at: Utc::now(),
            completed_at: None,
            routed_recipient: None,
        };

        let mut inner = self.inner.write().await;
        inner.sessions.insert(id, session);
        info!(session_id = %id, "session created");
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Session, CcewError> {
        let inner = self.inner.read().await;
        inner
            .sessions
            .get(&id)
            .cloned()
            .ok_or(CcewError::NotFound { session_id: id })
    }

    async fn complete(
        &self,
        id: Uuid,
        submission: SubmissionRecord,
        routed_recipient: String,
    ) -> Result<Session, CcewError> {
        let mut inner = self.inner.write().await;
        let session = inner
            .sessions
            .get_mut(&id)
            .ok_or(CcewError::NotFound { session_id: id })?;

        if session.is_completed() {
            return Err(CcewError::AlreadyCompleted { session_id: id });
        }

        session.state = SessionState::Completed;
        session.submission = Some(submission);
        session.completed_at = Some(Utc::now());
        session.routed_recipient = Some(routed_recipient);
        info!(session_id = %id, "session completed");
        Ok(session.clone())
    }

    async fn append_event(&self, id: Uuid, event: SessionEvent) -> Result<u64, CcewError> {
        let mut inner = self.inner.write().await;
        if !inner.sessions.contains_key(&id) {
            return Err(CcewError::NotFound { session_id: id });
        }
        let log = inner.event_log.entry(id).or_default();
        log.push(event);
        Ok(log.len() as u64)
    }

    async fn events(&self, id: Uuid) -> Result<Vec<SessionEvent>, CcewError> {
        let inner = self.inner.read().await;
        if !inner.sessions.contains_key(&id) {
            return Err(CcewError::NotFound { session_id: id });
        }
        Ok(inner.event_log.get(&id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SubmissionRecord;

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = MemoryStore::new();
        let id = store.create(UpstreamPayload::default()).await.unwrap();

        let session = store.get(id).await.unwrap();
        assert_eq!(session.id, id);
        assert_eq!(session.state, SessionState::Pending);
        assert!(session.submission.is_none());
        assert!(session.completed_at.is_none());
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, CcewError::NotFound { .. }));
    }

    #[tokio::test]
    async fn ids_are_unique_per_create() {
        let store = MemoryStore::new();
        let a = store.create(UpstreamPayload::default()).await.unwrap();
        let b = store.create(UpstreamPayload::default()).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn complete_transitions_exactly_once() {
        let store = MemoryStore::new();
        let id = store.create(UpstreamPayload::default()).await.unwrap();

        let completed = store
            .complete(id, SubmissionRecord::default(), "ccew@ausgrid.com.au".into())
            .await
            .unwrap();
        assert_eq!(completed.state, SessionState::Completed);
        assert!(completed.completed_at.is_some());
        assert_eq!(
            completed.routed_recipient.as_deref(),
            Some("ccew@ausgrid.com.au")
        );

        let mut replay = SubmissionRecord::default();
        replay.certificate_serial = "OVERWRITE".to_string();
        let err = store
            .complete(id, replay, "other@example.com".into())
            .await
            .unwrap_err();
        assert!(matches!(err, CcewError::AlreadyCompleted { .. }));

        // First submission is untouched.
        let session = store.get(id).await.unwrap();
        assert_eq!(session.submission.unwrap().certificate_serial, "");
        assert_eq!(
            session.routed_recipient.as_deref(),
            Some("ccew@ausgrid.com.au")
        );
    }

    #[tokio::test]
    async fn event_log_appends_in_order() {
        let store = MemoryStore::new();
        let id = store.create(UpstreamPayload::default()).await.unwrap();

        let seq = store
            .append_event(
                id,
                SessionEvent::SubmissionValidated {
                    energy_provider: "Ausgrid".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(seq, 1);
        let seq = store
            .append_event(id, SessionEvent::CertificateRendered { bytes: 1024 })
            .await
            .unwrap();
        assert_eq!(seq, 2);

        let events = store.events(id).await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], SessionEvent::SubmissionValidated { .. }));
    }

    #[tokio::test]
    async fn events_for_unknown_session_are_not_found() {
        let store = MemoryStore::new();
        let err = store
            .append_event(Uuid::new_v4(), SessionEvent::CertificateRendered { bytes: 0 })
            .await
            .unwrap_err();
        assert!(matches!(err, CcewError::NotFound { .. }));
    }
}
