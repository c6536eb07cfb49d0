use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::scan::{BatchInfo, ExpectedItem, ScanError};
use crate::services::scan_session::ScanSession;

/// In-memory registry of live scan sessions, keyed by session id.
///
/// Sessions are ephemeral and process-local: they exist from the moment an
/// operator picks a godown and product type until the report is submitted
/// or the operator starts over. Nothing is persisted; a restart drops all
/// in-progress verifications. There is no expiry sweeper either - the only
/// ways out of the map are report submission and explicit discard.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, ScanSession>>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for a batch. Re-selecting a batch that already has
    /// a live session discards the old one - every selection starts fresh.
    pub async fn begin(&self, batch: BatchInfo, expected_items: Vec<ExpectedItem>) -> Uuid {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| {
            session.batch.godown_id != batch.godown_id
                || session.batch.product_prefix != batch.product_prefix
        });
        if sessions.len() < before {
            info!(
                "♻️ Discarded previous session for godown {} / prefix {}",
                batch.godown_id, batch.product_prefix
            );
        }

        let session_id = Uuid::new_v4();
        debug!(
            "Scan session {} started: godown {}, prefix {}, {} expected items",
            session_id,
            batch.godown_id,
            batch.product_prefix,
            expected_items.len()
        );
        sessions.insert(session_id, ScanSession::begin(batch, expected_items));
        session_id
    }

    /// Run a closure against a session read-only.
    pub async fn with_session<T>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&ScanSession) -> T,
    ) -> Result<T, ScanError> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(&session_id)
            .ok_or(ScanError::SessionNotFound { session_id })?;
        Ok(f(session))
    }

    /// Run a closure against a session with mutable access.
    pub async fn with_session_mut<T>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&mut ScanSession) -> T,
    ) -> Result<T, ScanError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or(ScanError::SessionNotFound { session_id })?;
        Ok(f(session))
    }

    /// Remove a session from the registry, ending it first so any clone
    /// still held by a caller reads as inactive.
    pub async fn discard(&self, session_id: Uuid) -> Result<(), ScanError> {
        let mut sessions = self.sessions.write().await;
        match sessions.remove(&session_id) {
            Some(mut session) => {
                session.end();
                debug!("Scan session {session_id} discarded");
                Ok(())
            }
            None => Err(ScanError::SessionNotFound { session_id }),
        }
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
