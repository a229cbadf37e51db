//! Session identity and anti-forgery lifecycle.
//!
//! Exactly one conversation session is addressable per identity at a
//! time. Invalidation does not mutate the old session: it bumps the old
//! identity's store generation (fencing any turn still in flight) and
//! then rotates to a fresh token/anti-forgery pair. The generation bump
//! runs first so a racing turn evaluates its fence against the
//! post-reset value.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{AntiForgeryToken, DebateError, SessionToken};
use crate::ports::{ConversationStore, StoreError};

/// One issued identity pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionHandle {
    /// Opaque session identity, carried in the session cookie.
    pub token: SessionToken,
    /// Anti-forgery token the client must present on mutating requests.
    pub anti_forgery: AntiForgeryToken,
}

/// Issues and rotates session identities.
pub struct SessionLifecycle {
    store: Arc<dyn ConversationStore>,
    active: RwLock<HashMap<SessionToken, AntiForgeryToken>>,
}

impl SessionLifecycle {
    /// Creates a lifecycle over the given store.
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self {
            store,
            active: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the handle for an existing token, registering it if this
    /// process has not seen it yet, or issues a fresh pair.
    ///
    /// Re-registering a presented token keeps a conversation readable
    /// across process restarts when the store is durable; the token is
    /// an unguessable uuid we issued via a cookie.
    pub async fn establish(&self, existing: Option<SessionToken>) -> SessionHandle {
        let mut active = self.active.write().await;

        if let Some(token) = existing {
            let anti_forgery = *active.entry(token).or_insert_with(AntiForgeryToken::new);
            return SessionHandle {
                token,
                anti_forgery,
            };
        }

        let handle = SessionHandle {
            token: SessionToken::new(),
            anti_forgery: AntiForgeryToken::new(),
        };
        active.insert(handle.token, handle.anti_forgery);
        handle
    }

    /// Checks a presented anti-forgery token against the session's
    /// current one.
    pub async fn verify(&self, token: &SessionToken, presented: &AntiForgeryToken) -> bool {
        self.active.read().await.get(token) == Some(presented)
    }

    /// Invalidates a session: clears its log, bumps its generation, and
    /// rotates to a fresh identity pair.
    ///
    /// The store reset is sequenced strictly before the rotation so that
    /// a `handle_turn` racing with the reset sees the bumped generation
    /// at its commit fence.
    ///
    /// # Errors
    ///
    /// - `StorageUnavailable` if the store cannot be reached; the old
    ///   identity stays valid in that case
    pub async fn invalidate(&self, token: &SessionToken) -> Result<SessionHandle, DebateError> {
        self.store.reset(token).await.map_err(|e| match e {
            StoreError::Unavailable(message) => DebateError::StorageUnavailable(message),
            other => DebateError::StorageUnavailable(other.to_string()),
        })?;

        let mut active = self.active.write().await;
        active.remove(token);

        let handle = SessionHandle {
            token: SessionToken::new(),
            anti_forgery: AntiForgeryToken::new(),
        };
        active.insert(handle.token, handle.anti_forgery);

        tracing::info!(old = %token, new = %handle.token, "rotated session identity");
        Ok(handle)
    }
}
