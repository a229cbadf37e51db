//! In-memory conversation store for tests and single-server deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::conversation::{Generation, Message, Role};
use crate::domain::foundation::{DebateError, SessionToken};
use crate::ports::{ConversationStore, StoreError};

/// In-memory conversation store.
///
/// A single `RwLock` over the session map serializes all appends, which
/// subsumes the required per-session ordering. The lock is held only for
/// the duration of the map operation itself; provider calls happen
/// entirely outside it.
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    sessions: RwLock<HashMap<SessionToken, SessionState>>,
}

/// Log state for one session identity.
#[derive(Debug, Default)]
struct SessionState {
    messages: Vec<Message>,
    next_sequence: u64,
    generation: Generation,
}

impl SessionState {
    fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_sequence: 1,
            generation: Generation::INITIAL,
        }
    }
}

impl InMemoryConversationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn history(&self, session: &SessionToken) -> Result<Vec<Message>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session)
            .map(|state| state.messages.clone())
            .unwrap_or_default())
    }

    async fn generation(&self, session: &SessionToken) -> Result<Generation, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session)
            .map(|state| state.generation)
            .unwrap_or(Generation::INITIAL))
    }

    async fn append(
        &self,
        session: &SessionToken,
        role: Role,
        content: &str,
        observed: Generation,
    ) -> Result<Message, StoreError> {
        let mut sessions = self.sessions.write().await;
        let state = sessions.entry(*session).or_insert_with(SessionState::new);

        if state.generation != observed {
            return Err(StoreError::StaleGeneration {
                observed: observed.value(),
                current: state.generation.value(),
            });
        }

        let message = Message::new(role, content, state.next_sequence).map_err(|e| match e {
            DebateError::Validation { reason, .. } => StoreError::InvalidContent(reason),
            other => StoreError::InvalidContent(other.to_string()),
        })?;
        state.next_sequence += 1;
        state.messages.push(message.clone());

        Ok(message)
    }

    async fn reset(&self, session: &SessionToken) -> Result<Generation, StoreError> {
        let mut sessions = self.sessions.write().await;
        let state = sessions.entry(*session).or_insert_with(SessionState::new);

        state.messages.clear();
        state.next_sequence = 1;
        state.generation = state.generation.next();

        Ok(state.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn history_of_unknown_session_is_empty() {
        let store = InMemoryConversationStore::new();
        let history = store.history(&SessionToken::new()).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn reading_never_creates_state() {
        let store = InMemoryConversationStore::new();
        let session = SessionToken::new();

        store.history(&session).await.unwrap();
        store.generation(&session).await.unwrap();

        let sessions = store.sessions.read().await;
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn append_assigns_contiguous_sequences_from_one() {
        let store = InMemoryConversationStore::new();
        let session = SessionToken::new();
        let gen = store.generation(&session).await.unwrap();

        let first = store.append(&session, Role::User, "first", gen).await.unwrap();
        let second = store
            .append(&session, Role::Assistant, "second", gen)
            .await
            .unwrap();

        assert_eq!(first.sequence(), 1);
        assert_eq!(second.sequence(), 2);
    }

    #[tokio::test]
    async fn history_is_idempotent_between_mutations() {
        let store = InMemoryConversationStore::new();
        let session = SessionToken::new();
        let gen = store.generation(&session).await.unwrap();
        store.append(&session, Role::User, "hello", gen).await.unwrap();

        let once = store.history(&session).await.unwrap();
        let twice = store.history(&session).await.unwrap();
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn append_rejects_blank_content() {
        let store = InMemoryConversationStore::new();
        let session = SessionToken::new();
        let gen = store.generation(&session).await.unwrap();

        let result = store.append(&session, Role::User, "   ", gen).await;
        assert!(matches!(result, Err(StoreError::InvalidContent(_))));

        // A rejected append consumes no sequence number.
        let msg = store.append(&session, Role::User, "real", gen).await.unwrap();
        assert_eq!(msg.sequence(), 1);
    }

    #[tokio::test]
    async fn reset_clears_log_and_bumps_generation() {
        let store = InMemoryConversationStore::new();
        let session = SessionToken::new();
        let gen = store.generation(&session).await.unwrap();
        store.append(&session, Role::User, "hello", gen).await.unwrap();

        let new_gen = store.reset(&session).await.unwrap();

        assert_eq!(new_gen, gen.next());
        assert!(store.history(&session).await.unwrap().is_empty());
        assert_eq!(store.generation(&session).await.unwrap(), new_gen);
    }

    #[tokio::test]
    async fn append_with_stale_generation_is_fenced() {
        let store = InMemoryConversationStore::new();
        let session = SessionToken::new();
        let stale = store.generation(&session).await.unwrap();

        store.reset(&session).await.unwrap();

        let result = store.append(&session, Role::Assistant, "late reply", stale).await;
        assert!(matches!(result, Err(ref e) if e.is_stale()));

        // The fenced append left the new, empty log untouched.
        assert!(store.history(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sequences_restart_after_reset() {
        let store = InMemoryConversationStore::new();
        let session = SessionToken::new();
        let gen = store.generation(&session).await.unwrap();
        store.append(&session, Role::User, "old", gen).await.unwrap();

        let new_gen = store.reset(&session).await.unwrap();
        let msg = store.append(&session, Role::User, "new", new_gen).await.unwrap();
        assert_eq!(msg.sequence(), 1);
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let store = InMemoryConversationStore::new();
        let one = SessionToken::new();
        let two = SessionToken::new();
        let gen = Generation::INITIAL;

        store.append(&one, Role::User, "for one", gen).await.unwrap();

        assert!(store.history(&two).await.unwrap().is_empty());
        store.reset(&two).await.unwrap();
        assert_eq!(store.history(&one).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_appends_never_interleave_sequences() {
        let store = Arc::new(InMemoryConversationStore::new());
        let session = SessionToken::new();
        let gen = Generation::INITIAL;

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .append(&session, Role::User, &format!("turn {}", i), gen)
                        .await
                        .unwrap()
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let history = store.history(&session).await.unwrap();
        let sequences: Vec<u64> = history.iter().map(|m| m.sequence()).collect();
        let expected: Vec<u64> = (1..=32).collect();
        assert_eq!(sequences, expected);
    }

    proptest! {
        // Any batch of non-blank appends yields strictly increasing,
        // contiguous sequence numbers with no duplicates.
        #[test]
        fn append_batches_keep_sequences_contiguous(contents in prop::collection::vec("[a-z]{1,12}", 1..40)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            runtime.block_on(async {
                let store = InMemoryConversationStore::new();
                let session = SessionToken::new();
                let gen = store.generation(&session).await.unwrap();

                for content in &contents {
                    store.append(&session, Role::User, content, gen).await.unwrap();
                }

                let history = store.history(&session).await.unwrap();
                prop_assert_eq!(history.len(), contents.len());
                for (i, message) in history.iter().enumerate() {
                    prop_assert_eq!(message.sequence(), i as u64 + 1);
                }
                Ok(())
            })?;
        }
    }
}
