//! Debate turn orchestration.
//!
//! Composes the persona's system prompt with the stored history, drives
//! the completion gateway, and commits the result. This is the central
//! control point where the ordering and consistency guarantees live.
//!
//! # Generation fencing
//!
//! A turn captures the session's generation before doing any work and
//! presents it on every append. The store commits only if the generation
//! is still current, so a completion that resolves after a mid-flight
//! reset is discarded instead of resurrecting the old conversation. No
//! store lock is held across the provider call.

use std::sync::Arc;

use crate::domain::conversation::{Message, Role};
use crate::domain::foundation::{DebateError, SessionToken};
use crate::domain::persona::PersonaCatalog;
use crate::ports::{CompletionGateway, ConversationStore, PromptMessage, StoreError};

/// Drives one debate turn end to end.
pub struct DebateOrchestrator {
    catalog: Arc<PersonaCatalog>,
    store: Arc<dyn ConversationStore>,
    gateway: Arc<dyn CompletionGateway>,
}

impl DebateOrchestrator {
    /// Creates an orchestrator over the given collaborators.
    pub fn new(
        catalog: Arc<PersonaCatalog>,
        store: Arc<dyn ConversationStore>,
        gateway: Arc<dyn CompletionGateway>,
    ) -> Self {
        Self {
            catalog,
            store,
            gateway,
        }
    }

    /// Runs one turn: commit the user's message (if any), obtain the
    /// persona's reply, commit it, return it.
    ///
    /// An empty `user_text` is the persona's opening move: nothing is
    /// appended for the user and the persona speaks over whatever
    /// history exists (normally none).
    ///
    /// # Errors
    ///
    /// - `Provider` if the gateway fails; the user's turn stays
    ///   committed and an identical retry is accepted normally
    /// - `StaleSession` if the session was reset while the turn was in
    ///   flight; the completion is discarded
    /// - `StorageUnavailable` if the store cannot be reached
    pub async fn handle_turn(
        &self,
        session: &SessionToken,
        opponent_id: &str,
        user_text: &str,
    ) -> Result<Message, DebateError> {
        let persona = self.catalog.get(opponent_id);
        let generation = self
            .store
            .generation(session)
            .await
            .map_err(map_store_error)?;

        let user_text = user_text.trim();
        if !user_text.is_empty() {
            self.store
                .append(session, Role::User, user_text, generation)
                .await
                .map_err(map_store_error)?;
        }

        let history = self.store.history(session).await.map_err(map_store_error)?;
        let mut prompt = Vec::with_capacity(history.len() + 1);
        prompt.push(PromptMessage::system(persona.system_prompt()));
        prompt.extend(history.iter().map(PromptMessage::from_message));

        let completion = self.gateway.complete(&prompt).await.map_err(|e| {
            tracing::warn!(
                opponent = persona.id(),
                error = %e,
                retriable = e.is_retriable(),
                "completion provider failed"
            );
            DebateError::provider(e.to_string(), e.is_retriable())
        })?;

        // Fenced commit: the store rejects the append if a reset bumped
        // the generation while the provider call was outstanding.
        match self
            .store
            .append(session, Role::Assistant, &completion.content, generation)
            .await
        {
            Ok(message) => Ok(message),
            Err(e) if e.is_stale() => {
                tracing::info!(
                    session = %session,
                    generation = generation.value(),
                    "discarding completion for reset session"
                );
                Err(DebateError::StaleSession)
            }
            Err(e) => Err(map_store_error(e)),
        }
    }

    /// Returns the session's committed history.
    pub async fn history(&self, session: &SessionToken) -> Result<Vec<Message>, DebateError> {
        self.store.history(session).await.map_err(map_store_error)
    }
}

fn map_store_error(error: StoreError) -> DebateError {
    match error {
        StoreError::Unavailable(message) => DebateError::StorageUnavailable(message),
        StoreError::StaleGeneration { .. } => DebateError::StaleSession,
        StoreError::InvalidContent(reason) => DebateError::validation("message", reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockCompletionGateway, MockFailure};
    use crate::adapters::store::InMemoryConversationStore;
    use crate::ports::PromptRole;
    use futures::future::join_all;
    use std::time::Duration;

    fn orchestrator_with(
        gateway: MockCompletionGateway,
    ) -> (DebateOrchestrator, Arc<InMemoryConversationStore>) {
        let store = Arc::new(InMemoryConversationStore::new());
        let orchestrator = DebateOrchestrator::new(
            Arc::new(PersonaCatalog::built_in()),
            store.clone(),
            Arc::new(gateway),
        );
        (orchestrator, store)
    }

    #[tokio::test]
    async fn opening_move_yields_one_assistant_message() {
        let gateway = MockCompletionGateway::new().with_reply("どうも、始めましょうか。");
        let (orchestrator, _) = orchestrator_with(gateway);
        let session = SessionToken::new();

        let message = orchestrator.handle_turn(&session, "matsuko", "").await.unwrap();
        assert!(message.is_assistant());

        let history = orchestrator.history(&session).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].is_assistant());
    }

    #[tokio::test]
    async fn opening_move_prompt_is_system_only() {
        let gateway = MockCompletionGateway::new().with_reply("opening line");
        let (orchestrator, _) = orchestrator_with(gateway.clone());
        let session = SessionToken::new();

        orchestrator.handle_turn(&session, "takafumi", "").await.unwrap();

        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 1);
        assert_eq!(calls[0][0].role, PromptRole::System);
        assert!(calls[0][0].content.contains("堀江貴文"));
    }

    #[tokio::test]
    async fn user_turn_commits_user_then_assistant() {
        let gateway = MockCompletionGateway::new().with_reply("それは論理が破綻していますよ。");
        let (orchestrator, _) = orchestrator_with(gateway.clone());
        let session = SessionToken::new();

        let reply = orchestrator
            .handle_turn(&session, "hiroyuki", "AIは人類の敵です")
            .await
            .unwrap();
        assert!(reply.is_assistant());

        let history = orchestrator.history(&session).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].is_user());
        assert_eq!(history[0].content(), "AIは人類の敵です");
        assert!(history[1].is_assistant());

        // The prompt the provider saw: system, then the user's turn.
        let prompt = &gateway.calls()[0];
        assert_eq!(prompt.len(), 2);
        assert_eq!(prompt[1].role, PromptRole::User);
    }

    #[tokio::test]
    async fn unknown_opponent_falls_back_to_default_persona() {
        let gateway = MockCompletionGateway::new().with_reply("reply");
        let (orchestrator, _) = orchestrator_with(gateway.clone());
        let session = SessionToken::new();

        orchestrator
            .handle_turn(&session, "no-such-opponent", "hello")
            .await
            .unwrap();

        assert!(gateway.calls()[0][0].content.contains("西村博之"));
    }

    #[tokio::test]
    async fn provider_failure_keeps_user_turn_and_allows_retry() {
        let gateway = MockCompletionGateway::new()
            .with_failure(MockFailure::Timeout { timeout_secs: 30 })
            .with_reply("recovered");
        let (orchestrator, _) = orchestrator_with(gateway);
        let session = SessionToken::new();

        let err = orchestrator
            .handle_turn(&session, "hiroyuki", "first try")
            .await
            .unwrap_err();
        assert!(matches!(err, DebateError::Provider { retriable: true, .. }));

        // The user's turn survived the failure; no assistant turn did.
        let history = orchestrator.history(&session).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].is_user());

        // An identical retry is accepted normally.
        let reply = orchestrator
            .handle_turn(&session, "hiroyuki", "first try")
            .await
            .unwrap();
        assert_eq!(reply.content(), "recovered");

        let history = orchestrator.history(&session).await.unwrap();
        assert_eq!(history.len(), 3);
        assert!(history[2].is_assistant());
    }

    #[tokio::test]
    async fn concurrent_turns_commit_without_interleaving() {
        let gateway = MockCompletionGateway::new().with_reply("to A").with_reply("to B");
        let (orchestrator, _) = orchestrator_with(gateway);
        let orchestrator = Arc::new(orchestrator);
        let session = SessionToken::new();

        let turns = ["A", "B"].map(|text| {
            let orchestrator = Arc::clone(&orchestrator);
            async move { orchestrator.handle_turn(&session, "matsuko", text).await }
        });
        let results = join_all(turns).await;
        for result in &results {
            assert!(result.is_ok());
        }

        let history = orchestrator.history(&session).await.unwrap();
        assert_eq!(history.len(), 4);

        let sequences: Vec<u64> = history.iter().map(|m| m.sequence()).collect();
        assert_eq!(sequences, vec![1, 2, 3, 4]);

        let user_turns: Vec<&str> = history
            .iter()
            .filter(|m| m.is_user())
            .map(|m| m.content())
            .collect();
        assert!(user_turns.contains(&"A"));
        assert!(user_turns.contains(&"B"));
        assert_eq!(history.iter().filter(|m| m.is_assistant()).count(), 2);
    }

    #[tokio::test]
    async fn reset_during_flight_discards_completion() {
        let gateway = MockCompletionGateway::new()
            .with_reply("too late")
            .with_delay(Duration::from_millis(200));
        let (orchestrator, store) = orchestrator_with(gateway);
        let orchestrator = Arc::new(orchestrator);
        let session = SessionToken::new();

        let in_flight = {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move {
                orchestrator
                    .handle_turn(&session, "hiroyuki", "資本主義は限界です")
                    .await
            })
        };

        // Let the turn commit its user message and enter the provider
        // call, then reset underneath it.
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.reset(&session).await.unwrap();

        let result = in_flight.await.unwrap();
        assert!(matches!(result, Err(DebateError::StaleSession)));

        // The reset session's empty log is unaffected by the discard.
        let history = orchestrator.history(&session).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn whitespace_only_text_is_treated_as_opening_move() {
        let gateway = MockCompletionGateway::new().with_reply("opening");
        let (orchestrator, _) = orchestrator_with(gateway);
        let session = SessionToken::new();

        orchestrator.handle_turn(&session, "matsuko", "  \n ").await.unwrap();

        let history = orchestrator.history(&session).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].is_assistant());
    }
}
