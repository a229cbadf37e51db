//! Mock completion gateway for testing.
//!
//! Configurable to return scripted replies, simulate latency, or inject
//! failures, and records every prompt it receives for verification.
//!
//! # Example
//!
//! ```ignore
//! let gateway = MockCompletionGateway::new()
//!     .with_reply("I disagree entirely.")
//!     .with_delay(Duration::from_millis(50));
//!
//! let completion = gateway.complete(&prompt).await?;
//! assert_eq!(completion.content, "I disagree entirely.");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{Completion, CompletionGateway, GatewayError, PromptMessage};

/// Mock completion gateway.
///
/// Scripted outcomes are consumed in order; when the script runs dry the
/// gateway echoes a canned reply so open-ended tests keep working.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionGateway {
    outcomes: Arc<Mutex<VecDeque<MockOutcome>>>,
    delay: Duration,
    calls: Arc<Mutex<Vec<Vec<PromptMessage>>>>,
}

#[derive(Debug, Clone)]
enum MockOutcome {
    Reply(String),
    Failure(MockFailure),
}

/// Failure modes the mock can inject.
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Simulate the provider timing out.
    Timeout { timeout_secs: u32 },
    /// Simulate a transport failure.
    Network { message: String },
    /// Simulate a non-success provider status.
    Status { status: u16, message: String },
    /// Simulate an unusable response body.
    Malformed { message: String },
}

impl From<MockFailure> for GatewayError {
    fn from(failure: MockFailure) -> Self {
        match failure {
            MockFailure::Timeout { timeout_secs } => GatewayError::Timeout { timeout_secs },
            MockFailure::Network { message } => GatewayError::Network(message),
            MockFailure::Status { status, message } => GatewayError::Provider { status, message },
            MockFailure::Malformed { message } => GatewayError::Malformed(message),
        }
    }
}

impl MockCompletionGateway {
    /// Creates a mock with no scripted outcomes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful reply.
    pub fn with_reply(self, content: impl Into<String>) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(MockOutcome::Reply(content.into()));
        self
    }

    /// Queues a failure.
    pub fn with_failure(self, failure: MockFailure) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(MockOutcome::Failure(failure));
        self
    }

    /// Sets simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the prompts received so far, in call order.
    pub fn calls(&self) -> Vec<Vec<PromptMessage>> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns how many calls were made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionGateway for MockCompletionGateway {
    async fn complete(&self, prompt: &[PromptMessage]) -> Result<Completion, GatewayError> {
        self.calls.lock().unwrap().push(prompt.to_vec());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let outcome = self.outcomes.lock().unwrap().pop_front();
        match outcome {
            Some(MockOutcome::Reply(content)) => Ok(Completion {
                content,
                model: "mock".to_string(),
            }),
            Some(MockOutcome::Failure(failure)) => Err(failure.into()),
            None => Ok(Completion {
                content: "A scripted rebuttal.".to_string(),
                model: "mock".to_string(),
            }),
        }
    }
}
