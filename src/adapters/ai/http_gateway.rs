//! HTTP completion gateway for OpenAI-compatible chat APIs.
//!
//! One outbound POST per turn, bounded by the configured timeout. The
//! gateway performs no retries and holds no conversation state; failure
//! classification is left to `GatewayError::is_retriable` and the retry
//! decision to the caller.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpGatewayConfig::new(api_key)
//!     .with_model("gpt-4o-mini")
//!     .with_timeout(Duration::from_secs(30));
//!
//! let gateway = HttpCompletionGateway::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{Completion, CompletionGateway, GatewayError, PromptMessage, PromptRole};

/// Configuration for the HTTP completion gateway.
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to request.
    pub model: String,
    /// Base URL of the chat-completions API.
    pub base_url: String,
    /// Request timeout. Mandatory: a turn must not stay outstanding
    /// longer than this.
    pub timeout: Duration,
    /// Maximum tokens per completion.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl HttpGatewayConfig {
    /// Creates a configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(30),
            max_tokens: 1024,
            temperature: 0.7,
        }
    }

    /// Sets the model to request.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Completion gateway over an OpenAI-compatible chat API.
pub struct HttpCompletionGateway {
    config: HttpGatewayConfig,
    client: Client,
}

impl HttpCompletionGateway {
    /// Creates a gateway with the given configuration.
    pub fn new(config: HttpGatewayConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn to_wire_request(&self, prompt: &[PromptMessage]) -> WireRequest {
        let messages = prompt
            .iter()
            .map(|msg| WireMessage {
                role: match msg.role {
                    PromptRole::System => "system",
                    PromptRole::User => "user",
                    PromptRole::Assistant => "assistant",
                }
                .to_string(),
                content: msg.content.clone(),
            })
            .collect();

        WireRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    async fn send_request(&self, prompt: &[PromptMessage]) -> Result<Response, GatewayError> {
        self.client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&self.to_wire_request(prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    GatewayError::network(format!("Connection failed: {}", e))
                } else {
                    GatewayError::network(e.to_string())
                }
            })
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, GatewayError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Provider {
            status: status.as_u16(),
            message: body,
        })
    }

    async fn parse_response(&self, response: Response) -> Result<Completion, GatewayError> {
        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::malformed(format!("Failed to parse response: {}", e)))?;

        let choice = wire
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::malformed("response contained no choices"))?;

        let content = choice.message.content.unwrap_or_default();
        if content.trim().is_empty() {
            return Err(GatewayError::malformed("completion text was empty"));
        }

        Ok(Completion {
            content,
            model: wire.model,
        })
    }
}

#[async_trait]
impl CompletionGateway for HttpCompletionGateway {
    async fn complete(&self, prompt: &[PromptMessage]) -> Result<Completion, GatewayError> {
        let response = self.send_request(prompt).await?;
        let response = self.handle_response_status(response).await?;
        self.parse_response(response).await
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Wire Types
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    model: String,
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct WireChoiceMessage {
    content: Option<String>,
}
