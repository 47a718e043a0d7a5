//! Core types for the text generation abstraction

use adsage_contracts::Stage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::GenerationError;

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

/// Sampling settings for one generation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl SamplingParams {
    #[must_use]
    pub const fn new(temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            temperature,
            max_output_tokens,
        }
    }
}

/// Input to a generation backend
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Stage issuing the call, for logging and test doubles
    pub stage: Stage,
    pub system_instructions: String,
    /// Ordered conversation after the system instructions
    pub conversation: Vec<Message>,
    pub sampling: SamplingParams,
    /// Ask the provider for a JSON object response where supported
    pub json_mode: bool,
}

impl GenerationRequest {
    #[must_use]
    pub fn new(
        stage: Stage,
        system_instructions: impl Into<String>,
        user_content: impl Into<String>,
        sampling: SamplingParams,
    ) -> Self {
        Self {
            stage,
            system_instructions: system_instructions.into(),
            conversation: vec![Message::user(user_content)],
            sampling,
            json_mode: false,
        }
    }

    #[must_use]
    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }

    /// System instructions followed by the conversation.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.conversation.len() + 1);
        if !self.system_instructions.is_empty() {
            messages.push(Message::new(Role::System, self.system_instructions.clone()));
        }
        messages.extend(self.conversation.iter().cloned());
        messages
    }
}

/// Result of a generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Raw generated text, not yet normalized
    pub content: String,
    pub provider: String,
    pub model: String,
    pub tokens_input: Option<u64>,
    pub tokens_output: Option<u64>,
}

impl GenerationResponse {
    #[must_use]
    pub fn new(
        content: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            provider: provider.into(),
            model: model.into(),
            tokens_input: None,
            tokens_output: None,
        }
    }
}

/// Trait for text generation backends
///
/// Stage adapters receive one shared backend, resolved once at process start,
/// and never know which provider sits behind it.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Provider name used in logs
    fn name(&self) -> &str;

    /// Generate text for the given request
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` for any failure, including transport errors,
    /// provider rejections, timeouts and empty responses.
    async fn generate(&self, request: GenerationRequest)
    -> Result<GenerationResponse, GenerationError>;
}
