//! OpenAI-compatible chat completions backend
//!
//! Groq and OpenAI expose the same request and response shapes; a
//! [`ProviderProfile`] carries the differences.

use adsage_config::Config;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::GenerationError;
use crate::transport::{Disposition, RetryPolicy, classify, redact};
use crate::types::{GenerationBackend, GenerationRequest, GenerationResponse, Message};

/// Temperature ceiling for structured stages on providers without JSON mode.
const JSON_FALLBACK_TEMPERATURE: f32 = 0.05;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Static description of an OpenAI-compatible provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderProfile {
    pub name: &'static str,
    pub default_base_url: &'static str,
    pub default_api_key_env: &'static str,
    /// Fixed default model; `None` means use `[model] name`
    pub default_model: Option<&'static str>,
    pub supports_json_mode: bool,
}

impl ProviderProfile {
    pub const GROQ: Self = Self {
        name: "groq",
        default_base_url: "https://api.groq.com/openai/v1/chat/completions",
        default_api_key_env: "GROQ_API_KEY",
        default_model: Some("llama-3.3-70b-versatile"),
        supports_json_mode: false,
    };

    pub const OPENAI: Self = Self {
        name: "openai",
        default_base_url: "https://api.openai.com/v1/chat/completions",
        default_api_key_env: "OPENAI_API_KEY",
        default_model: None,
        supports_json_mode: true,
    };
}

#[derive(Clone)]
pub struct ChatCompletionsBackend {
    client: Client,
    retry: RetryPolicy,
    profile: ProviderProfile,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl std::fmt::Debug for ChatCompletionsBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsBackend")
            .field("provider", &self.profile.name)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl ChatCompletionsBackend {
    /// # Errors
    ///
    /// Returns `GenerationError::Misconfiguration` if the HTTP client cannot be constructed
    pub fn new(
        profile: ProviderProfile,
        api_key: String,
        base_url: Option<String>,
        model: String,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| {
                GenerationError::Misconfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            retry: RetryPolicy::DEFAULT,
            profile,
            base_url: base_url.unwrap_or_else(|| profile.default_base_url.to_string()),
            api_key,
            model,
            timeout,
        })
    }

    /// Build the backend for `profile`, reading its API key through `lookup_env`.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Misconfiguration` if the key variable is unset
    /// or empty.
    pub fn from_config(
        profile: ProviderProfile,
        config: &Config,
        lookup_env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, GenerationError> {
        let settings = match profile.name {
            "groq" => &config.llm.groq,
            _ => &config.llm.openai,
        };

        let api_key_env = settings
            .api_key_env
            .as_deref()
            .unwrap_or(profile.default_api_key_env);
        let api_key = lookup_env(api_key_env)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                GenerationError::Misconfiguration(format!(
                    "{} API key not found in environment variable '{api_key_env}'",
                    profile.name
                ))
            })?;

        let model = settings
            .model
            .clone()
            .or_else(|| profile.default_model.map(str::to_string))
            .unwrap_or_else(|| config.model.name.clone());

        Self::new(
            profile,
            api_key,
            settings.base_url.clone(),
            model,
            Duration::from_secs(config.llm.timeout_secs),
        )
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Effective temperature and response format for a request.
    fn resolve_sampling(&self, request: &GenerationRequest) -> (f32, Option<ResponseFormat>) {
        let temperature = request.sampling.temperature;
        match (request.json_mode, self.profile.supports_json_mode) {
            (true, true) => (
                temperature,
                Some(ResponseFormat {
                    kind: "json_object",
                }),
            ),
            (true, false) => (temperature.min(JSON_FALLBACK_TEMPERATURE), None),
            (false, _) => (temperature, None),
        }
    }

    /// POST `body`, retrying server errors and network failures per `self.retry`.
    async fn send(&self, body: &ChatRequest<'_>) -> Result<Response, GenerationError> {
        let provider = self.profile.name;
        let mut retry = 0;

        loop {
            let sent = self
                .client
                .post(&self.base_url)
                .bearer_auth(&self.api_key)
                .timeout(self.timeout)
                .json(body)
                .send()
                .await;

            let failure = match sent {
                Ok(response) => match classify(response.status(), provider) {
                    Disposition::Accept => return Ok(response),
                    Disposition::Fail(err) => return Err(err),
                    Disposition::Retry => GenerationError::ProviderOutage(format!(
                        "{provider} returned {}",
                        response.status()
                    )),
                },
                Err(e) if e.is_timeout() => {
                    return Err(GenerationError::Timeout {
                        duration: self.timeout,
                    });
                }
                Err(e) => GenerationError::Transport(format!(
                    "{provider} request failed: {}",
                    redact(&e.to_string())
                )),
            };

            retry += 1;
            let Some(delay) = self.retry.delay(retry) else {
                return Err(failure);
            };
            warn!(provider, retry, error = %failure, "Chat completion failed, retrying");
            tokio::time::sleep(delay).await;
        }
    }

    fn convert_messages(messages: &[Message]) -> Vec<ChatMessage> {
        messages
            .iter()
            .map(|msg| ChatMessage {
                role: msg.role.as_str(),
                content: msg.content.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl GenerationBackend for ChatCompletionsBackend {
    fn name(&self) -> &str {
        self.profile.name
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let (temperature, response_format) = self.resolve_sampling(&request);

        debug!(
            provider = self.profile.name,
            model = %self.model,
            stage = %request.stage,
            temperature,
            max_tokens = request.sampling.max_output_tokens,
            json_mode = response_format.is_some(),
            "Invoking chat completions backend"
        );

        let body = ChatRequest {
            model: &self.model,
            messages: Self::convert_messages(&request.messages()),
            max_tokens: request.sampling.max_output_tokens,
            temperature,
            response_format,
            stream: false,
        };

        let response = self.send(&body).await?;

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            GenerationError::Transport(format!(
                "Failed to parse {} response: {e}",
                self.profile.name
            ))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| GenerationError::EmptyResponse(self.profile.name.to_string()))?;

        let mut result = GenerationResponse::new(content, self.profile.name, self.model.clone());
        if let Some(usage) = parsed.usage {
            result.tokens_input = Some(usage.prompt_tokens);
            result.tokens_output = Some(usage.completion_tokens);
        }

        debug!(
            provider = self.profile.name,
            stage = %request.stage,
            tokens_input = ?result.tokens_input,
            tokens_output = ?result.tokens_output,
            "Chat completion received"
        );

        Ok(result)
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
