//! Chat-completions adapter for the external text-generation service.
//!
//! Speaks the OpenAI-compatible chat API: a system message plus a user
//! message, non-streaming, with a bounded request timeout. Endpoint and
//! credential come from the environment; when either is missing the
//! narrative layer runs fallback-only.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ports::{TextGenError, TextGenerator};

const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Connection settings for the text-generation endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Full chat-completions URL.
    pub api_url: String,
    /// Bearer credential.
    pub api_key: String,
    /// Upstream model identifier.
    pub model: String,
    /// Hard cap on one request, connection setup included.
    pub timeout: Duration,
}

impl LlmConfig {
    /// Read the configuration from `VITALREC_LLM_*` environment variables.
    ///
    /// Returns `None` when the URL or key is unset or empty: the service is
    /// then treated as not configured rather than misconfigured.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_url = non_empty_env("VITALREC_LLM_API_URL")?;
        let api_key = non_empty_env("VITALREC_LLM_API_KEY")?;

        let model =
            non_empty_env("VITALREC_LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let timeout_secs = std::env::var("VITALREC_LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Some(Self {
            api_url,
            api_key,
            model,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// HTTP client for the chat-completions endpoint.
pub struct ChatClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl ChatClient {
    /// Build a client with the request timeout baked in.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: LlmConfig) -> crate::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    fn request_body<'a>(&'a self, system: &'a str, user: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.3,
            max_tokens: 300,
            top_p: 1.0,
            stream: false,
        }
    }
}

#[async_trait]
impl TextGenerator for ChatClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, TextGenError> {
        let body = self.request_body(system, user);

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TextGenError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TextGenError::Status(status.as_u16()));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| TextGenError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| TextGenError::Malformed("response carries no choices".to_string()))
    }
}
