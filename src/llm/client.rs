//! HTTP client for hosted chat-completion endpoints.
//!
//! One POST per call, a fixed 120-second timeout and no retry: every
//! failure is terminal for the current invocation.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{
    ApiFormat, COMPLETION_TIMEOUT_SECS, CompletionConfig, Credential, CredentialProvider,
};
use crate::error::{CompletionError, ConfigError};

use super::reply::{StructuredReply, parse_structured_reply};

/// Sampling temperature for every request.
const TEMPERATURE: f32 = 0.2;

/// Output budget for the `messages` wire format.
const MAX_TOKENS: u32 = 4096;

/// Version header required by the `messages` wire format.
const MESSAGES_API_VERSION: &str = "2023-06-01";

/// A system instruction plus the user content it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// A completion backend.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `prompt` and return the model's text reply.
    async fn complete(&self, prompt: &Prompt) -> Result<String, CompletionError>;

    /// Send `prompt` and parse the reply as `{subject, body, rating}`.
    async fn complete_structured(
        &self,
        prompt: &Prompt,
    ) -> Result<StructuredReply, CompletionError> {
        let text = self.complete(prompt).await?;
        parse_structured_reply(&text)
    }
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Completion client speaking either supported wire format over HTTPS.
pub struct HttpCompletionClient {
    http: reqwest::Client,
    config: CompletionConfig,
    api_key: String,
}

impl std::fmt::Debug for HttpCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCompletionClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpCompletionClient {
    /// Build a client, resolving the credential up front.
    ///
    /// A missing credential is reported here, before any request or
    /// repository side effect.
    pub fn new(
        config: CompletionConfig,
        credentials: &dyn CredentialProvider,
    ) -> Result<Self, ConfigError> {
        let api_key = match credentials.resolve() {
            Credential::Present(key) => key,
            Credential::Missing { variable } => {
                return Err(ConfigError::MissingCredential { variable });
            }
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(COMPLETION_TIMEOUT_SECS))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    fn request(&self, prompt: &Prompt) -> reqwest::RequestBuilder {
        let builder = self.http.post(&self.config.api_url);
        match self.config.format {
            ApiFormat::Chat => builder
                .bearer_auth(&self.api_key)
                .header("HTTP-Referer", "http://localhost")
                .header("X-Title", "gitgenie")
                .json(&ChatRequest {
                    model: &self.config.model,
                    messages: wire_messages(prompt, true),
                    temperature: TEMPERATURE,
                }),
            ApiFormat::Messages => builder
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", MESSAGES_API_VERSION)
                .json(&MessagesRequest {
                    model: &self.config.model,
                    max_tokens: MAX_TOKENS,
                    temperature: TEMPERATURE,
                    system: &prompt.system,
                    messages: wire_messages(prompt, false),
                }),
        }
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String, CompletionError> {
        debug!(
            "Requesting completion from {} (model {}, prompt {} chars)",
            self.config.api_url,
            self.config.model,
            prompt.system.len() + prompt.user.len()
        );

        let response = self.request(prompt).send().await.map_err(map_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport)?;

        if !status.is_success() {
            return Err(CompletionError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let text = match self.config.format {
            ApiFormat::Chat => chat_text(&body)?,
            ApiFormat::Messages => messages_text(&body)?,
        };

        Ok(text.trim().to_string())
    }
}

fn wire_messages(prompt: &Prompt, with_system: bool) -> Vec<WireMessage<'_>> {
    let mut messages = Vec::with_capacity(2);
    if with_system {
        messages.push(WireMessage {
            role: "system",
            content: &prompt.system,
        });
    }
    messages.push(WireMessage {
        role: "user",
        content: &prompt.user,
    });
    messages
}

fn map_transport(err: reqwest::Error) -> CompletionError {
    if err.is_timeout() {
        CompletionError::Timeout(COMPLETION_TIMEOUT_SECS)
    } else {
        CompletionError::Transport(err)
    }
}

fn chat_text(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| CompletionError::Parse(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| CompletionError::Parse("choices[0].message.content".to_string()))
}

fn messages_text(body: &str) -> Result<String, CompletionError> {
    let parsed: MessagesResponse =
        serde_json::from_str(body).map_err(|e| CompletionError::Parse(e.to_string()))?;

    parsed
        .content
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
        .ok_or_else(|| CompletionError::Parse("content[].text".to_string()))
}
