//! Hosted chat-completion backend (OpenAI-compatible API).

use crate::backend::{GenerationRequest, GenerativeBackend, Tuning};
use crate::config::{LengthBounds, Settings, DEFAULT_TEMPERATURE, OPENAI_API_KEY_VAR};
use crate::error::BackendError;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Blocking client for the chat-completions endpoint, shared by the hosted
/// summarizer and the translator.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, BackendError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    /// Fails fast when no API key is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self, BackendError> {
        let api_key = settings
            .openai_api_key
            .clone()
            .ok_or(BackendError::MissingCredential(OPENAI_API_KEY_VAR))?;
        Self::new(api_key, settings.openai_base_url(), settings.openai_model())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// One system + user exchange; returns the trimmed reply.
    pub fn chat(&self, system: &str, user: &str, temperature: f32) -> Result<String, BackendError> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            temperature,
        };

        debug!(model = %self.model, chars = user.len(), "chat completion request");
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response.json()?;
        first_choice_text(parsed)
    }
}

fn first_choice_text(response: ChatCompletionResponse) -> Result<String, BackendError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(BackendError::EmptyResponse)
}

fn summary_prompt(bounds: LengthBounds) -> String {
    format!(
        "You are a professional summarizer. Summarize the given Korean or English text \
         concisely and accurately. Aim for roughly {}-{} words.",
        bounds.min_length, bounds.max_length
    )
}

/// Single-shot hosted summarizer.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: OpenAiClient,
}

impl OpenAiBackend {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

impl GenerativeBackend for OpenAiBackend {
    fn name(&self) -> &str {
        self.client.model()
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, BackendError> {
        let temperature = match request.tuning {
            Tuning::Sampling { temperature } => temperature,
            Tuning::Beam(_) => DEFAULT_TEMPERATURE,
        };
        self.client
            .chat(&summary_prompt(request.bounds), request.text, temperature)
    }
}
