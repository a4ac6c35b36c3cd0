//! Client for the OpenAI chat-completions endpoint.
//!
//! One request per submission: the full conversation history goes out, one
//! assistant reply comes back. No retries, no streaming, no cancellation.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conversation::{Message, Role};
use crate::error::ChatError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Cap on generated tokens per reply.
const MAX_COMPLETION_TOKENS: u32 = 500;

const NO_RESPONSE_FALLBACK: &str = "No response generated";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    max_completion_tokens: u32,
}

/// Wire form of one history entry. The endpoint also accepts a `system`
/// role; this client never sends one.
#[derive(Serialize)]
struct ApiMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAIClient {
    pub fn new(api_key: Option<String>, base_url: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send the full history and return the next assistant reply.
    ///
    /// Roles pass through unchanged and order is preserved. A missing API
    /// key fails before any request is made.
    pub async fn complete(&self, history: &[Message]) -> Result<String, ChatError> {
        let api_key = self.api_key.as_deref().ok_or(ChatError::MissingApiKey)?;

        let request = build_request(&self.model, history);
        let url = format!("{}/v1/chat/completions", self.base_url);

        debug!(model = %self.model, turns = history.len(), "requesting completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(ChatError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let body: ApiErrorBody = response.json().await.unwrap_or_default();
            return Err(ChatError::Api(service_error_message(&body, status)));
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Unexpected(e.into()))?;

        Ok(first_choice_text(response))
    }
}

fn build_request<'a>(model: &'a str, history: &'a [Message]) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: history
            .iter()
            .map(|m| ApiMessage {
                role: m.role,
                content: &m.content,
            })
            .collect(),
        max_completion_tokens: MAX_COMPLETION_TOKENS,
    }
}

/// Message for a non-success status: the service's structured error text
/// when present, otherwise a synthesized "reason (code)" string.
fn service_error_message(body: &ApiErrorBody, status: StatusCode) -> String {
    body.error
        .as_ref()
        .and_then(|e| e.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            format!(
                "API error: {} ({})",
                status.canonical_reason().unwrap_or("unknown"),
                status.as_u16()
            )
        })
}

/// Reply text of the first choice; absent or empty content collapses to a
/// fixed fallback string.
fn first_choice_text(response: ChatResponse) -> String {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NO_RESPONSE_FALLBACK.to_string())
}
