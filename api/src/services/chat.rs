//! Chat-completion client (OpenAI-compatible wire format, Groq by default).
//!
//! Non-streaming: one request, one complete assistant reply. Failures are
//! returned as-is; there is no retry.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::ChatMessage;

#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    completions_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

impl ChatClient {
    pub fn new(completions_url: &str, api_key: &str, model: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            completions_url: completions_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send the conversation and return the first choice as an assistant message.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatMessage, AppError> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
        };

        tracing::debug!(
            "Requesting completion from {} ({} messages)",
            self.model,
            messages.len()
        );

        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("chat completion request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_else(|e| {
                tracing::warn!("Failed to read chat completion error body: {}", e);
                String::new()
            });
            return Err(AppError::ExternalServiceError(format!(
                "chat completion returned HTTP {}: {}",
                status,
                detail.trim()
            )));
        }

        let parsed: CompletionResponse = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("chat completion JSON parse error: {}", e))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                AppError::ExternalServiceError(
                    "chat completion returned no message content".to_string(),
                )
            })?;

        Ok(ChatMessage::assistant(content))
    }
}
