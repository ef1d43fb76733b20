//! OpenAI-compatible chat-completions client (OpenRouter by default).

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ai::AiCollaborator;
use crate::ai::retry::{RetryPolicy, retry_with_backoff};
use crate::config::AiSettings;
use crate::error::AiError;
use crate::prompt::PromptRequest;

/// Longest error body kept in an error message.
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Serialize, Debug)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    /// Some gateways report upstream failures with HTTP 200.
    error: Option<ErrorBody>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    message: Option<String>,
    code: Option<serde_json::Value>,
}

/// Chat-completions client bound to one endpoint and model.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    settings: AiSettings,
    retry: RetryPolicy,
}

impl ChatClient {
    pub fn new(settings: AiSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    /// One HTTP round trip, without retry or timeout.
    async fn send_once(&self, request: &PromptRequest) -> Result<String, AiError> {
        let body = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.user,
                },
            ],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            stream: false,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .header("X-Title", "commitsmith")
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, &text));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponse(e.to_string()))?;

        if parsed.choices.is_empty()
            && let Some(error) = parsed.error
        {
            let status = error
                .code
                .as_ref()
                .and_then(serde_json::Value::as_u64)
                .and_then(|c| u16::try_from(c).ok())
                .and_then(|c| StatusCode::from_u16(c).ok())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            return Err(status_error(status, &error.message.unwrap_or_default()));
        }

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(AiError::EmptyCompletion);
        }

        debug!(response_len = content.len(), "Received completion");
        Ok(content)
    }
}

#[async_trait]
impl AiCollaborator for ChatClient {
    async fn complete(&self, request: &PromptRequest) -> Result<String, AiError> {
        info!(
            model = %self.settings.model,
            url = %self.endpoint(),
            language = %request.language,
            "Requesting commit message suggestion"
        );
        debug!(
            system_prompt_len = request.system.len(),
            user_prompt_len = request.user.len(),
            "Prompt sizes"
        );

        let timeout = self.settings.timeout;
        let attempts = retry_with_backoff(
            self.retry,
            || self.send_once(request),
            AiError::is_retryable,
            |e| AiError::RetriesExhausted(Box::new(e)),
        );

        tokio::time::timeout(timeout, attempts)
            .await
            .map_err(|_| AiError::Timeout(timeout.as_secs()))?
    }
}

fn status_error(status: StatusCode, body: &str) -> AiError {
    let body: String = body.trim().chars().take(MAX_ERROR_BODY_LENGTH).collect();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AiError::Unauthorized(status.as_u16()),
        StatusCode::TOO_MANY_REQUESTS => AiError::RateLimited(body),
        _ => AiError::Http {
            status: status.as_u16(),
            body,
        },
    }
}
