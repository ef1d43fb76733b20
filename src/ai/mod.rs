//! AI completion collaborator.

pub mod client;
pub mod retry;

pub use client::ChatClient;
pub use retry::RetryPolicy;

use async_trait::async_trait;

use crate::error::AiError;
use crate::prompt::PromptRequest;

/// Anything that can turn a prompt into completion text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AiCollaborator: Send + Sync {
    async fn complete(&self, request: &PromptRequest) -> Result<String, AiError>;
}
