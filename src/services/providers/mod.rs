//! Completion provider abstraction and implementations.
//!
//! This module provides a trait-based abstraction for chat completion
//! backends, allowing easy swapping between the real OpenAI API and a mock.

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One role/content pair of a conversation, forwarded upstream unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Outbound request body for the chat completion API.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// Error type for completion operations.
///
/// Every variant is rendered in-band by the resolver; none of these cross
/// the GraphQL boundary as a field error.
#[derive(Error, Debug)]
pub enum CompletionError {
    /// Upstream answered with a non-success status.
    #[error("upstream rejected request: {status} - {body}")]
    Upstream { status: u16, body: String },

    /// Upstream answered 2xx but the reply text was missing or empty.
    #[error("upstream returned no content")]
    NoContent,

    /// Connection, timeout, or body decode failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Trait for chat completion providers (e.g., OpenAI).
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Forward one conversation and return the first choice's reply text.
    async fn complete(&self, request: &ChatRequest) -> Result<String, CompletionError>;
}
