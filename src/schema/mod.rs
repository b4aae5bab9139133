//! GraphQL schema for the relay.
//!
//! Exposes a single query field, `chat`, which forwards the conversation to
//! the configured completion provider. All relay failures are rendered as
//! in-band strings so the field never produces a GraphQL error.

use crate::services::providers::{ChatMessage, ChatRequest, CompletionError, CompletionProvider};
use async_graphql::{Context, EmptyMutation, EmptySubscription, InputObject, Object, Schema};
use std::sync::Arc;

/// User-facing string for an upstream rejection, embedding status and body.
fn upstream_failure(status: u16, body: &str) -> String {
    format!("❌ OpenAI API 请求失败: {} - {}", status, body)
}

/// User-facing string when the upstream reply carried no content.
const NO_RESULT: &str = "⚠️ OpenAI 无返回结果";

/// User-facing string for transport-level failures.
const REQUEST_FAILED: &str = "❗ OpenAI 请求异常，请检查网络或 API Key";

pub type RelaySchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

#[derive(InputObject)]
pub struct MessageInput {
    pub role: String,
    pub content: String,
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Forward the conversation to the completion endpoint and return the
    /// reply text, or a descriptive error string.
    async fn chat(
        &self,
        ctx: &Context<'_>,
        model: String,
        messages: Vec<MessageInput>,
    ) -> Option<String> {
        let provider = ctx.data_unchecked::<Arc<dyn CompletionProvider>>();

        let request = ChatRequest {
            model,
            messages: messages
                .into_iter()
                .map(|m| ChatMessage {
                    role: m.role,
                    content: m.content,
                })
                .collect(),
        };

        let reply = match provider.complete(&request).await {
            Ok(content) => content,
            Err(CompletionError::Upstream { status, body }) => upstream_failure(status, &body),
            Err(CompletionError::NoContent) => NO_RESULT.to_string(),
            Err(CompletionError::Transport(detail)) => {
                tracing::error!(error = %detail, "Chat completion request failed");
                REQUEST_FAILED.to_string()
            }
        };

        Some(reply)
    }
}

pub fn build_schema(provider: Arc<dyn CompletionProvider>) -> RelaySchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(provider)
        .finish()
}
