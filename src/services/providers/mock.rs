//! Mock provider implementation for testing.

use super::{ChatRequest, CompletionError, CompletionProvider};
use async_trait::async_trait;
use std::sync::Mutex;

/// Scripted completion provider for testing the schema without a network.
///
/// Pops one outcome per call, in the order they were scripted.
pub struct MockCompletionProvider {
    outcomes: Mutex<Vec<Result<String, CompletionError>>>,
}

impl MockCompletionProvider {
    pub fn new(outcomes: Vec<Result<String, CompletionError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes),
        }
    }

    /// Provider that always replies with the same text.
    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, _request: &ChatRequest) -> Result<String, CompletionError> {
        let mut outcomes = self.outcomes.lock().expect("mock outcomes lock poisoned");
        if outcomes.is_empty() {
            Err(CompletionError::NoContent)
        } else {
            outcomes.remove(0)
        }
    }
}
