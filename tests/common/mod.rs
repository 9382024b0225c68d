//! Shared test helpers: scripted increments and a mock streaming model.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{self, BoxStream};

use rill::error::RillError;
use rill::provider::{Prompt, StreamingChatModel};
use rill::types::*;

/// Increment carrying only a text delta.
pub fn text(delta: &str) -> ChatResponse {
    ChatResponse::text_delta(delta)
}

/// Increment carrying only usage.
pub fn usage(prompt: u32, completion: u32, total: u32) -> ChatResponse {
    ChatResponse::default().with_metadata(
        ResponseMetadata::builder()
            .usage(Usage::new(prompt, completion, total))
            .build(),
    )
}

/// Increment carrying a text delta and one message metadata entry.
pub fn with_message_metadata(delta: &str, key: &str, value: serde_json::Value) -> ChatResponse {
    ChatResponse::new(vec![Generation::new(
        AssistantMessage::new(delta).with_metadata(key, value),
    )])
}

/// A finite source over `items`.
pub fn source(
    items: Vec<Result<ChatResponse, RillError>>,
) -> BoxStream<'static, Result<ChatResponse, RillError>> {
    Box::pin(stream::iter(items))
}

/// Completion callback sink that counts and keeps every aggregate.
#[derive(Clone, Default)]
pub struct Captured {
    inner: Arc<Mutex<Vec<ChatResponse>>>,
}

impl Captured {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sink(&self) -> impl Fn(ChatResponse) + Send + Sync + 'static {
        let inner = self.inner.clone();
        move |response| inner.lock().unwrap().push(response)
    }

    pub fn count(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<ChatResponse> {
        self.inner.lock().unwrap().clone()
    }

    pub fn last(&self) -> ChatResponse {
        self.inner
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no aggregate captured")
    }
}

/// A mock model that replays a fixed script of increments on every call.
pub struct ScriptedModel {
    provider: String,
    script: Vec<ChatResponse>,
    fail_at: Option<usize>,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedModel {
    pub fn new(provider: &str, script: Vec<ChatResponse>) -> Self {
        Self {
            provider: provider.to_string(),
            script,
            fail_at: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fail with a server error instead of emitting the increment at `index`.
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl StreamingChatModel for ScriptedModel {
    fn provider_name(&self) -> &str {
        &self.provider
    }

    async fn stream(&self, prompt: &Prompt) -> Result<ChatStream, RillError> {
        self.prompts.lock().unwrap().push(prompt.clone());

        let script = self.script.clone();
        let fail_at = self.fail_at;
        let stream = async_stream::stream! {
            for (index, increment) in script.into_iter().enumerate() {
                if Some(index) == fail_at {
                    yield Err(RillError::api(503, "upstream unavailable"));
                    break;
                }
                yield Ok(increment);
            }
        };

        Ok(Box::pin(stream))
    }
}
