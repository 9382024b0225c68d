//! Chat responses and the streams that carry them.

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use super::generation::{FinishReason, Generation};
use super::metadata::ResponseMetadata;
use super::message::AssistantMessage;
use crate::error::RillError;

/// A model response. When streaming, each item is one increment of the
/// eventual response.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    #[serde(default)]
    pub generations: Vec<Generation>,
    #[serde(default)]
    pub metadata: ResponseMetadata,
}

impl ChatResponse {
    pub fn new(generations: Vec<Generation>) -> Self {
        Self {
            generations,
            metadata: ResponseMetadata::default(),
        }
    }

    /// A single-generation response with text only.
    pub fn text_delta(text: impl Into<String>) -> Self {
        Self::new(vec![Generation::new(AssistantMessage::new(text))])
    }

    pub fn with_metadata(mut self, metadata: ResponseMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// The first generation, if any.
    pub fn result(&self) -> Option<&Generation> {
        self.generations.first()
    }

    /// Text of the first generation, or `""`.
    pub fn text(&self) -> &str {
        self.result().map(|g| g.output.text()).unwrap_or_default()
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.result().and_then(Generation::finish_reason)
    }
}

/// Stream of response increments as produced by a provider.
pub type ChatStream = BoxStream<'static, Result<ChatResponse, RillError>>;
