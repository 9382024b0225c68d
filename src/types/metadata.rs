//! Response-level metadata: usage, rate limits, prompt filtering.

use std::collections::HashMap;
use std::time::Duration;

use bon::Builder;
use serde::{Deserialize, Serialize};

use super::message::ToolCall;
use super::usage::Usage;

/// Rate-limit state reported by a provider alongside a response.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RateLimit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_remaining: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_reset: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_remaining: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_reset: Option<Duration>,
}

impl RateLimit {
    /// True when the provider sent a descriptor without any value in it.
    pub fn is_empty(&self) -> bool {
        self.requests_limit.is_none()
            && self.requests_remaining.is_none()
            && self.requests_reset.is_none()
            && self.tokens_limit.is_none()
            && self.tokens_remaining.is_none()
            && self.tokens_reset.is_none()
    }
}

/// Content-filter results for one prompt of the request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptFilterMetadata {
    pub prompt_index: u32,
    #[serde(default)]
    pub content_filter_metadata: serde_json::Value,
}

impl PromptFilterMetadata {
    pub fn new(prompt_index: u32, content_filter_metadata: serde_json::Value) -> Self {
        Self {
            prompt_index,
            content_filter_metadata,
        }
    }
}

/// Prompt-level metadata, one entry per prompt.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(transparent)]
pub struct PromptMetadata(pub Vec<PromptFilterMetadata>);

impl PromptMetadata {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PromptFilterMetadata> {
        self.0.iter()
    }

    /// Filter metadata for the prompt at `index`, if reported.
    pub fn find_by_index(&self, index: u32) -> Option<&PromptFilterMetadata> {
        self.0.iter().find(|m| m.prompt_index == index)
    }
}

impl From<Vec<PromptFilterMetadata>> for PromptMetadata {
    fn from(entries: Vec<PromptFilterMetadata>) -> Self {
        Self(entries)
    }
}

/// Metadata about a whole response (or one streamed increment of it).
#[derive(Debug, Clone, Builder, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    #[builder(into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[builder(into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimit>,
    #[builder(default)]
    #[serde(default, skip_serializing_if = "PromptMetadata::is_empty")]
    pub prompt_metadata: PromptMetadata,
    /// Provider-specific entries not covered by the typed fields.
    /// An aggregate holds the last value seen per key.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extras: HashMap<String, serde_json::Value>,
}

/// Extras key under which some adapters report tool calls at the response level.
pub const TOOL_CALLS_KEY: &str = "toolCalls";

impl ResponseMetadata {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.extras.get(key)
    }

    /// Tool calls reported under [`TOOL_CALLS_KEY`].
    ///
    /// `None` when the key is absent; `Some(Err)` when it is present but does
    /// not decode as a list of tool calls.
    pub fn tool_calls(&self) -> Option<Result<Vec<ToolCall>, serde_json::Error>> {
        self.extras
            .get(TOOL_CALLS_KEY)
            .map(|value| serde_json::from_value(value.clone()))
    }
}
