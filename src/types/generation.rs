//! Generations and generation-level metadata.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::message::AssistantMessage;

/// Why generation finished.
///
/// Known reasons map to dedicated variants; anything else a provider reports
/// (`end_turn`, `max_tokens`, ...) is kept verbatim in [`FinishReason::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Error,
    Other(String),
}

impl FinishReason {
    /// Parse a provider-reported reason. Known values match case-insensitively;
    /// unknown values are kept as reported (trimmed).
    pub fn from_provider(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.to_ascii_lowercase().as_str() {
            "stop" => Self::Stop,
            "length" => Self::Length,
            "tool_calls" => Self::ToolCalls,
            "content_filter" => Self::ContentFilter,
            "error" => Self::Error,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::ToolCalls => "tool_calls",
            Self::ContentFilter => "content_filter",
            Self::Error => "error",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FinishReason {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_provider(raw))
    }
}

impl From<String> for FinishReason {
    fn from(raw: String) -> Self {
        Self::from_provider(&raw)
    }
}

impl From<FinishReason> for String {
    fn from(reason: FinishReason) -> Self {
        match reason {
            FinishReason::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Finish reason plus provider-specific extras for one generation.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extras: HashMap<String, serde_json::Value>,
}

impl GenerationMetadata {
    pub fn finished(reason: FinishReason) -> Self {
        Self {
            finish_reason: Some(reason),
            extras: HashMap::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    /// True for the "no metadata" placeholder some providers attach to every chunk.
    pub fn is_empty(&self) -> bool {
        self.finish_reason.is_none() && self.extras.is_empty()
    }
}

/// One candidate output of a model call.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    pub output: AssistantMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<GenerationMetadata>,
}

impl Generation {
    pub fn new(output: AssistantMessage) -> Self {
        Self {
            output,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: GenerationMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.metadata.as_ref().and_then(|m| m.finish_reason.clone())
    }
}
