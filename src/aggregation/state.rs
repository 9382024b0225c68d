//! Per-subscription accumulator for streamed responses.

use std::collections::HashMap;

use crate::types::{
    AssistantMessage, ChatResponse, Generation, GenerationMetadata, PromptMetadata, RateLimit,
    ResponseMetadata, ToolCall, Usage, TOOL_CALLS_KEY,
};

use super::tool_calls::{has_text, merge_tool_calls};
use super::{AggregationOptions, RateLimitPolicy};

/// Everything learned so far from one stream of increments.
///
/// Owned by a single subscription; increments are folded in one at a time
/// with [`merge`](Self::merge) and the aggregate is taken with
/// [`finish`](Self::finish).
#[derive(Debug, Clone, Default)]
pub struct AggregationState {
    options: AggregationOptions,
    text: String,
    message_metadata: HashMap<String, serde_json::Value>,
    tool_calls: Vec<ToolCall>,
    generation_metadata: Option<GenerationMetadata>,
    usage: Usage,
    prompt_metadata: Option<PromptMetadata>,
    rate_limit: Option<RateLimit>,
    id: Option<String>,
    model: Option<String>,
    extras: HashMap<String, serde_json::Value>,
    increments: usize,
}

impl AggregationState {
    pub fn new(options: AggregationOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Fold one increment into the accumulator.
    pub fn merge(&mut self, response: &ChatResponse) {
        self.increments += 1;

        if let Some(generation) = response.result() {
            if let Some(metadata) = generation.metadata.as_ref().filter(|m| !m.is_empty()) {
                self.generation_metadata = Some(metadata.clone());
            }

            let output = &generation.output;
            if let Some(text) = &output.text {
                self.text.push_str(text);
            }
            self.message_metadata.extend(
                output
                    .metadata
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone())),
            );
            if !output.tool_calls.is_empty() {
                self.absorb_tool_calls(&output.tool_calls);
            }
        }

        self.merge_response_metadata(&response.metadata);
    }

    fn merge_response_metadata(&mut self, metadata: &ResponseMetadata) {
        if let Some(usage) = &metadata.usage {
            self.usage.reconcile(usage);
        }

        if self.prompt_metadata.is_none() && !metadata.prompt_metadata.is_empty() {
            self.prompt_metadata = Some(metadata.prompt_metadata.clone());
        }

        if let Some(rate_limit) = metadata.rate_limit.as_ref().filter(|r| !r.is_empty()) {
            let accept = match self.options.rate_limit_policy {
                RateLimitPolicy::Latest => true,
                RateLimitPolicy::FirstWins => self.rate_limit.is_none(),
            };
            if accept {
                self.rate_limit = Some(rate_limit.clone());
            }
        }

        if let Some(id) = metadata.id.as_deref().filter(|s| has_text(s)) {
            self.id = Some(id.to_string());
        }
        if let Some(model) = metadata.model.as_deref().filter(|s| has_text(s)) {
            self.model = Some(model.to_string());
        }

        self.extras.extend(
            metadata
                .extras
                .iter()
                .filter(|(key, _)| key.as_str() != TOOL_CALLS_KEY)
                .map(|(key, value)| (key.clone(), value.clone())),
        );

        match metadata.tool_calls() {
            Some(Ok(calls)) => self.tool_calls.extend(calls),
            Some(Err(error)) => {
                tracing::warn!(
                    error = %error,
                    increment = self.increments,
                    "Skipping malformed tool calls in response metadata"
                );
            }
            None => {}
        }
    }

    fn absorb_tool_calls(&mut self, calls: &[ToolCall]) {
        if self.options.merge_tool_calls {
            merge_tool_calls(&mut self.tool_calls, calls);
        } else {
            self.tool_calls.extend_from_slice(calls);
        }
    }

    /// Build the aggregate and reset to an empty state with the same options.
    pub fn finish(&mut self) -> ChatResponse {
        let options = self.options;
        let state = std::mem::replace(self, Self::new(options));
        state.into_response()
    }

    fn into_response(self) -> ChatResponse {
        let output = AssistantMessage {
            text: Some(self.text),
            metadata: self.message_metadata,
            tool_calls: self.tool_calls,
        };
        let generation = Generation {
            output,
            metadata: self.generation_metadata,
        };
        let metadata = ResponseMetadata {
            id: self.id,
            model: self.model,
            usage: Some(self.usage.settled()),
            rate_limit: self.rate_limit,
            prompt_metadata: self.prompt_metadata.unwrap_or_default(),
            extras: self.extras,
        };

        ChatResponse {
            generations: vec![generation],
            metadata,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of increments merged since the last reset.
    pub fn increments(&self) -> usize {
        self.increments
    }

    pub fn options(&self) -> AggregationOptions {
        self.options
    }
}
