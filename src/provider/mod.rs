//! Streaming chat model trait and the observing wrapper around it.

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::config::AggregatorConfig;
use crate::error::{Result, RillError};
use crate::observation::ChatObservation;
use crate::types::{ChatResponse, ChatStream, ModelMessage};
use crate::util::usage::UsageTracker;

/// A request sent to a model provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub messages: Vec<ModelMessage>,
}

impl Prompt {
    pub fn new(messages: Vec<ModelMessage>) -> Self {
        Self { messages }
    }

    /// A prompt with a single user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(vec![ModelMessage::user(text)])
    }
}

/// Core trait implemented by streaming model providers.
///
/// Implementations deliver one [`ChatResponse`] per chunk received from the
/// provider, already decoded from its wire format.
#[async_trait]
pub trait StreamingChatModel: Send + Sync {
    /// Provider name (e.g., "openai", "anthropic").
    fn provider_name(&self) -> &str;

    /// Start a streaming exchange.
    async fn stream(&self, prompt: &Prompt) -> Result<ChatStream>;
}

/// A provider stream wrapped for aggregation, plus the observation that
/// receives its complete response.
pub struct ObservedStream {
    pub stream: ChatStream,
    pub observation: ChatObservation,
}

/// Wraps a [`StreamingChatModel`] so that every stream it produces is
/// aggregated, observed and counted.
pub struct ObservedChatModel<M> {
    model: M,
    config: AggregatorConfig,
    usage: UsageTracker,
}

impl<M: StreamingChatModel> ObservedChatModel<M> {
    pub fn new(model: M) -> Self {
        Self::with_config(model, AggregatorConfig::default())
    }

    pub fn with_config(model: M, config: AggregatorConfig) -> Self {
        Self {
            model,
            config,
            usage: UsageTracker::new(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Usage summed over every completed stream.
    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    /// Start a stream whose increments pass through unchanged and whose
    /// complete response is recorded on the returned observation.
    pub async fn stream(&self, prompt: &Prompt) -> Result<ObservedStream> {
        let provider = self.model.provider_name().to_string();
        let observation = ChatObservation::start(provider.as_str());

        let source = match self.model.stream(prompt).await {
            Ok(source) => source,
            Err(e) => {
                observation.record_error(&e);
                return Err(e);
            }
        };

        let on_error = observation.clone();
        let source = source.inspect(move |item| {
            if let Err(e) = item {
                on_error.record_error(e);
            }
        });

        let record = observation.recorder();
        let usage = self.usage.clone();
        let stream = self
            .config
            .aggregator_for(&provider)
            .aggregate(source, move |aggregate: ChatResponse| {
                usage.record_response(&aggregate);
                record(aggregate);
            });

        Ok(ObservedStream {
            stream,
            observation,
        })
    }

    /// Stream to completion and return the complete response.
    pub async fn call(&self, prompt: &Prompt) -> Result<ChatResponse> {
        let ObservedStream {
            mut stream,
            observation,
        } = self.stream(prompt).await?;

        while let Some(item) = stream.next().await {
            item?;
        }

        observation
            .response()
            .ok_or_else(|| RillError::Stream("stream ended without an aggregate".into()))
    }
}
