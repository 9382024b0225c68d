//! Streaming response aggregation.
//!
//! [`MessageAggregator`] wraps a stream of response increments. Every
//! increment is passed through untouched and, in the same step, folded into
//! an [`AggregationState`]. When the source completes normally the complete
//! response is handed to a callback, just before the wrapped stream ends.
//!
//! ```
//! use futures::StreamExt;
//! use rill::aggregation::MessageAggregator;
//! use rill::types::ChatResponse;
//!
//! # async fn example() {
//! let source = futures::stream::iter(vec![
//!     Ok::<_, std::io::Error>(ChatResponse::text_delta("Hello ")),
//!     Ok(ChatResponse::text_delta("World!")),
//! ]);
//! let mut stream = MessageAggregator::new().aggregate(source, |full| {
//!     assert_eq!(full.text(), "Hello World!");
//! });
//! while let Some(chunk) = stream.next().await {
//!     let _ = chunk;
//! }
//! # }
//! ```

pub mod state;
pub mod tool_calls;

pub use state::AggregationState;
pub use tool_calls::merge_tool_calls;

use std::fmt::Display;
use std::sync::Arc;

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumString};

use crate::types::ChatResponse;

/// How a new rate-limit descriptor is reconciled with the accumulated one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, StrumDisplay, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RateLimitPolicy {
    /// Every non-empty descriptor replaces the previous one.
    #[default]
    Latest,
    /// Only the first non-empty descriptor is kept.
    FirstWins,
}

/// Per-adapter aggregation behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationOptions {
    pub rate_limit_policy: RateLimitPolicy,
    /// Reassemble streamed tool-call fragments; when off, calls are kept as received.
    pub merge_tool_calls: bool,
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self {
            rate_limit_policy: RateLimitPolicy::Latest,
            merge_tool_calls: true,
        }
    }
}

/// Aggregates a stream of response increments into one complete response.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageAggregator {
    options: AggregationOptions,
}

impl MessageAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: AggregationOptions) -> Self {
        Self { options }
    }

    pub fn rate_limit_policy(mut self, policy: RateLimitPolicy) -> Self {
        self.options.rate_limit_policy = policy;
        self
    }

    pub fn options(&self) -> AggregationOptions {
        self.options
    }

    /// Pass `source` through unchanged while aggregating it.
    ///
    /// `on_complete` runs once, after the last increment and before the
    /// returned stream yields `None`. It does not run if the source fails or
    /// if the returned stream is dropped early. An empty source still
    /// completes with an empty aggregate.
    ///
    /// The accumulator is created on first poll, so nothing is shared between
    /// the streams returned by separate calls.
    pub fn aggregate<S, E, F>(
        &self,
        source: S,
        on_complete: F,
    ) -> BoxStream<'static, Result<ChatResponse, E>>
    where
        S: Stream<Item = Result<ChatResponse, E>> + Send + 'static,
        E: Display + Send + 'static,
        F: FnOnce(ChatResponse) + Send + 'static,
    {
        let options = self.options;
        let aggregated = async_stream::stream! {
            let mut state = AggregationState::new(options);
            let mut failed = false;
            let mut inner = std::pin::pin!(source);

            while let Some(item) = inner.next().await {
                match item {
                    Ok(response) => {
                        state.merge(&response);
                        yield Ok(response);
                    }
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            increments = state.increments(),
                            "Aggregation error"
                        );
                        failed = true;
                        yield Err(e);
                        break;
                    }
                }
            }

            if !failed {
                let increments = state.increments();
                let aggregate = state.finish();
                tracing::debug!(
                    increments,
                    text_len = aggregate.text().len(),
                    "Stream aggregation complete"
                );
                on_complete(aggregate);
            }
        };

        Box::pin(aggregated)
    }

    /// Aggregate a replayable source: every [`AggregatedSource::subscribe`]
    /// starts a fresh stream from `factory` with its own accumulator.
    pub fn aggregate_source<F, C>(&self, factory: F, on_complete: C) -> AggregatedSource<F, C>
    where
        C: Fn(ChatResponse) + Send + Sync + 'static,
    {
        AggregatedSource {
            aggregator: *self,
            factory,
            on_complete: Arc::new(on_complete),
        }
    }
}

/// A replayable source whose every subscription is aggregated independently.
pub struct AggregatedSource<F, C> {
    aggregator: MessageAggregator,
    factory: F,
    on_complete: Arc<C>,
}

impl<F, C> AggregatedSource<F, C>
where
    C: Fn(ChatResponse) + Send + Sync + 'static,
{
    pub fn subscribe<S, E>(&self) -> BoxStream<'static, Result<ChatResponse, E>>
    where
        F: Fn() -> S,
        S: Stream<Item = Result<ChatResponse, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let on_complete = Arc::clone(&self.on_complete);
        self.aggregator
            .aggregate((self.factory)(), move |aggregate| on_complete(aggregate))
    }
}
