//! Stream transformations for chat response streams.

use std::sync::Arc;

use crate::aggregation::MessageAggregator;
use crate::types::{ChatResponse, ChatStream};

/// Trait for transforming a stream of chat responses.
pub trait StreamTransform: Send + Sync {
    /// Transform the stream.
    fn transform(&self, stream: ChatStream) -> ChatStream;
}

/// Aggregates every stream it transforms, reporting each complete response
/// to the same callback.
pub struct AggregateTransform {
    aggregator: MessageAggregator,
    on_complete: Arc<dyn Fn(ChatResponse) + Send + Sync>,
}

impl AggregateTransform {
    pub fn new<F>(aggregator: MessageAggregator, on_complete: F) -> Self
    where
        F: Fn(ChatResponse) + Send + Sync + 'static,
    {
        Self {
            aggregator,
            on_complete: Arc::new(on_complete),
        }
    }
}

impl StreamTransform for AggregateTransform {
    fn transform(&self, stream: ChatStream) -> ChatStream {
        let on_complete = self.on_complete.clone();
        self.aggregator
            .aggregate(stream, move |aggregate| (on_complete)(aggregate))
    }
}

/// Apply transforms in order.
pub fn apply_all(stream: ChatStream, transforms: &[Box<dyn StreamTransform>]) -> ChatStream {
    transforms
        .iter()
        .fold(stream, |stream, transform| transform.transform(stream))
}
