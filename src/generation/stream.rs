//! Draining response streams into complete responses.

use futures::{Stream, StreamExt};

use crate::aggregation::{AggregationOptions, AggregationState};
use crate::types::ChatResponse;

/// Collect a stream into its aggregate, with default aggregation options.
///
/// Returns the first error the stream yields.
pub async fn collect_response<S, E>(stream: S) -> Result<ChatResponse, E>
where
    S: Stream<Item = Result<ChatResponse, E>>,
{
    collect_response_with(stream, AggregationOptions::default()).await
}

/// Collect a stream into its aggregate.
pub async fn collect_response_with<S, E>(
    stream: S,
    options: AggregationOptions,
) -> Result<ChatResponse, E>
where
    S: Stream<Item = Result<ChatResponse, E>>,
{
    let mut state = AggregationState::new(options);
    let mut stream = std::pin::pin!(stream);

    while let Some(response) = stream.next().await {
        state.merge(&response?);
    }

    Ok(state.finish())
}
