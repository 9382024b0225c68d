//! Rill — streaming chat-response aggregation.
//!
//! Provider clients stream a response as a sequence of partial
//! [`ChatResponse`](types::ChatResponse) increments. Rill passes those
//! increments through unchanged while folding them into one complete
//! response, which it hands to a completion callback when the stream ends.
//!
//! # Quick Start
//!
//! ```no_run
//! use futures::StreamExt;
//! use rill::prelude::*;
//!
//! # async fn example(source: ChatStream) {
//! let aggregator = MessageAggregator::new();
//! let mut stream = aggregator.aggregate(source, |full| {
//!     println!("{}", full.text());
//! });
//! while let Some(chunk) = stream.next().await {
//!     print!("{}", chunk.map(|c| c.text().to_string()).unwrap_or_default());
//! }
//! # }
//! ```

pub mod aggregation;
pub mod config;
pub mod error;
pub mod generation;
pub mod observation;
pub mod prelude;
pub mod provider;
pub mod stream_transform;
pub mod types;
pub mod util;
