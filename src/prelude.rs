//! Convenience re-exports for common use.

pub use crate::aggregation::{AggregationOptions, MessageAggregator, RateLimitPolicy};
pub use crate::config::AggregatorConfig;
pub use crate::error::{Result, RillError};
pub use crate::generation::collect_response;
pub use crate::observation::ChatObservation;
pub use crate::provider::{ObservedChatModel, Prompt, StreamingChatModel};
pub use crate::types::{
    AssistantMessage, ChatResponse, ChatStream, FinishReason, Generation, GenerationMetadata,
    ModelMessage, RateLimit, ResponseMetadata, Role, ToolCall, Usage,
};
