//! Observation of streamed chat exchanges.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::ChatResponse;

/// Records the outcome of one streamed exchange.
///
/// Cloning is cheap and clones share the same record, so one clone can be
/// handed to the aggregator as its completion sink while the caller keeps
/// another to read the result.
#[derive(Debug, Clone)]
pub struct ChatObservation {
    inner: Arc<ObservationInner>,
}

#[derive(Debug)]
struct ObservationInner {
    id: Uuid,
    provider: String,
    started_at: DateTime<Utc>,
    outcome: Mutex<Outcome>,
}

#[derive(Debug, Default)]
struct Outcome {
    response: Option<ChatResponse>,
    error: Option<String>,
}

impl ChatObservation {
    pub fn start(provider: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ObservationInner {
                id: Uuid::new_v4(),
                provider: provider.into(),
                started_at: Utc::now(),
                outcome: Mutex::new(Outcome::default()),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn provider(&self) -> &str {
        &self.inner.provider
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }

    /// Store the complete response and emit a summary event.
    pub fn set_response(&self, response: ChatResponse) {
        let elapsed_ms = (Utc::now() - self.inner.started_at).num_milliseconds();
        let usage = response.metadata.usage.unwrap_or_default();
        tracing::info!(
            observation = %self.inner.id,
            provider = %self.inner.provider,
            model = response.metadata.model.as_deref().unwrap_or_default(),
            response_id = response.metadata.id.as_deref().unwrap_or_default(),
            prompt_tokens = usage.prompt_tokens.unwrap_or(0),
            completion_tokens = usage.completion_tokens.unwrap_or(0),
            total_tokens = usage.total_tokens.unwrap_or(0),
            finish_reason = ?response.finish_reason(),
            elapsed_ms,
            "Chat stream completed"
        );
        self.outcome().response = Some(response);
    }

    pub fn record_error(&self, error: &dyn std::fmt::Display) {
        tracing::warn!(
            observation = %self.inner.id,
            provider = %self.inner.provider,
            error = %error,
            "Chat stream failed"
        );
        self.outcome().error = Some(error.to_string());
    }

    /// The aggregate, once the stream has completed normally.
    pub fn response(&self) -> Option<ChatResponse> {
        self.outcome().response.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.outcome().error.clone()
    }

    /// Completion callback that stores into this observation.
    pub fn recorder(&self) -> impl Fn(ChatResponse) + Send + Sync + 'static {
        let observation = self.clone();
        move |response| observation.set_response(response)
    }

    fn outcome(&self) -> std::sync::MutexGuard<'_, Outcome> {
        self.inner
            .outcome
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
