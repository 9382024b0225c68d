//! Usage tracking across aggregated responses.

use std::sync::{Arc, RwLock};

use crate::types::{ChatResponse, Usage};

/// Cumulative token counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageTotals {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Tracks cumulative usage across completed responses.
#[derive(Clone, Default)]
pub struct UsageTracker {
    inner: Arc<RwLock<UsageTrackerInner>>,
}

#[derive(Default)]
struct UsageTrackerInner {
    totals: UsageTotals,
    response_count: u64,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one usage report. Unreported counters count as zero.
    pub fn record(&self, usage: &Usage) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.totals.prompt_tokens += u64::from(usage.prompt_tokens.unwrap_or(0));
        inner.totals.completion_tokens += u64::from(usage.completion_tokens.unwrap_or(0));
        inner.totals.total_tokens += u64::from(usage.total_tokens.unwrap_or(0));
        inner.response_count += 1;
    }

    /// Record the usage of a complete response.
    pub fn record_response(&self, response: &ChatResponse) {
        self.record(&response.metadata.usage.unwrap_or_default());
    }

    pub fn totals(&self) -> UsageTotals {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).totals
    }

    /// Number of responses recorded.
    pub fn response_count(&self) -> u64 {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).response_count
    }

    /// Reset all tracking.
    pub fn reset(&self) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *inner = UsageTrackerInner::default();
    }
}
