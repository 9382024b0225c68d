//! Token usage types.

use serde::{Deserialize, Serialize};

/// Token usage reported by a provider.
///
/// Each counter is optional: streamed chunks often report only some of them,
/// or report zero as a placeholder until the final chunk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u32>,
}

impl Usage {
    /// Usage with all three counters reported.
    pub fn new(prompt_tokens: u32, completion_tokens: u32, total_tokens: u32) -> Self {
        Self {
            prompt_tokens: Some(prompt_tokens),
            completion_tokens: Some(completion_tokens),
            total_tokens: Some(total_tokens),
        }
    }

    /// Fold a later report into this one.
    ///
    /// Each counter is overwritten only by a value strictly greater than zero,
    /// so placeholder zeros never erase a previously reported count.
    pub fn reconcile(&mut self, later: &Usage) {
        overwrite_if_positive(&mut self.prompt_tokens, later.prompt_tokens);
        overwrite_if_positive(&mut self.completion_tokens, later.completion_tokens);
        overwrite_if_positive(&mut self.total_tokens, later.total_tokens);
    }

    /// Usage with every unreported counter set to zero.
    pub fn settled(&self) -> Self {
        Self::new(
            self.prompt_tokens.unwrap_or(0),
            self.completion_tokens.unwrap_or(0),
            self.total_tokens.unwrap_or(0),
        )
    }
}

fn overwrite_if_positive(slot: &mut Option<u32>, incoming: Option<u32>) {
    if let Some(value) = incoming.filter(|v| *v > 0) {
        *slot = Some(value);
    }
}
