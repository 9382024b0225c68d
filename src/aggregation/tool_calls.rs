//! Reassembly of tool calls split across streamed chunks.

use crate::types::ToolCall;

/// Merge streamed tool-call fragments into `calls`.
///
/// A fragment with an id joins the call with that id (or starts a new one).
/// A fragment without an id continues the most recent call.
pub fn merge_tool_calls(calls: &mut Vec<ToolCall>, fragments: &[ToolCall]) {
    for fragment in fragments {
        let target = if has_text(&fragment.id) {
            calls.iter_mut().find(|existing| existing.id == fragment.id)
        } else {
            calls.last_mut()
        };

        match target {
            Some(existing) => merge_into(existing, fragment),
            None => calls.push(fragment.clone()),
        }
    }
}

/// Combine `fragment` into `existing`.
///
/// The earlier id is kept; name and type take the newer non-blank value;
/// arguments are concatenated.
fn merge_into(existing: &mut ToolCall, fragment: &ToolCall) {
    if !has_text(&existing.id) {
        existing.id.clone_from(&fragment.id);
    }
    if has_text(&fragment.name) {
        existing.name.clone_from(&fragment.name);
    }
    if has_text(&fragment.call_type) {
        existing.call_type.clone_from(&fragment.call_type);
    }
    existing.arguments.push_str(&fragment.arguments);
}

pub(crate) fn has_text(value: &str) -> bool {
    !value.trim().is_empty()
}
