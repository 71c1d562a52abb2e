//! Grounding context builder.
//!
//! Serialises retrieved match metadata verbatim after a system prompt so the
//! completion is conditioned on what the index returned.

use serde_json::Value;

use super::store::Match;

/// `prompt` followed by the JSON metadata of up to `limit` matches, in rank order.
pub fn grounding_context(prompt: &str, matches: &[Match], limit: usize) -> String {
    let mut context = String::from(prompt);
    for m in matches.iter().take(limit) {
        context.push_str(&serialize_metadata(m));
    }
    context
}

fn serialize_metadata(m: &Match) -> String {
    serde_json::to_string(&m.metadata).unwrap_or_else(|_| Value::Null.to_string())
}
