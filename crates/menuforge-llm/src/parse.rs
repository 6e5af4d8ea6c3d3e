//! Helpers for coaxing JSON out of LLM replies.
//!
//! Models frequently wrap JSON payloads in Markdown code fences or prose.
//! Every stage boundary treats the reply as untrusted input: strip fences
//! here, then parse with serde into the stage's wire types.

/// Extract the JSON payload from a raw LLM reply.
///
/// Handles three shapes, in order:
/// 1. a ```json fenced block (first one wins),
/// 2. any ``` fenced block,
/// 3. the raw text trimmed, falling back to the first `{`..last `}` span
///    when the reply carries leading or trailing prose.
#[must_use]
pub fn extract_json_payload(raw: &str) -> &str {
    if let Some(block) = fenced_block(raw, "```json") {
        return block;
    }
    if let Some(block) = fenced_block(raw, "```") {
        return block;
    }
    let trimmed = raw.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => trimmed[start..=end].trim(),
        _ => trimmed,
    }
}

fn fenced_block<'a>(raw: &'a str, opener: &str) -> Option<&'a str> {
    let start = raw.find(opener)? + opener.len();
    let rest = &raw[start..];
    let end = rest.find("```")?;
    let block = rest[..end].trim();
    (!block.is_empty()).then_some(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_bare_json() {
        assert_eq!(extract_json_payload("  {\"a\": 1} "), "{\"a\": 1}");
        assert_eq!(extract_json_payload("[1, 2]"), "[1, 2]");
    }

    #[test]
    fn unwraps_json_fence() {
        let raw = "Here you go:\n```json\n{\"a\": 1}\n```\nLet me know!";
        assert_eq!(extract_json_payload(raw), "{\"a\": 1}");
    }

    #[test]
    fn unwraps_anonymous_fence() {
        let raw = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json_payload(raw), "{\"a\": 1}");
    }

    #[test]
    fn salvages_json_embedded_in_prose() {
        let raw = "The menu is {\"a\": {\"b\": 2}} as requested.";
        assert_eq!(extract_json_payload(raw), "{\"a\": {\"b\": 2}}");
    }

    #[test]
    fn leaves_hopeless_input_for_serde_to_reject() {
        assert_eq!(extract_json_payload("no json here"), "no json here");
    }
}
