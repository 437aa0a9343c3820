//! Markdown code fence extraction
//!
//! Models often wrap their JSON in a fenced block. Three cases, checked in
//! order: a fence tagged `json`, any fence, no fence at all.

use tracing::debug;

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// Which kind of fence the payload was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    Json,
    Generic,
    None,
}

/// Candidate JSON text and where it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extracted<'a> {
    pub kind: FenceKind,
    pub payload: &'a str,
}

/// Pick the JSON candidate out of a model response
///
/// The payload runs from just after the opening fence to the next fence, or
/// to the end of the text when the block is never closed. Surrounding
/// whitespace is trimmed; nothing else is touched.
pub fn extract_json_payload(text: &str) -> Extracted<'_> {
    if let Some(payload) = between_fences(text, JSON_FENCE) {
        debug!("extract_json_payload: json fence");
        return Extracted {
            kind: FenceKind::Json,
            payload,
        };
    }
    if let Some(payload) = between_fences(text, FENCE) {
        debug!("extract_json_payload: generic fence");
        return Extracted {
            kind: FenceKind::Generic,
            payload,
        };
    }
    debug!("extract_json_payload: no fence");
    Extracted {
        kind: FenceKind::None,
        payload: text.trim(),
    }
}

fn between_fences<'a>(text: &'a str, opener: &str) -> Option<&'a str> {
    let start = text.find(opener)? + opener.len();
    let rest = &text[start..];
    let end = rest.find(FENCE).unwrap_or(rest.len());
    Some(rest[..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_json_fence() {
        let got = extract_json_payload("```json\n{\"a\":1}\n```");
        assert_eq!(got.kind, FenceKind::Json);
        assert_eq!(got.payload, "{\"a\":1}");
    }

    #[test]
    fn test_generic_fence() {
        let got = extract_json_payload("```\n{\"a\":1}\n```");
        assert_eq!(got.kind, FenceKind::Generic);
        assert_eq!(got.payload, "{\"a\":1}");
    }

    #[test]
    fn test_no_fence_passes_through() {
        let got = extract_json_payload("{\"a\":1}");
        assert_eq!(got.kind, FenceKind::None);
        assert_eq!(got.payload, "{\"a\":1}");
    }

    #[test]
    fn test_all_three_cases_parse() {
        for raw in ["```json\n{\"a\":1}\n```", "```\n{\"a\":1}\n```", "{\"a\":1}"] {
            let value: serde_json::Value = serde_json::from_str(extract_json_payload(raw).payload).unwrap();
            assert_eq!(value, serde_json::json!({"a": 1}));
        }
    }

    #[test]
    fn test_prose_around_json_fence() {
        let raw = "Here is your plan:\n```json\n{\"a\":1}\n```\nGood luck!";
        assert_eq!(extract_json_payload(raw).payload, "{\"a\":1}");
    }

    #[test]
    fn test_json_fence_preferred_over_earlier_generic() {
        let raw = "```\nnot this\n```\n```json\n{\"b\":2}\n```";
        let got = extract_json_payload(raw);
        assert_eq!(got.kind, FenceKind::Json);
        assert_eq!(got.payload, "{\"b\":2}");
    }

    #[test]
    fn test_first_json_fence_wins() {
        let raw = "```json\n{\"first\":true}\n```\n```json\n{\"second\":true}\n```";
        assert_eq!(extract_json_payload(raw).payload, "{\"first\":true}");
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        assert_eq!(extract_json_payload("```json\n{\"a\":1}\n").payload, "{\"a\":1}");
        assert_eq!(extract_json_payload("```\n{\"a\":1}").payload, "{\"a\":1}");
    }

    #[test]
    fn test_other_language_tag_is_kept() {
        // Only a `json` tag is recognized; any other tag stays in the payload
        let got = extract_json_payload("```yaml\na: 1\n```");
        assert_eq!(got.kind, FenceKind::Generic);
        assert_eq!(got.payload, "yaml\na: 1");
    }

    #[test]
    fn test_multibyte_text() {
        let raw = "计划如下 ```json\n{\"名称\":\"测试\"}\n``` ✅";
        assert_eq!(extract_json_payload(raw).payload, "{\"名称\":\"测试\"}");
    }

    proptest! {
        #[test]
        fn prop_fence_free_text_is_only_trimmed(text in "[^`]*") {
            let got = extract_json_payload(&text);
            prop_assert_eq!(got.kind, FenceKind::None);
            prop_assert_eq!(got.payload, text.trim());
        }

        #[test]
        fn prop_json_fence_recovers_body(body in "[^`]*", before in "[^`]*", after in "[^`]*") {
            let raw = format!("{before}```json\n{body}\n```{after}");
            prop_assert_eq!(extract_json_payload(&raw).payload, body.trim());
        }
    }
}
