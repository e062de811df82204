//! Typed parsing of generated text.
//!
//! Hosted models frequently wrap the JSON they were asked for in a
//! markdown code fence. Callers parse through this helper and branch to
//! their deterministic fallback on `Err` instead of unwinding.

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResponseParseError {
    #[error("model response was empty")]
    Empty,

    #[error("model response is not valid JSON: {0}")]
    Json(String),
}

/// Strip known markdown fence markers and parse the remainder as `T`.
pub fn parse_structured_response<T: DeserializeOwned>(raw: &str) -> Result<T, ResponseParseError> {
    let body = strip_fences(raw);
    if body.is_empty() {
        return Err(ResponseParseError::Empty);
    }
    serde_json::from_str(body).map_err(|e| ResponseParseError::Json(e.to_string()))
}

fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Opening fence may carry a language tag on the same line.
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        answer: String,
    }

    #[test]
    fn parses_bare_json() {
        let parsed: Payload = parse_structured_response(r#"{"answer": "yes"}"#).unwrap();
        assert_eq!(parsed.answer, "yes");
    }

    #[test]
    fn strips_json_fence() {
        let raw = "```json\n{\"answer\": \"yes\"}\n```";
        let parsed: Payload = parse_structured_response(raw).unwrap();
        assert_eq!(parsed.answer, "yes");
    }

    #[test]
    fn strips_anonymous_fence() {
        let raw = "```\n{\"answer\": \"yes\"}\n```";
        let parsed: Payload = parse_structured_response(raw).unwrap();
        assert_eq!(parsed.answer, "yes");
    }

    #[test]
    fn prose_is_a_typed_error_not_a_panic() {
        let err = parse_structured_response::<Payload>("Sure! Here is the JSON you asked for")
            .unwrap_err();
        assert!(matches!(err, ResponseParseError::Json(_)));
    }

    #[test]
    fn empty_response_is_flagged() {
        assert_eq!(
            parse_structured_response::<Payload>("   ").unwrap_err(),
            ResponseParseError::Empty
        );
    }
}
