use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{GenerationError, Result};
use super::fence::strip_code_fence;
use super::item::ItemShape;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

/// Reads the completion text from a raw response body: the first part of the
/// first candidate.
pub fn completion_text(body: &[u8]) -> Result<String> {
    let response: GenerateContentResponse =
        serde_json::from_slice(body).map_err(|_| GenerationError::EmptyResponse)?;

    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or(GenerationError::EmptyResponse)
}

/// Turns model output into a validated item: strip fences, parse, validate.
pub fn parse_completion<T: ItemShape>(text: &str) -> Result<T> {
    let json_text = strip_code_fence(text);
    let value: Value = serde_json::from_str(json_text).map_err(GenerationError::MalformedJson)?;
    Ok(T::from_value(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::item::{LongEssay, ShapeError, ShortAnswer};
    use serde_json::json;

    const SAQ_JSON: &str = r#"{"question":"Q?","options":["a","b","c","d"],"correct":2,"feedback":"F"}"#;

    fn envelope(text: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]
        }))
        .unwrap()
    }

    #[test]
    fn request_body_matches_wire_format() {
        let body = serde_json::to_value(GenerateContentRequest::from_prompt("hello")).unwrap();
        assert_eq!(body, json!({"contents": [{"parts": [{"text": "hello"}]}]}));
    }

    #[test]
    fn extracts_first_candidate_text() {
        assert_eq!(completion_text(&envelope("hi")).unwrap(), "hi");
    }

    #[test]
    fn missing_content_is_empty_response() {
        for body in [
            json!({}),
            json!({"candidates": []}),
            json!({"candidates": [{"finishReason": "SAFETY"}]}),
            json!({"candidates": [{"content": {"parts": []}}]}),
        ] {
            let bytes = serde_json::to_vec(&body).unwrap();
            assert!(matches!(
                completion_text(&bytes),
                Err(GenerationError::EmptyResponse)
            ));
        }
        assert!(matches!(
            completion_text(b"<html>"),
            Err(GenerationError::EmptyResponse)
        ));
    }

    #[test]
    fn fenced_short_answer_parses() {
        let text = format!("```json\n{SAQ_JSON}\n```");
        let item: ShortAnswer = parse_completion(&text).unwrap();
        let plain: ShortAnswer = parse_completion(SAQ_JSON).unwrap();
        assert_eq!(item, plain);
        assert_eq!(item.correct, 2);
    }

    #[test]
    fn prose_is_malformed_json() {
        let result: Result<ShortAnswer> = parse_completion("Sure! Here is a question.");
        assert!(matches!(result, Err(GenerationError::MalformedJson(_))));
    }

    #[test]
    fn missing_field_is_invalid_shape() {
        let result: Result<ShortAnswer> =
            parse_completion(r#"{"question":"Q?","options":["a","b","c","d"],"feedback":"F"}"#);
        assert!(matches!(
            result,
            Err(GenerationError::InvalidShape(ShapeError::MissingField("correct")))
        ));
    }

    #[test]
    fn wrong_kind_is_invalid_shape() {
        let result: Result<LongEssay> = parse_completion(SAQ_JSON);
        assert!(matches!(result, Err(GenerationError::InvalidShape(_))));
    }
}
