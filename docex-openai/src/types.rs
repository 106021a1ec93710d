use serde::Serialize;
use serde_json::Value;

/// Body of a `POST /responses` request.
#[derive(Debug, Clone, Serialize)]
pub struct ResponsesRequest<'a> {
    /// Model identifier.
    pub model: &'a str,
    /// Prompt text.
    pub input: &'a str,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Extracts the output text from a Responses API payload.
///
/// Reads the top-level `output_text` convenience field when present, otherwise
/// concatenates every `output[].content[]` item of type `output_text`. Returns
/// an empty string when the payload carries no text.
#[must_use]
pub fn output_text_from_response(val: &Value) -> String {
    if let Some(text) = val.get("output_text").and_then(Value::as_str) {
        return text.to_string();
    }

    val.get("output")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|c| c.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|c| c.get("text").and_then(Value::as_str))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_output_text() {
        let val = json!({"output_text": "w2", "output": []});
        assert_eq!(output_text_from_response(&val), "w2");
    }

    #[test]
    fn test_output_items_are_concatenated() {
        let val = json!({
            "output": [
                {"type": "reasoning", "summary": []},
                {
                    "type": "message",
                    "role": "assistant",
                    "content": [
                        {"type": "output_text", "text": "{\"a\": "},
                        {"type": "refusal", "refusal": "no"},
                        {"type": "output_text", "text": "1}"}
                    ]
                }
            ]
        });
        assert_eq!(output_text_from_response(&val), "{\"a\": 1}");
    }

    #[test]
    fn test_missing_text_is_empty() {
        assert_eq!(output_text_from_response(&json!({"id": "resp_1"})), "");
    }

    #[test]
    fn test_request_body_shape() {
        let body = ResponsesRequest {
            model: "gpt-4o-mini",
            input: "Which schema?",
            temperature: 0.0,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["input"], "Which schema?");
        assert_eq!(value["temperature"], 0.0);
    }
}
