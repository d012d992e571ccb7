use crate::error::AzureError;
use crate::types::{AzureConfig, ChatCompletion, ChatOutput, ChatRequest};
use std::time::Instant;
use tokio::time::timeout;

/// Longest error body kept in `AzureError::Status`.
const MAX_ERROR_BODY: usize = 2048;

/// Posts `body` to the chat completions endpoint and decodes the first choice.
pub async fn send_chat(
    http: &reqwest::Client,
    config: &AzureConfig,
    body: &ChatRequest,
) -> Result<ChatOutput, AzureError> {
    let url = crate::body::build_url(config);
    let structured = body.response_format.is_some();
    let start_time = Instant::now();

    let call = async {
        let response = http
            .post(&url)
            .header("api-key", &config.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        Ok::<_, AzureError>((status, text))
    };

    let (status, text) = match timeout(config.timeout, call).await {
        Ok(res) => res?,
        Err(_) => return Err(AzureError::Timeout(config.timeout)),
    };

    tracing::debug!(
        status = status.as_u16(),
        elapsed_ms = start_time.elapsed().as_millis(),
        deployment = %config.deployment,
        "chat completion returned"
    );

    if !status.is_success() {
        return Err(AzureError::Status {
            status: status.as_u16(),
            body: truncate(text, MAX_ERROR_BODY),
        });
    }

    parse_completion(&text, structured)
}

/// Extracts the first choice of a chat completion response body.
pub fn parse_completion(text: &str, structured: bool) -> Result<ChatOutput, AzureError> {
    let completion: ChatCompletion =
        serde_json::from_str(text).map_err(|e| AzureError::Decode(e.to_string()))?;

    if let Some(usage) = completion.usage {
        tracing::debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "token usage"
        );
    }

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or(AzureError::EmptyResponse)?;

    if let Some(refusal) = choice.message.refusal.filter(|r| !r.is_empty()) {
        return Err(AzureError::Refusal(refusal));
    }

    let content = choice.message.content.ok_or(AzureError::EmptyResponse)?;
    if !structured {
        return Ok(ChatOutput::Text(content));
    }

    if choice.finish_reason.as_deref() == Some("length") {
        return Err(AzureError::Decode(
            "structured output was truncated at the token limit".to_string(),
        ));
    }

    serde_json::from_str(&content)
        .map(ChatOutput::Json)
        .map_err(|e| AzureError::Decode(format!("content is not valid JSON: {e}")))
}

fn truncate(mut text: String, max: usize) -> String {
    if text.len() > max {
        let mut cut = max;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn completion(message: &serde_json::Value, finish_reason: &str) -> String {
        json!({
            "choices": [{"index": 0, "message": message, "finish_reason": finish_reason}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        })
        .to_string()
    }

    #[test]
    fn test_parses_structured_content() {
        let body = completion(
            &json!({"role": "assistant", "content": "{\"name\":\"Andover\"}"}),
            "stop",
        );
        match parse_completion(&body, true).unwrap() {
            ChatOutput::Json(v) => assert_eq!(v, json!({"name": "Andover"})),
            ChatOutput::Text(t) => panic!("expected JSON, got text {t}"),
        }
    }

    #[test]
    fn test_text_mode_returns_raw_content() {
        let body = completion(&json!({"role": "assistant", "content": "{not json"}), "stop");
        assert!(matches!(
            parse_completion(&body, false).unwrap(),
            ChatOutput::Text(t) if t == "{not json"
        ));
    }

    #[test]
    fn test_refusal_is_reported() {
        let body = completion(
            &json!({"role": "assistant", "content": null, "refusal": "I can't help"}),
            "stop",
        );
        assert!(matches!(
            parse_completion(&body, true),
            Err(AzureError::Refusal(r)) if r == "I can't help"
        ));
    }

    #[test]
    fn test_invalid_json_content_is_decode_error() {
        let body = completion(&json!({"role": "assistant", "content": "oops"}), "stop");
        assert!(matches!(parse_completion(&body, true), Err(AzureError::Decode(_))));
    }

    #[test]
    fn test_truncated_structured_output() {
        let body = completion(&json!({"role": "assistant", "content": "{\"a\":"}), "length");
        assert!(matches!(parse_completion(&body, true), Err(AzureError::Decode(_))));
    }

    #[test]
    fn test_empty_choices() {
        let body = json!({"choices": []}).to_string();
        assert!(matches!(
            parse_completion(&body, true),
            Err(AzureError::EmptyResponse)
        ));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "é".repeat(10);
        let cut = truncate(text, 5);
        assert_eq!(cut, "éé");
    }
}
