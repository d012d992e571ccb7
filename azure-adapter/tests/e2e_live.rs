//! Live tests against a real Azure OpenAI deployment.
//!
//! These tests require `AZURE_OPENAI_ENDPOINT` and `AZURE_OPENAI_API_KEY` to be
//! set (and optionally `AZURE_OPENAI_DEPLOYMENT`). They are marked `#[ignore]`
//! so CI without credentials stays green.
//!
//! ```bash
//! cargo test -p azure-openai-adapter -- --ignored
//! ```

use azure_openai_adapter::{AzureError, AzureOpenAi, ChatMessage, ChatOutput, JsonSchemaFormat};
use serde_json::json;
use std::time::Duration;

fn client() -> Option<AzureOpenAi> {
    match AzureOpenAi::from_env() {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping: {e}");
            None
        }
    }
}

#[tokio::test]
#[ignore = "Requires Azure OpenAI credentials"]
async fn e2e_structured_extraction() {
    let Some(client) = client() else { return };

    let schema = JsonSchemaFormat {
        name: "ParserResponse".to_string(),
        schema: json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "website": {"type": "string"}
            },
            "required": ["name", "website"],
            "additionalProperties": false
        }),
        strict: true,
    };

    let output = client
        .chat(
            vec![
                ChatMessage::new("system", "Extract the school name and website."),
                ChatMessage::new(
                    "user",
                    "Andover School <a href=\"https://andover.example\">Visit us</a>",
                ),
            ],
            0.2,
            Some(schema),
        )
        .await
        .expect("chat should succeed");

    match output {
        ChatOutput::Json(value) => {
            assert!(value["name"].is_string(), "got: {value}");
            assert!(value["website"].is_string(), "got: {value}");
        }
        ChatOutput::Text(text) => panic!("expected structured output, got text: {text}"),
    }
}

#[tokio::test]
#[ignore = "Requires Azure OpenAI credentials"]
async fn e2e_tiny_deadline_times_out() {
    let Some(client) = client() else { return };
    let client = AzureOpenAi::new(client.config().clone().with_timeout(Duration::from_millis(1)));

    let err = client
        .chat(vec![ChatMessage::new("user", "Say hello.")], 0.0, None)
        .await
        .expect_err("a 1ms deadline should not be met");

    assert!(err.is_timeout(), "expected a timeout, got {err:?}");
    assert!(matches!(err, AzureError::Timeout(_)));
}
