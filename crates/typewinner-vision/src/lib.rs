//! Challenge-image text recognition over the Groq vision API.
//!
//! A single chat-completion round trip: the image goes up as a base64
//! data URL, the model is asked to answer with a JSON object holding the
//! recognized text, and the reply is unwrapped back into a plain string.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;
use typewinner_core::TextRecognizer;

const API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";
const PROMPT: &str = r#"Write me the text in the image, return the following JSON: {"text": ""}"#;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("vision API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("vision API returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Groq-backed [`TextRecognizer`]. Holds one API key for its lifetime;
/// a key change means building a fresh instance, which is cheap.
pub struct GroqVision {
    client: reqwest::Client,
    api_key: String,
}

impl GroqVision {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl TextRecognizer for GroqVision {
    async fn extract_text(&self, image: &[u8]) -> anyhow::Result<Option<String>> {
        let response = self
            .client
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&extraction_request(image))
            .send()
            .await
            .map_err(VisionError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(VisionError::Status(status).into());
        }

        let reply: Value = response.json().await.map_err(VisionError::Request)?;
        let text = parse_extraction(&reply);
        debug!(recognized = text.is_some(), "vision extraction finished");
        Ok(text)
    }
}

fn extraction_request(image: &[u8]) -> Value {
    json!({
        "model": MODEL,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "text", "text": PROMPT },
                {
                    "type": "image_url",
                    "image_url": {
                        "url": format!("data:image/png;base64,{}", BASE64.encode(image))
                    }
                }
            ]
        }],
        "response_format": { "type": "json_object" },
        "stream": false
    })
}

/// Pulls the recognized text out of a chat-completion reply. The message
/// content is itself a JSON document of the form `{"text": "..."}`; any
/// deviation reads as "nothing recognized" rather than an error.
fn parse_extraction(reply: &Value) -> Option<String> {
    let content = reply
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()?;
    let parsed: Value = serde_json::from_str(content).ok()?;
    Some(parsed.get("text")?.as_str()?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply_with_content(content: &str) -> Value {
        json!({
            "choices": [{ "message": { "content": content } }]
        })
    }

    #[test]
    fn request_carries_model_image_and_format() {
        let body = extraction_request(&[1, 2, 3]);
        assert_eq!(body["model"], MODEL);
        assert_eq!(body["response_format"]["type"], "json_object");

        let image_url = body["messages"][0]["content"][1]["image_url"]["url"]
            .as_str()
            .unwrap();
        assert!(image_url.starts_with("data:image/png;base64,"));
        assert_eq!(image_url, "data:image/png;base64,AQID");
    }

    #[test]
    fn extraction_reads_the_nested_text_field() {
        let reply = reply_with_content(r#"{"text": "quick brown fox"}"#);
        assert_eq!(
            parse_extraction(&reply),
            Some("quick brown fox".to_string())
        );
    }

    #[test]
    fn extraction_handles_a_malformed_reply() {
        assert_eq!(parse_extraction(&json!({})), None);
        assert_eq!(parse_extraction(&json!({"choices": []})), None);
        assert_eq!(parse_extraction(&reply_with_content("not json")), None);
        assert_eq!(parse_extraction(&reply_with_content(r#"{"other": 1}"#)), None);
    }
}
