//! OpenAI chat-completions implementation of [`FieldExtractor`].
//!
//! ```rust,ignore
//! use listing_sync::ai::OpenAIFieldExtractor;
//!
//! let extractor = OpenAIFieldExtractor::new("sk-...").with_model("gpt-4o-mini");
//! let raw = extractor.extract_fields("Furnished room, 4 month summer sublet").await?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{CollaboratorError, CollaboratorResult};
use crate::traits::enricher::FieldExtractor;

const SYSTEM_PROMPT: &str = "You are given the description for a lease posting. \
Return ONLY a JSON object containing fields. Extract the following fields from the \
description. Only include fields that are EXPLICITLY stated.\n\n\
demographic: string; // 'woman', 'mixed', 'man', 'null'\n\
term_length: int; // term length in months. if not stated place 'null'\n\
term_length_type: string; // 'winter', 'spring', 'summer', 'fall', 'null'\n\
furnished: bool; // true / false\n";

/// Asks an OpenAI chat model for demographic, term and furnishing details.
#[derive(Clone)]
pub struct OpenAIFieldExtractor {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
}

impl OpenAIFieldExtractor {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            max_tokens: 1000,
        }
    }

    /// Set the chat model (default: gpt-4o-mini).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for proxies or compatible servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl FieldExtractor for OpenAIFieldExtractor {
    async fn extract_fields(&self, description: &str) -> CollaboratorResult<Value> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: description,
                },
            ],
            temperature: 0.0,
            max_tokens: self.max_tokens,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(CollaboratorError::enrichment)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::enrichment(format!(
                "OpenAI returned {}: {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(CollaboratorError::enrichment)?;

        let content = chat_response
            .choices
            .into_iter()
            .filter_map(|choice| choice.message.content)
            .find(|text| !text.trim().is_empty())
            .ok_or_else(|| CollaboratorError::UnexpectedResponse("empty completion".into()))?;

        debug!(model = %self.model, chars = content.len(), "Field extraction answered");

        serde_json::from_str(&content).map_err(|e| {
            CollaboratorError::UnexpectedResponse(format!("completion is not JSON: {e}"))
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_asks_for_json_object() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.0,
            max_tokens: 10,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[test]
    fn test_null_content_deserializes() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(response.choices[0].message.content.is_none());
    }
}
