//! services/api/src/adapters/gemini.rs
//!
//! Gemini adapter for the `TextGenerationService` port. Talks to the Gemini
//! API through its OpenAI-compatible chat endpoint, so the usual chat
//! completion request types apply unchanged.
//!
//! The API key varies per call (each user may bring their own), so the client
//! is built fresh for every request instead of being held on the adapter.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use goggins_core::ports::{PortError, PortResult, TextGenerationService};
use std::time::Duration;

pub struct GeminiAdapter {
    api_base: String,
    model: String,
    timeout: Duration,
}

impl GeminiAdapter {
    pub fn new(api_base: String, model: String, timeout: Duration) -> Self {
        Self {
            api_base,
            model,
            timeout,
        }
    }

    async fn complete(&self, api_key: &str, prompt: &str) -> PortResult<String> {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&self.api_base);
        let client = Client::with_config(config);

        let messages = vec![ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?,
        )];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, client.chat().create(request))
            .await
            .map_err(|_| PortError::Unexpected("Gemini request timed out".to_string()))?
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| PortError::Unexpected("Empty reply from Gemini".to_string()))?;

        Ok(content.trim().to_string())
    }
}

/// Models often wrap JSON replies in a markdown code fence even when told
/// not to. Strip one fence pair if present.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

#[async_trait]
impl TextGenerationService for GeminiAdapter {
    async fn generate_text(&self, api_key: &str, prompt: &str) -> PortResult<String> {
        self.complete(api_key, prompt).await
    }

    async fn generate_json(&self, api_key: &str, prompt: &str) -> PortResult<serde_json::Value> {
        let raw = self.complete(api_key, prompt).await?;
        let cleaned = strip_code_fences(&raw);
        serde_json::from_str(cleaned)
            .map_err(|e| PortError::Unexpected(format!("Gemini returned invalid JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::strip_code_fences;

    #[test]
    fn strips_json_fence() {
        let raw = "```json\n{\"ok\": true}\n```";
        assert_eq!(strip_code_fences(raw), "{\"ok\": true}");
    }

    #[test]
    fn strips_bare_fence() {
        let raw = "```\n[1, 2]\n```";
        assert_eq!(strip_code_fences(raw), "[1, 2]");
    }

    #[test]
    fn leaves_plain_json_alone() {
        assert_eq!(strip_code_fences("  {\"a\": 1} "), "{\"a\": 1}");
    }
}
