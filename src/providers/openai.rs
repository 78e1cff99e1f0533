use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::adapter::{vendor_error_message, ProviderAdapter, SamplingParams};
use crate::error::{PlanError, Result};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Adapter for OpenAI-compatible chat-completion endpoints.
#[derive(Clone, Debug)]
pub struct OpenAiAdapter {
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiAdapter {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn chat_url(&self) -> String {
        let trimmed = self.base_url.trim_end_matches('/');
        if trimmed.ends_with("/chat/completions") {
            trimmed.to_string()
        } else {
            format!("{}/chat/completions", trimmed)
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: &SamplingParams,
    ) -> Result<String> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt}
            ],
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        });

        let response = client
            .post(self.chat_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let response_text = response.text().await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = headers
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(PlanError::RateLimit { retry_after });
        }

        if !status.is_success() {
            return Err(PlanError::Provider {
                provider: self.name().to_string(),
                message: format!("HTTP {}: {}", status, vendor_error_message(&response_text)),
            });
        }

        let response_json: Value = serde_json::from_str(&response_text)?;

        if let Some(error) = response_json.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| error.to_string());
            return Err(PlanError::Provider {
                provider: self.name().to_string(),
                message,
            });
        }

        response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .map(|content| content.to_string())
            .ok_or_else(|| PlanError::Provider {
                provider: self.name().to_string(),
                message: "completion response missing message content".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_url_building() {
        let adapter = OpenAiAdapter::new("key").with_base_url("https://example.com/v1/");
        assert_eq!(adapter.chat_url(), "https://example.com/v1/chat/completions");

        let adapter =
            OpenAiAdapter::new("key").with_base_url("https://example.com/v1/chat/completions");
        assert_eq!(adapter.chat_url(), "https://example.com/v1/chat/completions");
    }

    #[test]
    fn test_defaults() {
        let adapter = OpenAiAdapter::new("key");
        assert_eq!(adapter.name(), "openai");
        assert_eq!(adapter.model(), DEFAULT_MODEL);
    }
}
