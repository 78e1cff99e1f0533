use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::adapter::{vendor_error_message, ProviderAdapter, SamplingParams};
use crate::error::{PlanError, Result};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-pro";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Adapter for the Google Gemini generateContent API.
///
/// Gemini has no system role; the system prompt is prepended to the user
/// text in a single user turn.
#[derive(Clone, Debug)]
pub struct GeminiAdapter {
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiAdapter {
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

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn name(&self) -> &str {
        "google"
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

        let merged_prompt = format!("{}\n\n{}", system_prompt, user_prompt);
        let body = json!({
            "contents": [
                {"role": "user", "parts": [{"text": merged_prompt}]}
            ],
            "generationConfig": {
                "temperature": params.temperature,
                "maxOutputTokens": params.max_tokens,
            },
        });

        let response = client
            .post(self.generate_url())
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PlanError::RateLimit { retry_after: 1 });
        }

        if !status.is_success() {
            return Err(PlanError::Provider {
                provider: self.name().to_string(),
                message: format!("HTTP {}: {}", status, vendor_error_message(&response_text)),
            });
        }

        let response_json: Value = serde_json::from_str(&response_text)?;

        response_json
            .get("candidates")
            .and_then(|candidates| candidates.get(0))
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(|parts| parts.get(0))
            .and_then(|part| part.get("text"))
            .and_then(|text| text.as_str())
            .map(|text| text.to_string())
            .ok_or_else(|| PlanError::Provider {
                provider: self.name().to_string(),
                message: "generateContent response missing candidate text".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_url_building() {
        let adapter = GeminiAdapter::new("key")
            .with_base_url("https://example.com/")
            .with_model("gemini-1.5-flash");
        assert_eq!(
            adapter.generate_url(),
            "https://example.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_defaults() {
        let adapter = GeminiAdapter::new("key");
        assert_eq!(adapter.name(), "google");
        assert_eq!(adapter.model(), DEFAULT_MODEL);
    }
}
