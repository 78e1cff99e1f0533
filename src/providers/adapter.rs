use async_trait::async_trait;

use crate::error::Result;

/// Sampling parameters passed to every adapter call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

/// Uniform interface over one externally-hosted text-generation backend.
///
/// Each adapter maps the call onto one vendor's chat-completion wire format,
/// passing the system prompt as a system-role message (or prepended text for
/// vendors without a system role). Adapters never retry; the retry-to-fallback
/// policy lives in the plan generation service.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + std::fmt::Debug {
    /// Registry name of this provider, e.g. "openai"
    fn name(&self) -> &str;

    /// Model identifier sent on the wire
    fn model(&self) -> &str;

    /// Run one completion and return the raw response text.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: &SamplingParams,
    ) -> Result<String>;
}

/// Shared helper: pull a human-readable message out of a vendor error body.
pub(crate) fn vendor_error_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get("error")
            .and_then(|error| error.get("message"))
            .and_then(|message| message.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}
