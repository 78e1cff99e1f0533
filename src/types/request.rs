use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::PlanError;

/// Controls how much historical context is injected into the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Fresh ideas, no historical context at all
    New,
    /// Variations inspired by a digest of recent events
    Similar,
    /// Follow the structural phase patterns of past events
    Reuse,
}

impl Default for GenerationMode {
    fn default() -> Self {
        GenerationMode::New
    }
}

impl FromStr for GenerationMode {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(GenerationMode::New),
            "similar" => Ok(GenerationMode::Similar),
            "reuse" => Ok(GenerationMode::Reuse),
            other => Err(PlanError::Config(format!(
                "Unknown generation mode '{}': expected new, similar, or reuse",
                other
            ))),
        }
    }
}

/// One user action's worth of generation input. Not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Free theme label, e.g. "fun"
    pub theme: String,
    /// Optional per-person top-up beyond the base budget (VND)
    #[serde(default)]
    pub optional_contribution: Option<i64>,
    /// Names of members available for the event
    pub available_members: Vec<String>,
    #[serde(default)]
    pub preferred_date: Option<String>,
    #[serde(default)]
    pub preferred_zone: Option<String>,
    #[serde(default)]
    pub mode: GenerationMode,
    /// Explicit provider override; `None` selects automatically
    #[serde(default)]
    pub provider: Option<String>,
    /// Explicit model override, applied where adapters are constructed
    #[serde(default)]
    pub model: Option<String>,
}

impl GenerationRequest {
    pub fn new(theme: impl Into<String>, available_members: Vec<String>) -> Self {
        Self {
            theme: theme.into(),
            optional_contribution: None,
            available_members,
            preferred_date: None,
            preferred_zone: None,
            mode: GenerationMode::New,
            provider: None,
            model: None,
        }
    }

    pub fn with_contribution(mut self, amount: i64) -> Self {
        self.optional_contribution = Some(amount);
        self
    }

    pub fn with_preferred_date(mut self, date: impl Into<String>) -> Self {
        self.preferred_date = Some(date.into());
        self
    }

    pub fn with_preferred_zone(mut self, zone: impl Into<String>) -> Self {
        self.preferred_zone = Some(zone.into());
        self
    }

    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("new".parse::<GenerationMode>().unwrap(), GenerationMode::New);
        assert_eq!(
            "Similar".parse::<GenerationMode>().unwrap(),
            GenerationMode::Similar
        );
        assert_eq!(
            " reuse ".parse::<GenerationMode>().unwrap(),
            GenerationMode::Reuse
        );
        assert!("remix".parse::<GenerationMode>().is_err());
    }

    #[test]
    fn test_request_builder() {
        let request = GenerationRequest::new("fun", vec!["Ben".to_string()])
            .with_contribution(150_000)
            .with_preferred_zone("District 1")
            .with_mode(GenerationMode::Similar);
        assert_eq!(request.theme, "fun");
        assert_eq!(request.optional_contribution, Some(150_000));
        assert_eq!(request.preferred_zone.as_deref(), Some("District 1"));
        assert_eq!(request.mode, GenerationMode::Similar);
        assert!(request.provider.is_none());
    }

    #[test]
    fn test_request_deserialize_defaults() {
        let request: GenerationRequest =
            serde_json::from_str(r#"{"theme":"fun","available_members":["Ben","Cody"]}"#).unwrap();
        assert_eq!(request.mode, GenerationMode::New);
        assert!(request.optional_contribution.is_none());
    }
}
