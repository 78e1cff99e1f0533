use thiserror::Error;

/// Main error type for the plan generation pipeline
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No AI provider available")]
    NoProviderAvailable,

    #[error("Provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Location lookup error: {0}")]
    LocationLookup(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Rate limit exceeded: retry after {retry_after}s")]
    RateLimit { retry_after: u64 },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PlanError>;

impl PlanError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PlanError::Provider { .. }
                | PlanError::Http(_)
                | PlanError::Timeout(_)
                | PlanError::RateLimit { .. }
        )
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            PlanError::Config(_) => "CONFIG_ERROR",
            PlanError::NoProviderAvailable => "NO_PROVIDER_AVAILABLE",
            PlanError::Provider { .. } => "PROVIDER_ERROR",
            PlanError::Http(_) => "HTTP_ERROR",
            PlanError::Serialization(_) => "SERIALIZATION_ERROR",
            PlanError::Parse(_) => "PARSE_ERROR",
            PlanError::Validation(_) => "VALIDATION_ERROR",
            PlanError::LocationLookup(_) => "LOCATION_LOOKUP_ERROR",
            PlanError::Timeout(_) => "TIMEOUT_ERROR",
            PlanError::RateLimit { .. } => "RATE_LIMIT_ERROR",
        }
    }

    /// Convert to a structured error payload
    pub fn to_error_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "retryable": self.is_retryable()
            }
        })
    }
}
