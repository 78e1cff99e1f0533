//! Provider adapters and the registry that selects between them

pub mod adapter;
pub mod anthropic;
pub mod gemini;
pub mod openai;
pub mod performance;
pub mod registry;

pub use adapter::{ProviderAdapter, SamplingParams};
pub use anthropic::AnthropicAdapter;
pub use gemini::GeminiAdapter;
pub use openai::OpenAiAdapter;
pub use performance::{PerformanceRecord, PerformanceTracker, ProviderStats};
pub use registry::{AbArmStats, AbTestResults, ProviderChoice, ProviderRegistry};
