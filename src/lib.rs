//! team-bonding-rs: team event plan generation with multi-provider AI
//!
//! This library turns team profiles and budget constraints into validated
//! multi-phase event plans: it builds prompts, calls a text-generation
//! provider (with performance-based selection and fallback), tolerantly
//! parses the JSON response, and filters candidates through budget and
//! travel constraints. When every step of that pipeline fails, the caller
//! still receives a deterministic set of hand-authored sample plans.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use team_bonding_rs::{
//!     GenerationRequest, LocationEnricher, PlanGenerationService, ProviderRegistry,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = Arc::new(ProviderRegistry::from_env());
//!     let service = PlanGenerationService::new(registry, LocationEnricher::offline());
//!
//!     let request = GenerationRequest::new(
//!         "fun",
//!         vec!["Ben".to_string(), "Cody".to_string()],
//!     );
//!     let result = service.generate_plans(&request, &[], &[]).await;
//!     for plan in &result.plans {
//!         println!("{} - {} VND", plan.title, plan.total_cost);
//!     }
//! }
//! ```

pub mod core;
pub mod error;
pub mod providers;
pub mod schemas;
pub(crate) mod services;
pub mod types;

pub use crate::core::PlanGenerationService;
pub use error::{PlanError, Result};
pub use providers::{
    AbArmStats, AbTestResults, AnthropicAdapter, GeminiAdapter, OpenAiAdapter, PerformanceTracker,
    ProviderAdapter, ProviderChoice, ProviderRegistry, ProviderStats, SamplingParams,
};
pub use services::constraints::{ConstraintValidator, ValidationDiagnostics};
pub use services::fallback::sample_plans;
pub use services::location::{
    GeocodedLocation, GoogleMapsBackend, LocationEnricher, MapsBackend, TravelMetrics,
};
pub use services::parser::{classify_response, parse_plan_response, ParsedShape};
pub use services::prompt::{build_user_prompt, system_instruction};
pub use types::{
    budget_ceiling_vnd, EventPhase, EventPlan, FallbackReason, GenerationMode, GenerationRequest,
    GenerationResult, PhaseCandidate, PlanCandidate, SavedEvent, TeamMember, Vibe,
    BASE_BUDGET_VND,
};

#[cfg(feature = "cli")]
pub mod cli;
