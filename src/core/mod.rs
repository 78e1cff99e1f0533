pub mod service;

pub use crate::types::result::{FallbackReason, GenerationResult};
pub use service::PlanGenerationService;
