use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::services::constraints::ValidationDiagnostics;
use crate::types::plan::EventPlan;

/// Why a request ended up on the fallback branch.
///
/// The bounded set of entry conditions into `Fallback`; there is no other
/// way to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Registry empty, or every adapter marked unavailable
    NoProvider,
    /// The selected adapter failed or timed out
    ProviderFailed,
    /// The response yielded zero candidates
    ParseFailed,
    /// Every candidate failed constraint validation
    AllRejected,
}

/// Result of one plan generation run.
///
/// Always carries a non-empty plan list; `fallback_reason` is the explicit
/// metadata that lets the caller tell canned content from real output.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub plans: Vec<EventPlan>,
    /// Provider that produced the plans; `None` on the fallback path
    pub provider: Option<String>,
    pub fallback_reason: Option<FallbackReason>,
    pub diagnostics: ValidationDiagnostics,
    /// Total pipeline duration
    pub duration: Duration,
}

impl GenerationResult {
    /// Whether the plans are the hand-authored fallback set.
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }

    pub fn plan_count(&self) -> usize {
        self.plans.len()
    }
}
