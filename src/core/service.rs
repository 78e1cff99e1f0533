use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;
use tracing::{info, warn};

use crate::providers::adapter::SamplingParams;
use crate::providers::registry::{ProviderChoice, ProviderRegistry};
use crate::services::constraints::{ConstraintValidator, ValidationDiagnostics};
use crate::services::fallback;
use crate::services::location::LocationEnricher;
use crate::services::parser;
use crate::services::prompt;
use crate::types::history::SavedEvent;
use crate::types::request::GenerationRequest;
use crate::types::result::{FallbackReason, GenerationResult};
use crate::types::team::TeamMember;

const GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Orchestrates one generation request through
/// BuildingPrompt → Generating → Parsing → Validating → Done, degrading to
/// the Fallback branch instead of ever surfacing a hard failure.
#[derive(Debug)]
pub struct PlanGenerationService {
    registry: Arc<ProviderRegistry>,
    validator: ConstraintValidator,
    sampling: SamplingParams,
    generation_timeout: Duration,
}

impl PlanGenerationService {
    pub fn new(registry: Arc<ProviderRegistry>, enricher: LocationEnricher) -> Self {
        Self {
            registry,
            validator: ConstraintValidator::new(enricher),
            sampling: SamplingParams::default(),
            generation_timeout: GENERATION_TIMEOUT,
        }
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Run one request through the pipeline.
    ///
    /// Always returns a non-empty plan list; `fallback_reason` on the result
    /// tells the caller when it is looking at canned content.
    pub async fn generate_plans(
        &self,
        request: &GenerationRequest,
        roster: &[TeamMember],
        history: &[SavedEvent],
    ) -> GenerationResult {
        let started = Instant::now();

        let system_prompt = prompt::system_instruction();
        let user_prompt = prompt::build_user_prompt(request, roster, history);

        let choice = match &request.provider {
            Some(name) => ProviderChoice::Explicit(name.clone()),
            None => ProviderChoice::Auto,
        };
        let adapter = match self.registry.select(&choice) {
            Ok(adapter) => adapter,
            Err(err) => {
                warn!(
                    target: "teambonding::pipeline",
                    error = %err,
                    "no provider available, serving fallback plans"
                );
                return self.fallback_result(FallbackReason::NoProvider, None, started);
            }
        };
        let provider = adapter.name().to_string();
        if let Some(requested) = &request.model {
            if requested != adapter.model() {
                warn!(
                    target: "teambonding::pipeline",
                    requested = %requested,
                    configured = adapter.model(),
                    "requested model differs from the adapter's configured model"
                );
            }
        }
        info!(
            target: "teambonding::pipeline",
            provider = %provider,
            model = adapter.model(),
            mode = ?request.mode,
            "generating plans"
        );

        let attempt = Instant::now();
        let response = timeout(
            self.generation_timeout,
            adapter.generate(&system_prompt, &user_prompt, &self.sampling),
        )
        .await;
        let latency = attempt.elapsed().as_secs_f64();

        let raw = match response {
            Ok(Ok(text)) => {
                self.registry.record_outcome(&provider, latency, true, None);
                text
            }
            Ok(Err(err)) => {
                self.registry
                    .record_outcome(&provider, latency, false, Some(&err.to_string()));
                warn!(
                    target: "teambonding::pipeline",
                    provider = %provider,
                    error = %err,
                    "provider call failed, serving fallback plans"
                );
                return self.fallback_result(
                    FallbackReason::ProviderFailed,
                    Some(provider),
                    started,
                );
            }
            Err(_) => {
                self.registry.record_outcome(
                    &provider,
                    latency,
                    false,
                    Some("generation timed out"),
                );
                warn!(
                    target: "teambonding::pipeline",
                    provider = %provider,
                    timeout_secs = self.generation_timeout.as_secs(),
                    "provider call timed out, serving fallback plans"
                );
                return self.fallback_result(
                    FallbackReason::ProviderFailed,
                    Some(provider),
                    started,
                );
            }
        };

        let candidates = parser::parse_plan_response(&raw);
        if candidates.is_empty() {
            warn!(
                target: "teambonding::pipeline",
                provider = %provider,
                "response yielded no candidates, serving fallback plans"
            );
            return self.fallback_result(FallbackReason::ParseFailed, Some(provider), started);
        }

        let (plans, diagnostics) = self
            .validator
            .validate_with_diagnostics(&candidates, request.optional_contribution)
            .await;
        if plans.is_empty() {
            warn!(
                target: "teambonding::pipeline",
                provider = %provider,
                examined = diagnostics.examined,
                over_budget = diagnostics.rejected_budget,
                too_far = diagnostics.rejected_distance,
                "every candidate failed validation, serving fallback plans"
            );
            let mut result =
                self.fallback_result(FallbackReason::AllRejected, Some(provider), started);
            result.diagnostics = diagnostics;
            return result;
        }

        info!(
            target: "teambonding::pipeline",
            provider = %provider,
            plans = plans.len(),
            rejected = diagnostics.rejected_total(),
            "generation complete"
        );
        GenerationResult {
            plans,
            provider: Some(provider),
            fallback_reason: None,
            diagnostics,
            duration: started.elapsed(),
        }
    }

    fn fallback_result(
        &self,
        reason: FallbackReason,
        provider: Option<String>,
        started: Instant,
    ) -> GenerationResult {
        GenerationResult {
            plans: fallback::sample_plans(),
            provider,
            fallback_reason: Some(reason),
            diagnostics: ValidationDiagnostics::default(),
            duration: started.elapsed(),
        }
    }
}
