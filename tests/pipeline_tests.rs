use async_trait::async_trait;
use std::sync::Arc;

use team_bonding_rs::{
    budget_ceiling_vnd, FallbackReason, GenerationMode, GenerationRequest, LocationEnricher,
    PlanError, PlanGenerationService, ProviderAdapter, ProviderRegistry, Result, SamplingParams,
    SavedEvent, TeamMember, Vibe, BASE_BUDGET_VND,
};

/// Test adapter that replays a canned response or failure.
#[derive(Debug)]
struct ScriptedAdapter {
    name: &'static str,
    response: std::result::Result<String, String>,
}

impl ScriptedAdapter {
    fn ok(name: &'static str, response: impl Into<String>) -> Self {
        Self {
            name,
            response: Ok(response.into()),
        }
    }

    fn failing(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            response: Err(message.into()),
        }
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    fn name(&self) -> &str {
        self.name
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn generate(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _params: &SamplingParams,
    ) -> Result<String> {
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(PlanError::Provider {
                provider: self.name.to_string(),
                message: message.clone(),
            }),
        }
    }
}

fn roster() -> Vec<TeamMember> {
    vec![
        TeamMember::new("m1", "Ben", "District 1", vec!["hotpot".to_string()], Vibe::Chill),
        TeamMember::new("m2", "Cody", "Binh Thanh", Vec::new(), Vibe::Energetic),
        TeamMember::new("m3", "Big Thanh", "District 7", Vec::new(), Vibe::Mixed),
    ]
}

fn request() -> GenerationRequest {
    GenerationRequest::new(
        "fun",
        vec!["Ben".to_string(), "Cody".to_string(), "Big Thanh".to_string()],
    )
    .with_contribution(150_000)
}

fn service_with(adapter: ScriptedAdapter) -> PlanGenerationService {
    let registry = Arc::new(ProviderRegistry::default());
    registry.register(Arc::new(adapter));
    PlanGenerationService::new(registry, LocationEnricher::offline())
}

// Scenario A: all providers down -> the fixed fallback plan list
#[tokio::test]
async fn all_providers_down_yields_fallback_plans() {
    let registry = Arc::new(ProviderRegistry::default());
    registry.register(Arc::new(ScriptedAdapter::ok("openai", "{}")));
    registry.register(Arc::new(ScriptedAdapter::ok("google", "{}")));
    registry.set_available("openai", false);
    registry.set_available("google", false);

    let service = PlanGenerationService::new(registry, LocationEnricher::offline());
    let result = service.generate_plans(&request(), &roster(), &[]).await;

    assert_eq!(result.fallback_reason, Some(FallbackReason::NoProvider));
    assert!(result.provider.is_none());
    assert!(!result.plans.is_empty());
    for plan in &result.plans {
        let recomputed: i64 = plan.phases.iter().map(|p| p.cost).sum();
        assert_eq!(plan.total_cost, recomputed);
        assert!(plan.total_cost <= budget_ceiling_vnd(plan.phase_count()).unwrap());
        assert_eq!(
            plan.contribution_needed,
            (plan.total_cost - BASE_BUDGET_VND).max(0)
        );
    }
}

#[tokio::test]
async fn empty_registry_yields_fallback_plans() {
    let registry = Arc::new(ProviderRegistry::default());
    let service = PlanGenerationService::new(registry, LocationEnricher::offline());
    let result = service.generate_plans(&request(), &roster(), &[]).await;
    assert_eq!(result.fallback_reason, Some(FallbackReason::NoProvider));
    assert!(!result.plans.is_empty());
}

// Scenario B: fenced one-phase plan within budget survives end to end
#[tokio::test]
async fn fenced_plan_within_budget_is_returned() {
    let response = "```json\n{\"plans\":[{\"id\":\"p1\",\"title\":\"Dinner\",\"theme\":\"fun\",\
        \"phases\":[{\"name\":\"Hotpot\",\"description\":\"\",\"address\":\"123 Nguyen Hue\",\
        \"googleMapsLink\":null,\"cost\":250000,\"isIndoor\":true,\"isOutdoor\":false,\
        \"isVegetarianFriendly\":true,\"isAlcoholFriendly\":false,\"travelTime\":null,\
        \"distance\":null}],\"totalCost\":250000,\"bestFor\":[\"Ben\"],\"rating\":4,\
        \"fitAnalysis\":\"solid\"}]}\n```";
    let service = service_with(ScriptedAdapter::ok("openai", response));

    let result = service.generate_plans(&request(), &roster(), &[]).await;

    assert!(result.fallback_reason.is_none());
    assert_eq!(result.provider.as_deref(), Some("openai"));
    assert_eq!(result.plans.len(), 1);
    let plan = &result.plans[0];
    assert_eq!(plan.total_cost, 250_000);
    assert_eq!(plan.contribution_needed, 0);
    assert_eq!(plan.best_for, vec!["Ben".to_string()]);
    assert_eq!(plan.phases[0].activity, "Hotpot");
}

// Scenario C: a 3-phase plan totalling 600,000 is rejected and, being the
// only candidate, forces the fallback path
#[tokio::test]
async fn over_budget_only_candidate_forces_fallback() {
    let response = r#"{"plans":[{"title":"Big night","theme":"fun","phases":[
        {"name":"Dinner","address":"a","cost":200000,"travelTime":null,"distance":null},
        {"name":"Karaoke","address":"b","cost":200000,"travelTime":5,"distance":1.0},
        {"name":"Bar","address":"c","cost":200000,"travelTime":5,"distance":1.0}
    ],"totalCost":600000}]}"#;
    let service = service_with(ScriptedAdapter::ok("openai", response));

    let result = service.generate_plans(&request(), &roster(), &[]).await;

    assert_eq!(result.fallback_reason, Some(FallbackReason::AllRejected));
    assert_eq!(result.provider.as_deref(), Some("openai"));
    assert_eq!(result.diagnostics.rejected_budget, 1);
    assert!(!result.plans.is_empty());
}

#[tokio::test]
async fn unparseable_response_forces_fallback() {
    let service = service_with(ScriptedAdapter::ok("openai", "Sorry, I cannot help with that."));
    let result = service.generate_plans(&request(), &roster(), &[]).await;
    assert_eq!(result.fallback_reason, Some(FallbackReason::ParseFailed));
    assert!(!result.plans.is_empty());
}

#[tokio::test]
async fn provider_failure_forces_fallback_and_is_recorded() {
    let service = service_with(ScriptedAdapter::failing("openai", "quota exceeded"));
    let result = service.generate_plans(&request(), &roster(), &[]).await;

    assert_eq!(result.fallback_reason, Some(FallbackReason::ProviderFailed));
    assert!(!result.plans.is_empty());

    let stats = service.registry().performance_stats();
    let openai = &stats["openai"];
    assert_eq!(openai.total_requests, 1);
    assert_eq!(openai.successful_requests, 0);
    assert!(openai.recent_errors[0].contains("quota exceeded"));
}

#[tokio::test]
async fn successful_generation_is_recorded() {
    let response = r#"{"plans":[{"title":"Dinner","phases":[{"name":"Hotpot","address":"a","cost":250000}]}]}"#;
    let service = service_with(ScriptedAdapter::ok("openai", response));
    let result = service.generate_plans(&request(), &roster(), &[]).await;

    assert!(result.fallback_reason.is_none());
    let stats = service.registry().performance_stats();
    assert_eq!(stats["openai"].successful_requests, 1);
    assert_eq!(stats["openai"].success_rate, 1.0);
}

#[tokio::test]
async fn explicit_provider_override_is_honored() {
    let registry = Arc::new(ProviderRegistry::default());
    registry.register(Arc::new(ScriptedAdapter::ok(
        "openai",
        r#"{"plans":[{"title":"From openai","phases":[{"name":"A","address":"x","cost":100000}]}]}"#,
    )));
    registry.register(Arc::new(ScriptedAdapter::ok(
        "google",
        r#"{"plans":[{"title":"From google","phases":[{"name":"B","address":"y","cost":100000}]}]}"#,
    )));
    registry.set_default_provider("openai");

    let service = PlanGenerationService::new(registry, LocationEnricher::offline());
    let mut req = request();
    req.provider = Some("google".to_string());
    let result = service.generate_plans(&req, &roster(), &[]).await;

    assert_eq!(result.provider.as_deref(), Some("google"));
    assert_eq!(result.plans[0].title, "From google");
}

#[tokio::test]
async fn explicit_unknown_provider_falls_back() {
    let service = service_with(ScriptedAdapter::ok("openai", "{}"));
    let mut req = request();
    req.provider = Some("anthropic".to_string());
    let result = service.generate_plans(&req, &roster(), &[]).await;
    assert_eq!(result.fallback_reason, Some(FallbackReason::NoProvider));
}

// Scenario D: reuse mode injects the structural digest, new mode stays clean
#[tokio::test]
async fn history_digest_reaches_the_prompt_only_in_reuse_mode() {
    let history = vec![SavedEvent {
        date: "2024-01-10".to_string(),
        theme: "fun".to_string(),
        location: None,
        participants: Vec::new(),
        activities: vec![
            "Hotpot Dinner".to_string(),
            "Karaoke".to_string(),
            "Bar Hopping".to_string(),
        ],
        total_cost: 450_000,
        rating: 5,
    }];

    let reuse_prompt = team_bonding_rs::build_user_prompt(
        &request().with_mode(GenerationMode::Reuse),
        &roster(),
        &history,
    );
    assert!(reuse_prompt.contains("- fun: 3 phases (Hotpot Dinner → Karaoke → Bar Hopping)"));

    let new_prompt = team_bonding_rs::build_user_prompt(
        &request().with_mode(GenerationMode::New),
        &roster(),
        &history,
    );
    assert!(!new_prompt.contains("Hotpot Dinner"));
    assert!(!new_prompt.contains("phase patterns"));
}

#[test]
fn error_payloads_carry_codes() {
    let error = PlanError::NoProviderAvailable;
    assert_eq!(error.error_code(), "NO_PROVIDER_AVAILABLE");
    assert!(!error.is_retryable());

    let error = PlanError::Provider {
        provider: "openai".to_string(),
        message: "boom".to_string(),
    };
    let payload = error.to_error_payload();
    assert_eq!(payload["error"]["code"], "PROVIDER_ERROR");
    assert_eq!(payload["error"]["retryable"], true);
}
