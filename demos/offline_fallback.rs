//! Run the pipeline with no providers configured: the service degrades to
//! the hand-authored sample plans instead of failing.
//!
//! ```bash
//! cargo run --example offline_fallback
//! ```

use std::sync::Arc;

use team_bonding_rs::{
    GenerationRequest, LocationEnricher, PlanGenerationService, ProviderRegistry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let registry = Arc::new(ProviderRegistry::default());
    let service = PlanGenerationService::new(registry, LocationEnricher::offline());

    let request = GenerationRequest::new(
        "fun",
        vec!["Ben".to_string(), "Cody".to_string(), "Big Thanh".to_string()],
    )
    .with_contribution(150_000);

    let result = service.generate_plans(&request, &[], &[]).await;

    println!(
        "fallback reason: {:?} - {} plans\n",
        result.fallback_reason,
        result.plan_count()
    );
    for plan in &result.plans {
        println!(
            "{} - {} VND/person, {} phases, top-up {} VND",
            plan.title,
            plan.total_cost,
            plan.phase_count(),
            plan.contribution_needed
        );
    }
    Ok(())
}
