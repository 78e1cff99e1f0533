//! Generate plans with whatever providers the environment configures.
//!
//! Set one or more of OPENAI_API_KEY / ANTHROPIC_API_KEY / GOOGLE_AI_API_KEY
//! (and optionally GOOGLE_MAPS_API_KEY), then:
//!
//! ```bash
//! cargo run --example generate_plans
//! ```

use std::sync::Arc;

use team_bonding_rs::{
    GenerationMode, GenerationRequest, GoogleMapsBackend, LocationEnricher,
    PlanGenerationService, ProviderRegistry, SavedEvent, TeamMember, Vibe,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let registry = Arc::new(ProviderRegistry::from_env());
    println!("providers: {:?}", registry.provider_names());

    let enricher = match std::env::var("GOOGLE_MAPS_API_KEY") {
        Ok(key) if !key.is_empty() => LocationEnricher::new(Arc::new(GoogleMapsBackend::new(key))),
        _ => LocationEnricher::offline(),
    };
    let service = PlanGenerationService::new(Arc::clone(&registry), enricher);

    let roster = vec![
        TeamMember::new(
            "m1",
            "Ben",
            "District 1, Ho Chi Minh City",
            vec!["hotpot".to_string(), "karaoke".to_string()],
            Vibe::Chill,
        ),
        TeamMember::new("m2", "Cody", "Binh Thanh", vec!["bbq".to_string()], Vibe::Energetic),
        TeamMember::new("m3", "Big Thanh", "District 7", Vec::new(), Vibe::Mixed),
    ];
    let history = vec![SavedEvent {
        date: "2024-01-10".to_string(),
        theme: "fun".to_string(),
        location: Some("District 1".to_string()),
        participants: vec!["Ben".to_string(), "Cody".to_string()],
        activities: vec![
            "Hotpot Dinner".to_string(),
            "Karaoke".to_string(),
            "Bar Hopping".to_string(),
        ],
        total_cost: 450_000,
        rating: 5,
    }];

    let request = GenerationRequest::new(
        "fun",
        roster.iter().map(|m| m.name.clone()).collect(),
    )
    .with_contribution(150_000)
    .with_preferred_zone("District 1")
    .with_mode(GenerationMode::Similar);

    let result = service.generate_plans(&request, &roster, &history).await;

    match (&result.provider, result.fallback_reason) {
        (Some(provider), None) => println!("\ngenerated by {}:", provider),
        (_, Some(reason)) => println!("\nfallback ({:?}):", reason),
        _ => {}
    }
    for plan in &result.plans {
        println!("\n== {} ({}/5) ==", plan.title, plan.rating);
        for phase in &plan.phases {
            println!("  {} - {} VND - {}", phase.activity, phase.cost, phase.address);
        }
        println!(
            "  total {} VND, top-up needed {} VND",
            plan.total_cost, plan.contribution_needed
        );
    }

    println!("\nprovider stats: {:?}", registry.performance_stats());
    Ok(())
}
