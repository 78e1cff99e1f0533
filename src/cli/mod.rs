use std::sync::Arc;

use clap::{Arg, Command};
use tracing::info;

use crate::{
    GenerationMode, GenerationRequest, GoogleMapsBackend, LocationEnricher,
    PlanGenerationService, ProviderRegistry, SavedEvent, TeamMember, Vibe,
};

/// CLI entry point for the team-bonding tool
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let matches = Command::new("team-bonding")
        .version("0.1.0")
        .about("Generate validated team bonding event plans with multi-provider AI")
        .arg(
            Arg::new("theme")
                .help("Theme for the event, e.g. \"fun\" or \"chill\"")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("members")
                .short('M')
                .long("members")
                .value_name("NAMES")
                .help("Comma-separated names of available members")
                .required(true),
        )
        .arg(
            Arg::new("contribution")
                .short('c')
                .long("contribution")
                .value_name("VND")
                .help("Optional per-person top-up beyond the 300,000 VND base budget"),
        )
        .arg(
            Arg::new("date")
                .short('d')
                .long("date")
                .value_name("WHEN")
                .help("Preferred date/time, free text"),
        )
        .arg(
            Arg::new("zone")
                .short('z')
                .long("zone")
                .value_name("ZONE")
                .help("Preferred location zone, e.g. \"District 1\""),
        )
        .arg(
            Arg::new("mode")
                .short('g')
                .long("mode")
                .value_name("MODE")
                .help("Generation mode: new, similar, or reuse")
                .default_value("new"),
        )
        .arg(
            Arg::new("provider")
                .short('p')
                .long("provider")
                .value_name("NAME")
                .help("Explicit provider: openai, anthropic, or google"),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .help("Model override for the selected provider"),
        )
        .arg(
            Arg::new("team-file")
                .short('t')
                .long("team-file")
                .value_name("PATH")
                .help("JSON file with the team roster"),
        )
        .arg(
            Arg::new("history-file")
                .short('H')
                .long("history-file")
                .value_name("PATH")
                .help("JSON file with past events, used by similar/reuse modes"),
        )
        .arg(
            Arg::new("timeout")
                .short('T')
                .long("timeout")
                .value_name("SECONDS")
                .help("Generation timeout in seconds")
                .default_value("30"),
        )
        .get_matches();

    let members: Vec<String> = matches
        .get_one::<String>("members")
        .unwrap()
        .split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    let mode: GenerationMode = matches.get_one::<String>("mode").unwrap().parse()?;

    let mut request = GenerationRequest::new(
        matches.get_one::<String>("theme").unwrap().as_str(),
        members.clone(),
    )
    .with_mode(mode);
    if let Some(contribution) = matches.get_one::<String>("contribution") {
        request = request.with_contribution(contribution.parse()?);
    }
    if let Some(date) = matches.get_one::<String>("date") {
        request = request.with_preferred_date(date.as_str());
    }
    if let Some(zone) = matches.get_one::<String>("zone") {
        request = request.with_preferred_zone(zone.as_str());
    }
    if let Some(provider) = matches.get_one::<String>("provider") {
        request = request.with_provider(provider.as_str());
    }
    if let Some(model) = matches.get_one::<String>("model") {
        request.model = Some(model.clone());
    }

    let roster = match matches.get_one::<String>("team-file") {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str::<Vec<TeamMember>>(&content)?
        }
        // No roster store wired up: synthesize members from the names given
        None => members
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                TeamMember::new(
                    format!("m{}", idx + 1),
                    name.clone(),
                    "Ho Chi Minh City",
                    Vec::new(),
                    Vibe::Mixed,
                )
            })
            .collect(),
    };

    let history = match matches.get_one::<String>("history-file") {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str::<Vec<SavedEvent>>(&content)?
        }
        None => Vec::new(),
    };

    let registry = Arc::new(ProviderRegistry::from_env());
    info!("Configured providers: {:?}", registry.provider_names());

    let enricher = match std::env::var("GOOGLE_MAPS_API_KEY") {
        Ok(key) if !key.is_empty() => {
            LocationEnricher::new(Arc::new(GoogleMapsBackend::new(key)))
        }
        _ => LocationEnricher::offline(),
    };

    let timeout_seconds: u64 = matches.get_one::<String>("timeout").unwrap().parse()?;
    let service = PlanGenerationService::new(registry, enricher)
        .with_generation_timeout(std::time::Duration::from_secs(timeout_seconds));
    let result = service.generate_plans(&request, &roster, &history).await;

    if let Some(reason) = result.fallback_reason {
        println!(
            "(no usable AI output - showing sample plans; reason: {:?})\n",
            reason
        );
    } else if let Some(provider) = &result.provider {
        println!("Plans generated by {}:\n", provider);
    }

    for plan in &result.plans {
        println!("=== {} [{}] ===", plan.title, plan.theme);
        println!(
            "Total: {} VND per person (top-up needed: {} VND) - rated {}/5",
            plan.total_cost, plan.contribution_needed, plan.rating
        );
        for (idx, phase) in plan.phases.iter().enumerate() {
            let leg = match (phase.travel_time_minutes, phase.distance_km) {
                (Some(minutes), Some(km)) => format!(" ({} min, {:.1} km from previous)", minutes, km),
                _ => String::new(),
            };
            println!(
                "  {}. {} - {} VND - {}{}",
                idx + 1,
                phase.activity,
                phase.cost,
                phase.address,
                leg
            );
        }
        if !plan.fit_analysis.is_empty() {
            println!("  Fit: {}", plan.fit_analysis);
        }
        println!();
    }

    info!(
        "Done in {:.2}s ({} plans)",
        result.duration.as_secs_f64(),
        result.plan_count()
    );
    Ok(())
}
