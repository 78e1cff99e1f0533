//! Hand-authored sample plans for the fallback branch.
//!
//! Returned whenever generation, parsing, or validation produces nothing
//! usable, so the caller always receives a non-empty, well-formed plan list.
//! Every plan here satisfies the Budget Ladder and the travel rule.

use crate::services::location::LocationEnricher;
use crate::types::plan::{EventPhase, EventPlan, BASE_BUDGET_VND};

/// The deterministic fallback plan set.
pub fn sample_plans() -> Vec<EventPlan> {
    vec![
        hotpot_karaoke_night(),
        chill_cafe_afternoon(),
        riverside_dinner(),
    ]
}

fn phase(
    activity: &str,
    description: &str,
    address: &str,
    cost: i64,
    flags: (bool, bool, bool, bool),
    leg: Option<(u32, f64)>,
) -> EventPhase {
    let (is_indoor, is_outdoor, is_vegetarian_friendly, is_alcohol_friendly) = flags;
    EventPhase {
        activity: activity.to_string(),
        description: description.to_string(),
        address: address.to_string(),
        map_link: LocationEnricher::map_link(address),
        cost,
        is_indoor,
        is_outdoor,
        is_vegetarian_friendly,
        is_alcohol_friendly,
        travel_time_minutes: leg.map(|(minutes, _)| minutes),
        distance_km: leg.map(|(_, km)| km),
    }
}

fn plan(
    id: &str,
    title: &str,
    theme: &str,
    phases: Vec<EventPhase>,
    best_for: &[&str],
    rating: u8,
    fit_analysis: &str,
    rotation_suggestion: &str,
) -> EventPlan {
    let total_cost: i64 = phases.iter().map(|p| p.cost).sum();
    EventPlan {
        id: id.to_string(),
        title: title.to_string(),
        theme: theme.to_string(),
        phases,
        total_cost,
        best_for: best_for.iter().map(|s| s.to_string()).collect(),
        rating,
        fit_analysis: fit_analysis.to_string(),
        contribution_needed: (total_cost - BASE_BUDGET_VND).max(0),
        rotation_suggestion: Some(rotation_suggestion.to_string()),
    }
}

fn hotpot_karaoke_night() -> EventPlan {
    plan(
        "fallback-1",
        "Hotpot & Karaoke Night",
        "fun",
        vec![
            phase(
                "Hotpot Dinner",
                "Shared hotpot with vegetarian broth available",
                "123 Nguyen Hue, District 1",
                250_000,
                (true, false, true, false),
                None,
            ),
            phase(
                "Karaoke",
                "Private room, one hour of singing",
                "456 Le Loi, District 1",
                100_000,
                (true, false, true, false),
                Some((8, 1.1)),
            ),
            phase(
                "Rooftop Drinks",
                "Nightcap with a city view",
                "789 Bui Vien, District 1",
                100_000,
                (false, true, false, true),
                Some((10, 1.4)),
            ),
        ],
        &[],
        4,
        "A proven crowd-pleaser covering dinner, singing, and a wind-down.",
        "Rotate the dinner venue monthly so the night stays fresh.",
    )
}

fn chill_cafe_afternoon() -> EventPlan {
    plan(
        "fallback-2",
        "Chill Cafe & Board Games",
        "chill",
        vec![
            phase(
                "Specialty Cafe",
                "Coffee, tea, and pastries in a quiet corner",
                "321 Thao Dien, District 2",
                150_000,
                (true, false, true, false),
                None,
            ),
            phase(
                "Board Game Lounge",
                "Two hours of cooperative and party games",
                "654 Xuan Thuy, District 2",
                50_000,
                (true, false, true, false),
                Some((6, 0.9)),
            ),
        ],
        &[],
        4,
        "Low-key afternoon for members who prefer conversation over crowds.",
        "Alternate with an outdoor picnic when the weather cooperates.",
    )
}

fn riverside_dinner() -> EventPlan {
    plan(
        "fallback-3",
        "Riverside Dinner",
        "mixed",
        vec![phase(
            "Riverside Restaurant",
            "Set dinner by the Saigon River, vegetarian menu on request",
            "15 Ton Duc Thang, District 1",
            280_000,
            (false, true, true, true),
            None,
        )],
        &[],
        3,
        "Single-stop option that fits the base budget with no travel between venues.",
        "Keep as the simple default when schedules are tight.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::plan::budget_ceiling_vnd;

    #[test]
    fn test_sample_plans_nonempty() {
        assert!(!sample_plans().is_empty());
    }

    #[test]
    fn test_sample_plans_satisfy_budget_ladder() {
        for plan in sample_plans() {
            let recomputed: i64 = plan.phases.iter().map(|p| p.cost).sum();
            assert_eq!(plan.total_cost, recomputed, "plan {}", plan.id);
            let ceiling = budget_ceiling_vnd(plan.phase_count())
                .unwrap_or_else(|| panic!("plan {} has bad phase count", plan.id));
            assert!(plan.total_cost <= ceiling, "plan {} over ceiling", plan.id);
        }
    }

    #[test]
    fn test_sample_plans_satisfy_travel_rule() {
        for plan in sample_plans() {
            assert!(plan.phases[0].distance_km.is_none());
            assert!(plan.phases[0].travel_time_minutes.is_none());
            for phase in plan.phases.iter().skip(1) {
                assert!(phase.distance_km.unwrap() <= 2.0, "plan {}", plan.id);
                assert!(phase.travel_time_minutes.unwrap() <= 15, "plan {}", plan.id);
            }
        }
    }

    #[test]
    fn test_sample_plans_contribution_arithmetic() {
        for plan in sample_plans() {
            assert_eq!(
                plan.contribution_needed,
                (plan.total_cost - BASE_BUDGET_VND).max(0),
                "plan {}",
                plan.id
            );
        }
    }

    #[test]
    fn test_sample_plans_are_deterministic() {
        let first = sample_plans();
        let second = sample_plans();
        assert_eq!(first, second);
    }
}
