use serde::{Deserialize, Serialize};

/// Budget every member contributes without being asked (VND per person).
pub const BASE_BUDGET_VND: i64 = 300_000;

/// Cost ceiling for a plan, keyed by its own phase count.
///
/// Returns `None` for phase counts outside the allowed 1..=3 range.
pub fn budget_ceiling_vnd(phase_count: usize) -> Option<i64> {
    match phase_count {
        1 => Some(300_000),
        2 => Some(450_000),
        3 => Some(500_000),
        _ => None,
    }
}

/// One activity/venue within a multi-stop event plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPhase {
    pub activity: String,
    #[serde(default)]
    pub description: String,
    pub address: String,
    /// Derived Google Maps link; not authoritative
    pub map_link: String,
    /// VND per person
    pub cost: i64,
    pub is_indoor: bool,
    pub is_outdoor: bool,
    pub is_vegetarian_friendly: bool,
    pub is_alcohol_friendly: bool,
    /// Minutes from the previous phase; `None` for the first phase
    pub travel_time_minutes: Option<u32>,
    /// Kilometers from the previous phase; `None` for the first phase
    pub distance_km: Option<f64>,
}

/// A validated event plan ready to hand back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPlan {
    pub id: String,
    pub title: String,
    pub theme: String,
    /// 1 to 3 phases, in visiting order
    pub phases: Vec<EventPhase>,
    /// Always equals the sum of phase costs (VND per person)
    pub total_cost: i64,
    /// Names of members this plan fits best
    #[serde(default)]
    pub best_for: Vec<String>,
    /// 1..=5; neutral default is 3
    pub rating: u8,
    #[serde(default)]
    pub fit_analysis: String,
    /// `max(0, total_cost - BASE_BUDGET_VND)` in VND per person
    pub contribution_needed: i64,
    /// Long-term rotation suggestion, when the model offered one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_suggestion: Option<String>,
}

impl EventPlan {
    /// Whether members must chip in beyond the base budget.
    pub fn requires_contribution(&self) -> bool {
        self.contribution_needed > 0
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }
}

/// Raw plan object as the model reports it, before validation.
///
/// Every field is defaulted so partial model output still deserializes;
/// the constraint validator decides what survives.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanCandidate {
    pub id: Option<String>,
    pub title: String,
    pub theme: String,
    pub phases: Vec<PhaseCandidate>,
    /// Model-reported total; never trusted, always recomputed
    pub total_cost: Option<f64>,
    pub best_for: Vec<String>,
    pub rating: Option<i64>,
    pub fit_analysis: Option<String>,
    pub rotation_suggestion: Option<String>,
}

/// Raw phase object as the model reports it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PhaseCandidate {
    pub name: String,
    pub description: String,
    pub address: String,
    pub google_maps_link: Option<String>,
    /// VND per person; accepted as a float to tolerate model output
    pub cost: f64,
    pub is_indoor: bool,
    pub is_outdoor: bool,
    pub is_vegetarian_friendly: bool,
    pub is_alcohol_friendly: bool,
    /// Minutes from the previous phase
    pub travel_time: Option<f64>,
    /// Kilometers from the previous phase
    pub distance: Option<f64>,
}
