//! Constraint validation for plan candidates.
//!
//! A pure filter: non-conforming candidates are dropped silently and
//! conforming ones only gain derived fields. Rejection reasons are counted
//! so operators can tell "model is consistently over budget" from "model is
//! fine" without changing the caller-facing contract.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::services::location::LocationEnricher;
use crate::types::plan::{
    budget_ceiling_vnd, EventPhase, EventPlan, PhaseCandidate, PlanCandidate, BASE_BUDGET_VND,
};

const MAX_LEG_DISTANCE_KM: f64 = 2.0;
const MAX_LEG_TRAVEL_MINUTES: f64 = 15.0;
const DEFAULT_RATING: u8 = 3;

/// Rejection counters for one validation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationDiagnostics {
    pub examined: usize,
    /// Phase count outside 1..=3 or a negative phase cost
    pub rejected_shape: usize,
    /// Recomputed total exceeds the Budget Ladder ceiling
    pub rejected_budget: usize,
    /// A leg exceeds the distance or travel-time bound
    pub rejected_distance: usize,
}

impl ValidationDiagnostics {
    pub fn rejected_total(&self) -> usize {
        self.rejected_shape + self.rejected_budget + self.rejected_distance
    }
}

/// Applies the budget ladder, the inter-phase travel rule, and the
/// phase-count policy to candidate plans.
#[derive(Clone, Debug)]
pub struct ConstraintValidator {
    enricher: LocationEnricher,
}

impl ConstraintValidator {
    pub fn new(enricher: LocationEnricher) -> Self {
        Self { enricher }
    }

    /// Validate candidates, returning only the conforming plans.
    pub async fn validate(
        &self,
        candidates: &[PlanCandidate],
        optional_contribution: Option<i64>,
    ) -> Vec<EventPlan> {
        self.validate_with_diagnostics(candidates, optional_contribution)
            .await
            .0
    }

    /// Validate candidates and report rejection counts alongside.
    pub async fn validate_with_diagnostics(
        &self,
        candidates: &[PlanCandidate],
        optional_contribution: Option<i64>,
    ) -> (Vec<EventPlan>, ValidationDiagnostics) {
        let mut diagnostics = ValidationDiagnostics {
            examined: candidates.len(),
            ..Default::default()
        };
        let mut plans = Vec::new();

        for (idx, candidate) in candidates.iter().enumerate() {
            match self.check_candidate(candidate, idx).await {
                Ok(plan) => {
                    if let Some(offered) = optional_contribution {
                        if plan.contribution_needed > offered {
                            warn!(
                                target: "teambonding::pipeline",
                                plan = %plan.id,
                                needed = plan.contribution_needed,
                                offered,
                                "plan needs more top-up than the caller offered"
                            );
                        }
                    }
                    plans.push(plan);
                }
                Err(rejection) => {
                    debug!(
                        target: "teambonding::pipeline",
                        candidate = idx,
                        reason = ?rejection,
                        "dropping candidate"
                    );
                    match rejection {
                        Rejection::Shape => diagnostics.rejected_shape += 1,
                        Rejection::Budget => diagnostics.rejected_budget += 1,
                        Rejection::Distance => diagnostics.rejected_distance += 1,
                    }
                }
            }
        }

        (plans, diagnostics)
    }

    async fn check_candidate(
        &self,
        candidate: &PlanCandidate,
        idx: usize,
    ) -> Result<EventPlan, Rejection> {
        // Never trust the model-reported total
        let ceiling = budget_ceiling_vnd(candidate.phases.len()).ok_or(Rejection::Shape)?;
        if candidate.phases.iter().any(|phase| phase.cost < 0.0) {
            return Err(Rejection::Shape);
        }
        let total_cost: i64 = candidate
            .phases
            .iter()
            .map(|phase| phase.cost.round() as i64)
            .sum();
        if total_cost > ceiling {
            return Err(Rejection::Budget);
        }

        let phases = self.check_legs(&candidate.phases).await?;

        let rating = candidate
            .rating
            .map(|r| r.clamp(1, 5) as u8)
            .unwrap_or(DEFAULT_RATING);

        Ok(EventPlan {
            id: candidate
                .id
                .clone()
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("plan-{}", idx + 1)),
            title: candidate.title.clone(),
            theme: candidate.theme.clone(),
            phases,
            total_cost,
            best_for: candidate.best_for.clone(),
            rating,
            fit_analysis: candidate.fit_analysis.clone().unwrap_or_default(),
            contribution_needed: (total_cost - BASE_BUDGET_VND).max(0),
            rotation_suggestion: candidate.rotation_suggestion.clone(),
        })
    }

    /// Check every consecutive phase pair and build the validated phases.
    ///
    /// Reported metrics are checked as-is; when a leg reports neither
    /// distance nor travel time, the enricher computes them from the two
    /// addresses. Absence of data is never by itself disqualifying.
    async fn check_legs(&self, candidates: &[PhaseCandidate]) -> Result<Vec<EventPhase>, Rejection> {
        let mut phases = Vec::with_capacity(candidates.len());

        for (idx, phase) in candidates.iter().enumerate() {
            let (travel_time_minutes, distance_km) = if idx == 0 {
                // No predecessor
                (None, None)
            } else {
                let mut minutes = phase.travel_time;
                let mut distance = phase.distance;

                if minutes.is_none() && distance.is_none() {
                    let previous = &candidates[idx - 1];
                    if !previous.address.is_empty() && !phase.address.is_empty() {
                        let metrics = self
                            .enricher
                            .travel_metrics(&previous.address, &phase.address)
                            .await;
                        minutes = Some(metrics.minutes as f64);
                        distance = Some(metrics.distance_km);
                    }
                }

                if let Some(d) = distance {
                    if d > MAX_LEG_DISTANCE_KM {
                        return Err(Rejection::Distance);
                    }
                }
                if let Some(m) = minutes {
                    if m > MAX_LEG_TRAVEL_MINUTES {
                        return Err(Rejection::Distance);
                    }
                }

                (minutes.map(|m| m.round() as u32), distance)
            };

            let map_link = match &phase.google_maps_link {
                Some(link) if !link.is_empty() => link.clone(),
                _ => LocationEnricher::map_link(&phase.address),
            };

            phases.push(EventPhase {
                activity: phase.name.clone(),
                description: phase.description.clone(),
                address: phase.address.clone(),
                map_link,
                cost: phase.cost.round() as i64,
                is_indoor: phase.is_indoor,
                is_outdoor: phase.is_outdoor,
                is_vegetarian_friendly: phase.is_vegetarian_friendly,
                is_alcohol_friendly: phase.is_alcohol_friendly,
                travel_time_minutes,
                distance_km,
            });
        }

        Ok(phases)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Shape,
    Budget,
    Distance,
}
