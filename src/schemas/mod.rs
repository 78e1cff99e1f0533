//! JSON schema for the plan candidate wire shape.
//!
//! The schema is derived from [`PlanCandidate`] and used to pre-check each
//! extracted candidate object before deserialization, so shape problems
//! surface as bounded, readable diagnostics instead of serde noise.

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use std::sync::OnceLock;

use crate::error::{PlanError, Result};
use crate::types::plan::PlanCandidate;

const MAX_SCHEMA_ERRORS: usize = 3;

static PLAN_CANDIDATE_SCHEMA: OnceLock<Value> = OnceLock::new();

/// JSON schema for a single plan candidate object.
pub fn plan_candidate_schema() -> &'static Value {
    PLAN_CANDIDATE_SCHEMA.get_or_init(|| {
        let root = schemars::schema_for!(PlanCandidate);
        serde_json::to_value(root)
            .unwrap_or_else(|err| panic!("failed to serialize plan candidate schema: {}", err))
    })
}

/// Validate a candidate object against the plan candidate schema.
pub fn validate_candidate(candidate: &Value) -> Result<()> {
    if !candidate.is_object() {
        return Err(PlanError::Validation(
            "plan candidate must be a JSON object".to_string(),
        ));
    }

    let validator = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(plan_candidate_schema())
        .map_err(|err| {
            PlanError::Validation(format!(
                "Failed to prepare plan candidate schema for validation: {}",
                err
            ))
        })?;

    if let Err(errors) = validator.validate(candidate) {
        let mut details = Vec::new();
        let mut truncated = false;

        for (idx, error) in errors.enumerate() {
            if idx < MAX_SCHEMA_ERRORS {
                let mut path = error.instance_path.to_string();
                if path.is_empty() {
                    path = "<root>".to_string();
                }
                details.push(format!("{}: {}", path, error));
            } else {
                truncated = true;
                break;
            }
        }

        let mut detail_str = if details.is_empty() {
            "candidate failed schema validation".to_string()
        } else {
            details.join("; ")
        };

        if truncated {
            detail_str.push_str("; additional errors truncated");
        }

        return Err(PlanError::Validation(format!(
            "Plan candidate does not match the expected shape: {}",
            detail_str
        )));
    }

    Ok(())
}
