//! Tolerant extraction of plan candidates from free-form model output.
//!
//! Models wrap JSON in fences, prose, or nothing at all; this module finds
//! the JSON, classifies the top-level shape, and deserializes candidates.
//! Malformed input never raises: the caller sees an empty list and takes
//! the fallback path.

use serde_json::Value;
use tracing::debug;

use crate::schemas;
use crate::types::plan::PlanCandidate;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Top-level shape of the payload found in a model response.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedShape {
    /// Object carrying a `plans` array
    ObjectWithPlans(Vec<Value>),
    /// Bare array of plan objects
    BareArray(Vec<Value>),
    /// Anything else: a total parse failure for the response
    Unrecognized,
}

impl ParsedShape {
    fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut map) => match map.remove("plans") {
                Some(Value::Array(plans)) => ParsedShape::ObjectWithPlans(plans),
                _ => ParsedShape::Unrecognized,
            },
            Value::Array(items) => ParsedShape::BareArray(items),
            _ => ParsedShape::Unrecognized,
        }
    }

    fn into_candidates(self) -> Option<Vec<Value>> {
        match self {
            ParsedShape::ObjectWithPlans(plans) => Some(plans),
            ParsedShape::BareArray(items) => Some(items),
            ParsedShape::Unrecognized => None,
        }
    }
}

/// Classify the JSON payload embedded in a raw model response.
///
/// The first successful strict parse decides the shape; an unrecognized
/// shape is final, never patched by trying a narrower span.
pub fn classify_response(raw: &str) -> ParsedShape {
    match extract_json_value(raw) {
        Some(value) => ParsedShape::from_value(value),
        None => ParsedShape::Unrecognized,
    }
}

/// Extract plan candidates from a raw model response.
///
/// Never errors: decode failures and unrecognized shapes yield an empty
/// list. Individual candidates that fail the schema check or typed
/// deserialization are skipped; they could never survive validation anyway.
pub fn parse_plan_response(raw: &str) -> Vec<PlanCandidate> {
    let shape = classify_response(raw);
    let candidates = match shape.into_candidates() {
        Some(candidates) => candidates,
        None => {
            debug!(
                target: "teambonding::pipeline",
                response = raw,
                "no recognizable plan payload in model response"
            );
            return Vec::new();
        }
    };

    let mut parsed = Vec::new();
    for candidate in candidates {
        if let Err(err) = schemas::validate_candidate(&candidate) {
            debug!(
                target: "teambonding::pipeline",
                error = %err,
                "skipping candidate that fails the shape check"
            );
            continue;
        }

        let raw_json = candidate.to_string();
        let mut deserializer = serde_json::Deserializer::from_str(&raw_json);
        match serde_path_to_error::deserialize::<_, PlanCandidate>(&mut deserializer) {
            Ok(plan) => parsed.push(plan),
            Err(err) => {
                debug!(
                    target: "teambonding::pipeline",
                    path = %err.path(),
                    error = %err,
                    "skipping candidate that fails deserialization"
                );
            }
        }
    }
    parsed
}

/// Locate and strictly parse the JSON payload.
///
/// A json-fenced block wins outright. Otherwise the widest `{..}` and
/// `[..]` spans are tried, starting with whichever bracket opens first in
/// the text, so a bare array is not mistaken for its first element.
fn extract_json_value(raw: &str) -> Option<Value> {
    if let Some(fenced) = extract_fenced_block(raw) {
        if let Ok(value) = serde_json::from_str(fenced.trim()) {
            return Some(value);
        }
    }

    let object_span = widest_span(raw, '{', '}');
    let array_span = widest_span(raw, '[', ']');
    let array_first = match (raw.find('['), raw.find('{')) {
        (Some(bracket), Some(brace)) => bracket < brace,
        (Some(_), None) => true,
        _ => false,
    };
    let attempts = if array_first {
        [array_span, object_span]
    } else {
        [object_span, array_span]
    };

    for span in attempts.into_iter().flatten() {
        if let Ok(value) = serde_json::from_str(span) {
            return Some(value);
        }
    }

    None
}

fn extract_fenced_block(raw: &str) -> Option<&str> {
    let start = raw.find(JSON_FENCE)? + JSON_FENCE.len();
    let rest = &raw[start..];
    let end = rest.find(FENCE)?;
    Some(&rest[..end])
}

fn widest_span(raw: &str, open: char, close: char) -> Option<&str> {
    let start = raw.find(open)?;
    let end = raw.rfind(close)?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}
