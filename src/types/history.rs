use serde::{Deserialize, Serialize};

/// A past event as stored by the external history store.
///
/// Read-only input for `similar`/`reuse` prompts; writing promoted plans
/// back to the store is out of scope here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedEvent {
    /// ISO date string, e.g. "2024-01-15"
    pub date: String,
    pub theme: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub participants: Vec<String>,
    /// Activity labels in phase order
    pub activities: Vec<String>,
    /// VND per person
    pub total_cost: i64,
    /// 1..=5
    pub rating: u8,
}

impl SavedEvent {
    /// Phase count observed for this event.
    pub fn phase_count(&self) -> usize {
        self.activities.len()
    }
}
