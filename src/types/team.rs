use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall energy preference of a team member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vibe {
    Chill,
    Energetic,
    Mixed,
}

impl fmt::Display for Vibe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Vibe::Chill => "chill",
            Vibe::Energetic => "energetic",
            Vibe::Mixed => "mixed",
        };
        f.write_str(label)
    }
}

/// A member of the team, as supplied by the roster store.
///
/// Immutable once passed into plan generation for a single request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    /// Free-text home location, e.g. "District 1, Ho Chi Minh City"
    pub location: String,
    /// Ordered preference tags, e.g. ["hotpot", "karaoke"]
    #[serde(default)]
    pub preferences: Vec<String>,
    pub vibe: Vibe,
}

impl TeamMember {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        location: impl Into<String>,
        preferences: Vec<String>,
        vibe: Vibe,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location: location.into(),
            preferences,
            vibe,
        }
    }
}
