pub mod history;
pub mod plan;
pub mod request;
pub mod result;
pub mod team;

pub use history::SavedEvent;
pub use plan::{budget_ceiling_vnd, EventPhase, EventPlan, PhaseCandidate, PlanCandidate, BASE_BUDGET_VND};
pub use request::{GenerationMode, GenerationRequest};
pub use result::{FallbackReason, GenerationResult};
pub use team::{TeamMember, Vibe};
