//! MERIDIAN Core - Entity Types
//!
//! Pure data structures with no behavior. All other crates depend on this.
//! This crate contains ONLY data types, the error taxonomy, and the engine
//! configuration - no orchestration logic.

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod candidate;
pub mod config;
pub mod conflict;
pub mod context;
pub mod error;
pub mod outcome;
pub mod plan;
pub mod profile;
pub mod score;

pub use candidate::{
    ActionPayload, AgentKind, RecommendationCandidate, RiskClass, Urgency,
};
pub use config::{EngineConfig, ScoringWeights, UrgencyMultipliers};
pub use conflict::{ConflictRecord, ConflictType, ResolutionPolicy};
pub use context::{BusinessContext, BusinessPriority};
pub use error::{
    AgentError, ConfigError, LearningError, MeridianError, MeridianResult, ScoringError,
};
pub use outcome::{AgentOutcome, AgentRunStatus, OutcomeSignal};
pub use plan::{ActionPlan, PlanEntry};
pub use profile::BusinessProfile;
pub use score::GlobalActionScore;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type EntityId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}

// =============================================================================
// TESTS
// =============================================================================
