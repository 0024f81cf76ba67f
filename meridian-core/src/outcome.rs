//! Agent invocation outcomes and externally-observed action outcomes.

use crate::{candidate::AgentKind, EntityId, Timestamp};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Terminal state of one agent invocation within a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AgentRunStatus {
    /// Agent returned within its timeout
    Succeeded { candidate_count: usize },
    /// Agent returned an error
    Failed { error: String },
    /// Agent did not return within its timeout
    TimedOut,
    /// Agent task panicked; treated like a failure
    Panicked,
    /// Cycle was cancelled before the agent returned; output discarded
    Cancelled,
}

impl AgentRunStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, AgentRunStatus::Succeeded { .. })
    }
}

/// Per-agent entry in the runner's manifest, used for observability and
/// later by the learning coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentOutcome {
    /// Agent this outcome describes
    pub agent: AgentKind,
    /// How the invocation ended
    pub status: AgentRunStatus,
    /// Wall-clock duration of the invocation
    pub duration: Duration,
}

/// Externally-observed outcome of one plan entry, consumed by the learning
/// coordinator. Produced by the outcome-feedback collaborator, never by
/// this engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSignal {
    /// Merchant the plan belonged to
    pub merchant_id: EntityId,
    /// Candidate the signal refers to
    pub candidate_id: EntityId,
    /// Agent that produced the candidate
    pub agent: AgentKind,
    /// Whether the merchant implemented the action
    pub implemented: bool,
    /// Predicted impact at plan time, for accuracy tracking
    pub predicted_impact: f64,
    /// Observed impact, if measured
    pub actual_impact: Option<f64>,
    /// When the outcome was recorded
    pub recorded_at: Timestamp,
}
