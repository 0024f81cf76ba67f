//! The final ranked action plan handed to the consumer.

use crate::{
    candidate::{AgentKind, RecommendationCandidate},
    conflict::ConflictRecord,
    new_entity_id,
    outcome::AgentOutcome,
    score::GlobalActionScore,
    EntityId, Timestamp,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// One selected candidate with its full scoring breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub candidate: RecommendationCandidate,
    pub score: GlobalActionScore,
}

/// Read-only output of one orchestration cycle.
///
/// Created fresh each cycle; has no identity beyond the cycle it belongs
/// to. Always well-formed - a cycle with nothing to recommend produces an
/// empty plan with `no_candidates` set, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    /// Identifier of this plan
    pub plan_id: EntityId,
    /// Merchant the plan is for
    pub merchant_id: EntityId,
    /// Cycle that produced the plan
    pub cycle_id: EntityId,
    /// Selected entries in rank order
    pub entries: Vec<PlanEntry>,
    /// Sum of signed predicted impact across entries
    pub aggregate_predicted_impact: f64,
    /// Rough time-to-execute estimate derived from entry count
    pub estimated_execution: Duration,
    /// Candidate count per agent, for observability
    pub agent_distribution: HashMap<AgentKind, usize>,
    /// Conflicts detected and resolved this cycle
    pub conflicts: Vec<ConflictRecord>,
    /// Per-agent invocation manifest from the runner
    pub agent_outcomes: Vec<AgentOutcome>,
    /// True when no candidate survived the cycle
    pub no_candidates: bool,
    /// When the plan was generated
    pub generated_at: Timestamp,
}

impl ActionPlan {
    /// Empty plan for a cycle in which no candidates survived.
    pub fn empty(merchant_id: EntityId, cycle_id: EntityId, outcomes: Vec<AgentOutcome>) -> Self {
        Self {
            plan_id: new_entity_id(),
            merchant_id,
            cycle_id,
            entries: Vec::new(),
            aggregate_predicted_impact: 0.0,
            estimated_execution: Duration::ZERO,
            agent_distribution: HashMap::new(),
            conflicts: Vec::new(),
            agent_outcomes: outcomes,
            no_candidates: true,
            generated_at: Utc::now(),
        }
    }

    /// Entries flagged for mandatory human review.
    pub fn review_required(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter().filter(|e| e.score.needs_review)
    }
}
