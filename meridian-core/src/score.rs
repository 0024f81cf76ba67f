//! Derived per-candidate scores.
//!
//! Everything here is recomputed every cycle and kept only as audit trail
//! on the final plan - never persisted as ground truth.

use crate::{candidate::AgentKind, EntityId};
use serde::{Deserialize, Serialize};

/// Full scoring breakdown for one candidate in one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalActionScore {
    /// Candidate this score belongs to
    pub candidate_id: EntityId,
    /// Agent that produced the candidate
    pub agent: AgentKind,

    /// Bounded combination of impact, confidence, and urgency weight
    pub base_score: f64,
    /// Per-urgency-class multiplier
    pub urgency_multiplier: f64,
    /// Impact magnitude normalized to [0, 1]
    pub impact_score: f64,
    /// Confidence factor
    pub confidence_score: f64,
    /// Risk discount in (0, 1], modulated by merchant risk tolerance
    pub risk_adjustment: f64,
    /// Maximum synergy bonus found across all pairings
    pub synergy_bonus: f64,
    /// Maximum conflict penalty found across all pairings
    pub conflict_penalty: f64,
    /// Per-merchant personalization multiplier
    pub personalization_multiplier: f64,

    /// Final score after all stages
    pub final_score: f64,
    /// 1-based rank in the cycle's strict total order
    pub rank: usize,

    /// Set by the resolver when this action must run after another
    pub sequence_after: Option<EntityId>,
    /// Set by the resolver when contradictory actions require human review
    pub needs_review: bool,
}

impl GlobalActionScore {
    /// Initial score record before any pipeline stage has run.
    pub fn new(candidate_id: EntityId, agent: AgentKind) -> Self {
        Self {
            candidate_id,
            agent,
            base_score: 0.0,
            urgency_multiplier: 1.0,
            impact_score: 0.0,
            confidence_score: 0.0,
            risk_adjustment: 1.0,
            synergy_bonus: 0.0,
            conflict_penalty: 0.0,
            personalization_multiplier: 1.0,
            final_score: 0.0,
            rank: 0,
            sequence_after: None,
            needs_review: false,
        }
    }
}
