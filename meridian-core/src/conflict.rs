//! Conflict records produced during one resolution pass.

use crate::{new_entity_id, EntityId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Type of conflict between candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictType {
    /// Two candidates compete for the same target entity
    ResourceCompetition,
    /// Two candidates recommend semantically opposite actions
    ContradictoryActions,
    /// Overlapping actions that can run if ordered
    TimingConflict,
}

/// Policy applied to resolve a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionPolicy {
    /// Keep the highest-scoring member unchanged, penalize the rest
    PrioritizeHighestImpact,
    /// Annotate members with ordering metadata instead of penalizing
    SequenceActions,
    /// Flag all members for mandatory human review
    EscalateToSeller,
}

/// Record of one detected conflict and how it was resolved.
///
/// Retained on the plan for audit and consumed later by the learning
/// coordinator. References only candidates present in the same cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// Unique identifier for this conflict
    pub conflict_id: EntityId,
    /// Classification of the conflict
    pub conflict_type: ConflictType,
    /// Candidates involved, in candidate-id order
    pub candidate_ids: Vec<EntityId>,
    /// Policy the resolver applied; None while still a draft
    pub resolution: Option<ResolutionPolicy>,
    /// Free-text justification for the resolution
    pub justification: String,
    /// When the conflict was detected
    pub detected_at: Timestamp,
}

impl ConflictRecord {
    /// Create an unresolved draft, as emitted by the analyzer.
    pub fn draft(conflict_type: ConflictType, mut candidate_ids: Vec<EntityId>) -> Self {
        candidate_ids.sort();
        Self {
            conflict_id: new_entity_id(),
            conflict_type,
            candidate_ids,
            resolution: None,
            justification: String::new(),
            detected_at: Utc::now(),
        }
    }

    /// Mark the draft resolved with the chosen policy.
    pub fn resolve(mut self, policy: ResolutionPolicy, justification: impl Into<String>) -> Self {
        self.resolution = Some(policy);
        self.justification = justification.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_sorts_candidate_ids() {
        let a = new_entity_id();
        let b = new_entity_id();
        let record = ConflictRecord::draft(ConflictType::ResourceCompetition, vec![b, a]);
        assert_eq!(record.candidate_ids, {
            let mut v = vec![a, b];
            v.sort();
            v
        });
        assert!(record.resolution.is_none());
    }

    #[test]
    fn test_resolve_sets_policy_and_justification() {
        let record = ConflictRecord::draft(ConflictType::TimingConflict, vec![new_entity_id()])
            .resolve(ResolutionPolicy::SequenceActions, "ordered by score");
        assert_eq!(record.resolution, Some(ResolutionPolicy::SequenceActions));
        assert_eq!(record.justification, "ordered by score");
    }
}
