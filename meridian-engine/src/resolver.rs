//! Conflict resolution policies.
//!
//! One policy per detected conflict, chosen by conflict type:
//! contradictory actions escalate to the seller, timing conflicts are
//! sequenced, everything else keeps the highest-scoring member and
//! penalizes the rest. The resolver mutates only the scores of the
//! conflict it is resolving and is deterministic given the same conflict
//! set and scores.

use meridian_core::{
    ConflictRecord, ConflictType, EngineConfig, EntityId, GlobalActionScore, ResolutionPolicy,
};
use std::collections::HashMap;

/// Applies resolution policies to drafted conflicts.
pub struct ConflictResolver {
    loser_factor: f64,
}

impl ConflictResolver {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            loser_factor: config.conflict_loser_factor,
        }
    }

    /// Resolve every draft, mutating the involved scores in place.
    /// Returns the finalized records, retained for audit and learning.
    pub fn resolve(
        &self,
        drafts: Vec<ConflictRecord>,
        scores: &mut [GlobalActionScore],
    ) -> Vec<ConflictRecord> {
        let index: HashMap<EntityId, usize> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| (s.candidate_id, i))
            .collect();

        drafts
            .into_iter()
            .map(|draft| {
                // Drafts may reference candidates dropped since detection;
                // resolution only considers the ones still present.
                let members: Vec<usize> = draft
                    .candidate_ids
                    .iter()
                    .filter_map(|id| index.get(id).copied())
                    .collect();

                match draft.conflict_type {
                    ConflictType::ContradictoryActions => self.escalate(draft, &members, scores),
                    ConflictType::TimingConflict => self.sequence(draft, &members, scores),
                    ConflictType::ResourceCompetition => {
                        self.prioritize_highest_impact(draft, &members, scores)
                    }
                }
            })
            .collect()
    }

    /// Semantically opposite recommendations: neither is penalized
    /// computationally, both require human review.
    fn escalate(
        &self,
        draft: ConflictRecord,
        members: &[usize],
        scores: &mut [GlobalActionScore],
    ) -> ConflictRecord {
        for &idx in members {
            scores[idx].needs_review = true;
        }
        draft.resolve(
            ResolutionPolicy::EscalateToSeller,
            "contradictory actions require seller judgement",
        )
    }

    /// Overlapping actions that can both run: annotate ordering metadata
    /// instead of dropping either. Higher-scoring member runs first.
    fn sequence(
        &self,
        draft: ConflictRecord,
        members: &[usize],
        scores: &mut [GlobalActionScore],
    ) -> ConflictRecord {
        let mut ordered = members.to_vec();
        ordered.sort_by(|&a, &b| {
            scores[b]
                .final_score
                .total_cmp(&scores[a].final_score)
                .then(scores[a].candidate_id.cmp(&scores[b].candidate_id))
        });

        for pair in ordered.windows(2) {
            let predecessor = scores[pair[0]].candidate_id;
            scores[pair[1]].sequence_after = Some(predecessor);
        }

        draft.resolve(
            ResolutionPolicy::SequenceActions,
            "overlapping actions ordered by score",
        )
    }

    /// Default policy: the member with the highest currently-computed
    /// score is kept unchanged; every other member's score is strictly
    /// reduced by the loser factor.
    fn prioritize_highest_impact(
        &self,
        draft: ConflictRecord,
        members: &[usize],
        scores: &mut [GlobalActionScore],
    ) -> ConflictRecord {
        let winner = members.iter().copied().max_by(|&a, &b| {
            scores[a]
                .final_score
                .total_cmp(&scores[b].final_score)
                .then(scores[b].candidate_id.cmp(&scores[a].candidate_id))
        });

        let justification = match winner {
            Some(winner_idx) => {
                let winner_id = scores[winner_idx].candidate_id;
                for &idx in members {
                    if idx != winner_idx {
                        scores[idx].final_score *= self.loser_factor;
                    }
                }
                format!("kept highest-scoring candidate {winner_id}")
            }
            None => "no surviving members".to_string(),
        };

        draft.resolve(ResolutionPolicy::PrioritizeHighestImpact, justification)
    }
}

// =============================================================================
// TESTS
// =============================================================================
