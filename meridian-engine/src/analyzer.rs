//! Pairwise synergy and conflict analysis.
//!
//! Groups candidates by target entity (exact id match - conflicts are only
//! meaningful within one entity's scope), detects reinforcing and
//! interfering pairs, and annotates each candidate's score with the
//! maximum synergy bonus and maximum conflict penalty found across all its
//! pairings. Resolution is left entirely to the resolver.

use meridian_core::{
    ActionPayload, AgentKind, ConflictRecord, ConflictType, EngineConfig, GlobalActionScore,
    RecommendationCandidate,
};
use std::collections::HashMap;
use tracing::debug;

/// Agent pairs known to be mutually reinforcing on the same entity, e.g. a
/// stock-out prevention and a demand-scaling action.
const SYNERGY_PAIRS: &[(AgentKind, AgentKind)] = &[
    (AgentKind::Inventory, AgentKind::MarketTrend),
    (AgentKind::Pricing, AgentKind::Promotion),
];

fn is_synergy_pair(a: &AgentKind, b: &AgentKind) -> bool {
    SYNERGY_PAIRS
        .iter()
        .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
}

/// Detects synergies and drafts conflict records; never resolves.
pub struct SynergyConflictAnalyzer {
    synergy_bonus: f64,
    conflict_penalty: f64,
}

impl SynergyConflictAnalyzer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            synergy_bonus: config.synergy_bonus,
            conflict_penalty: config.conflict_penalty,
        }
    }

    /// Annotate `scores` (index-aligned with `candidates`) and return
    /// unresolved conflict drafts for the resolver.
    ///
    /// Candidates without a target entity cannot participate in grouping;
    /// they keep their individual score untouched.
    pub fn annotate(
        &self,
        candidates: &[RecommendationCandidate],
        scores: &mut [GlobalActionScore],
    ) -> Vec<ConflictRecord> {
        debug_assert_eq!(candidates.len(), scores.len());

        // Entity-scoped groups of candidate indices.
        let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
        for (idx, candidate) in candidates.iter().enumerate() {
            match candidate.target_entity.as_deref() {
                Some(entity) => groups.entry(entity).or_default().push(idx),
                None => {
                    debug!(
                        candidate = %candidate.candidate_id,
                        "no target entity; excluded from conflict grouping"
                    );
                }
            }
        }

        // Deterministic iteration: by entity key, indices already follow
        // candidate-id order.
        let mut entities: Vec<&str> = groups.keys().copied().collect();
        entities.sort_unstable();

        let mut drafts = Vec::new();

        for entity in entities {
            let members = &groups[entity];
            for (pos, &i) in members.iter().enumerate() {
                for &j in &members[pos + 1..] {
                    let (a, b) = (&candidates[i], &candidates[j]);

                    if let Some(conflict_type) = classify_pair(a, b) {
                        scores[i].conflict_penalty =
                            scores[i].conflict_penalty.max(self.conflict_penalty);
                        scores[j].conflict_penalty =
                            scores[j].conflict_penalty.max(self.conflict_penalty);
                        drafts.push(ConflictRecord::draft(
                            conflict_type,
                            vec![a.candidate_id, b.candidate_id],
                        ));
                    } else if is_synergy_pair(&a.agent, &b.agent) {
                        scores[i].synergy_bonus = scores[i].synergy_bonus.max(self.synergy_bonus);
                        scores[j].synergy_bonus = scores[j].synergy_bonus.max(self.synergy_bonus);
                    }
                }
            }
        }

        // Fold the annotations into the running score, floored at zero.
        for score in scores.iter_mut() {
            score.final_score =
                (score.final_score + score.synergy_bonus - score.conflict_penalty).max(0.0);
        }

        drafts
    }
}

/// Classify an interfering same-entity pair, or None when the pair does
/// not interfere.
///
/// Contradiction dominates: semantically opposite payloads escalate even
/// when both come from one agent. Same-agent overlap is a timing conflict
/// (both can run if ordered); remaining cross-agent pairs outside the
/// synergy table compete for the entity.
fn classify_pair(
    a: &RecommendationCandidate,
    b: &RecommendationCandidate,
) -> Option<ConflictType> {
    if a.payload.contradicts(&b.payload) {
        return Some(ConflictType::ContradictoryActions);
    }
    if a.agent == b.agent {
        return Some(ConflictType::TimingConflict);
    }
    if is_synergy_pair(&a.agent, &b.agent) {
        return None;
    }
    if same_resource_dimension(&a.payload, &b.payload) {
        return Some(ConflictType::ResourceCompetition);
    }
    None
}

/// Two payloads act on the same scarce dimension of one entity (price,
/// stock, promotion budget) and cannot both be taken as proposed.
fn same_resource_dimension(a: &ActionPayload, b: &ActionPayload) -> bool {
    use ActionPayload::*;
    matches!(
        (a, b),
        (Restock { .. }, Restock { .. })
            | (PriceChange { .. }, PriceChange { .. })
            | (PriceChange { .. }, Promotion { .. })
            | (Promotion { .. }, PriceChange { .. })
            | (Promotion { .. }, Promotion { .. })
            | (DemandScaling { .. }, DemandScaling { .. })
    )
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::{RiskClass, Urgency};

    fn candidate(
        agent: AgentKind,
        entity: Option<&str>,
        payload: ActionPayload,
    ) -> RecommendationCandidate {
        let c = RecommendationCandidate::new(
            agent,
            500.0,
            0.8,
            Urgency::Normal,
            RiskClass::Low,
            payload,
        );
        match entity {
            Some(e) => c.with_target_entity(e),
            None => c,
        }
    }

    fn scores_for(candidates: &[RecommendationCandidate]) -> Vec<GlobalActionScore> {
        candidates
            .iter()
            .map(|c| {
                let mut s = GlobalActionScore::new(c.candidate_id, c.agent.clone());
                s.final_score = 5.0;
                s
            })
            .collect()
    }

    fn analyzer() -> SynergyConflictAnalyzer {
        SynergyConflictAnalyzer::new(&EngineConfig::default_engine())
    }

    #[test]
    fn test_synergy_pair_boosts_both_members() {
        let candidates = vec![
            candidate(
                AgentKind::Inventory,
                Some("sku-1"),
                ActionPayload::Restock { units: 40 },
            ),
            candidate(
                AgentKind::MarketTrend,
                Some("sku-1"),
                ActionPayload::DemandScaling { factor: 1.3 },
            ),
        ];
        let mut scores = scores_for(&candidates);
        let drafts = analyzer().annotate(&candidates, &mut scores);

        assert!(drafts.is_empty());
        assert!(scores.iter().all(|s| s.synergy_bonus > 0.0));
        assert!(scores.iter().all(|s| s.final_score > 5.0));
    }

    #[test]
    fn test_same_entity_same_dimension_competes() {
        let candidates = vec![
            candidate(
                AgentKind::Pricing,
                Some("sku-1"),
                ActionPayload::PriceChange {
                    current: 10.0,
                    proposed: 11.0,
                },
            ),
            candidate(
                AgentKind::MarketTrend,
                Some("sku-1"),
                ActionPayload::PriceChange {
                    current: 10.0,
                    proposed: 12.0,
                },
            ),
        ];
        let mut scores = scores_for(&candidates);
        let drafts = analyzer().annotate(&candidates, &mut scores);

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].conflict_type, ConflictType::ResourceCompetition);
        assert!(drafts[0].resolution.is_none());
        assert!(scores.iter().all(|s| s.conflict_penalty > 0.0));
        assert!(scores.iter().all(|s| s.final_score < 5.0));
    }

    #[test]
    fn test_opposite_price_moves_are_contradictory() {
        let candidates = vec![
            candidate(
                AgentKind::Pricing,
                Some("sku-1"),
                ActionPayload::PriceChange {
                    current: 10.0,
                    proposed: 12.0,
                },
            ),
            candidate(
                AgentKind::MarketTrend,
                Some("sku-1"),
                ActionPayload::PriceChange {
                    current: 10.0,
                    proposed: 8.0,
                },
            ),
        ];
        let mut scores = scores_for(&candidates);
        let drafts = analyzer().annotate(&candidates, &mut scores);

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].conflict_type, ConflictType::ContradictoryActions);
    }

    #[test]
    fn test_same_agent_overlap_is_timing_conflict() {
        let candidates = vec![
            candidate(
                AgentKind::Inventory,
                Some("sku-1"),
                ActionPayload::Restock { units: 10 },
            ),
            candidate(
                AgentKind::Inventory,
                Some("sku-1"),
                ActionPayload::Restock { units: 30 },
            ),
        ];
        let mut scores = scores_for(&candidates);
        let drafts = analyzer().annotate(&candidates, &mut scores);

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].conflict_type, ConflictType::TimingConflict);
    }

    #[test]
    fn test_different_entities_never_conflict() {
        let candidates = vec![
            candidate(
                AgentKind::Pricing,
                Some("sku-1"),
                ActionPayload::PriceChange {
                    current: 10.0,
                    proposed: 12.0,
                },
            ),
            candidate(
                AgentKind::MarketTrend,
                Some("sku-2"),
                ActionPayload::PriceChange {
                    current: 10.0,
                    proposed: 8.0,
                },
            ),
        ];
        let mut scores = scores_for(&candidates);
        let drafts = analyzer().annotate(&candidates, &mut scores);

        assert!(drafts.is_empty());
        assert!(scores.iter().all(|s| s.conflict_penalty == 0.0));
    }

    #[test]
    fn test_no_target_entity_is_excluded_but_keeps_score() {
        let candidates = vec![
            candidate(AgentKind::Pricing, None, ActionPayload::DemandScaling { factor: 1.2 }),
            candidate(
                AgentKind::MarketTrend,
                None,
                ActionPayload::DemandScaling { factor: 0.7 },
            ),
        ];
        let mut scores = scores_for(&candidates);
        let drafts = analyzer().annotate(&candidates, &mut scores);

        assert!(drafts.is_empty());
        assert!(scores.iter().all(|s| s.final_score == 5.0));
    }

    #[test]
    fn test_penalty_annotation_is_max_across_pairings() {
        // One candidate conflicting with two others holds a single maximum
        // penalty, not a sum.
        let candidates = vec![
            candidate(
                AgentKind::Pricing,
                Some("sku-1"),
                ActionPayload::PriceChange {
                    current: 10.0,
                    proposed: 11.0,
                },
            ),
            candidate(
                AgentKind::MarketTrend,
                Some("sku-1"),
                ActionPayload::PriceChange {
                    current: 10.0,
                    proposed: 12.0,
                },
            ),
            candidate(
                AgentKind::Custom("assortment".to_string()),
                Some("sku-1"),
                ActionPayload::PriceChange {
                    current: 10.0,
                    proposed: 13.0,
                },
            ),
        ];
        let mut scores = scores_for(&candidates);
        let a = analyzer();
        let drafts = a.annotate(&candidates, &mut scores);

        assert_eq!(drafts.len(), 3);
        let config = EngineConfig::default_engine();
        assert!(scores
            .iter()
            .all(|s| s.conflict_penalty == config.conflict_penalty));
    }
}
