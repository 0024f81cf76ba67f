//! Final plan assembly.
//!
//! Selects the top-N of the personalized ranking, always surfaces critical
//! candidates, and packages the selection with aggregate statistics. Pure
//! packaging - never contacts agents, never performs any action.

use chrono::Utc;
use meridian_core::{
    ActionPlan, AgentOutcome, BusinessContext, ConflictRecord, EngineConfig, EntityId,
    GlobalActionScore, PlanEntry, RecommendationCandidate, Urgency, new_entity_id,
};
use std::collections::HashMap;

/// Packages the ranked candidate set into the cycle's action plan.
pub struct PlanGenerator {
    top_n: usize,
    per_entry_execution_estimate: std::time::Duration,
}

impl PlanGenerator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            top_n: config.top_n,
            per_entry_execution_estimate: config.per_entry_execution_estimate,
        }
    }

    /// Build the plan. `scores` must already be in rank order.
    pub fn generate(
        &self,
        ctx: &BusinessContext,
        candidates: &[RecommendationCandidate],
        scores: Vec<GlobalActionScore>,
        conflicts: Vec<ConflictRecord>,
        agent_outcomes: Vec<AgentOutcome>,
    ) -> ActionPlan {
        if scores.is_empty() {
            return ActionPlan::empty(ctx.merchant_id, ctx.cycle_id, agent_outcomes);
        }

        let by_id: HashMap<EntityId, &RecommendationCandidate> =
            candidates.iter().map(|c| (c.candidate_id, c)).collect();

        // Top-N cut, plus every critical candidate regardless of position.
        let entries: Vec<PlanEntry> = scores
            .into_iter()
            .filter_map(|score| {
                let candidate = by_id.get(&score.candidate_id)?;
                let selected =
                    score.rank <= self.top_n || candidate.urgency == Urgency::Critical;
                selected.then(|| PlanEntry {
                    candidate: (*candidate).clone(),
                    score,
                })
            })
            .collect();

        let aggregate_predicted_impact = entries
            .iter()
            .map(|e| e.candidate.predicted_impact)
            .sum();

        let mut agent_distribution = HashMap::new();
        for entry in &entries {
            *agent_distribution
                .entry(entry.candidate.agent.clone())
                .or_insert(0) += 1;
        }

        ActionPlan {
            plan_id: new_entity_id(),
            merchant_id: ctx.merchant_id,
            cycle_id: ctx.cycle_id,
            estimated_execution: self.per_entry_execution_estimate * entries.len() as u32,
            aggregate_predicted_impact,
            agent_distribution,
            conflicts,
            agent_outcomes,
            no_candidates: entries.is_empty(),
            entries,
            generated_at: Utc::now(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
