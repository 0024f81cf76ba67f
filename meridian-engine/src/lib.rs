//! MERIDIAN Engine - Orchestration and Prioritization
//!
//! Sits between the independent analysis agents and the consumer: invokes
//! agents concurrently, tolerates their individual failures, computes a
//! uniform cross-agent score per candidate, detects and resolves
//! conflicts, applies per-merchant personalization, and emits one
//! deterministic, explainable, ranked action plan per cycle.
//!
//! The scoring stages are purely sequential over the collected candidate
//! set; determinism matters more than parallel speed-up at cycle sizes of
//! tens of candidates.

use meridian_agents::{AgentRegistry, AgentRunner};
use meridian_core::{ActionPlan, BusinessContext, BusinessProfile, EngineConfig, MeridianResult};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

pub mod analyzer;
pub mod learning;
pub mod personalization;
pub mod planner;
pub mod resolver;
pub mod scorer;

pub use analyzer::SynergyConflictAnalyzer;
pub use learning::{LearningCoordinator, ProfileStore};
pub use personalization::PersonalizationLayer;
pub use planner::PlanGenerator;
pub use resolver::ConflictResolver;
pub use scorer::ActionScorer;

// ============================================================================
// ORCHESTRATOR
// ============================================================================

/// One-cycle pipeline over explicit collaborators.
///
/// Constructed with references to everything it needs - the agent
/// registry and the profile store are injected, never reached for as
/// ambient singletons - so test runs cannot leak state between cycles.
pub struct Orchestrator {
    runner: AgentRunner,
    scorer: ActionScorer,
    analyzer: SynergyConflictAnalyzer,
    resolver: ConflictResolver,
    personalization: PersonalizationLayer,
    planner: PlanGenerator,
    profiles: Arc<dyn ProfileStore>,
}

impl Orchestrator {
    /// Build an orchestrator. Validates the configuration up front.
    pub fn new(
        registry: Arc<AgentRegistry>,
        profiles: Arc<dyn ProfileStore>,
        config: EngineConfig,
    ) -> MeridianResult<Self> {
        config.validate()?;
        Ok(Self {
            runner: AgentRunner::new(registry, &config),
            scorer: ActionScorer::new(&config),
            analyzer: SynergyConflictAnalyzer::new(&config),
            resolver: ConflictResolver::new(&config),
            personalization: PersonalizationLayer::new(&config),
            planner: PlanGenerator::new(&config),
            profiles,
        })
    }

    /// Run one orchestration cycle for one merchant.
    ///
    /// The caller always receives a well-formed plan: agent failures are
    /// contained in the plan's manifest, a cycle with zero surviving
    /// candidates yields an empty plan with its `no_candidates` flag set.
    pub async fn run_cycle(&self, ctx: &BusinessContext) -> MeridianResult<ActionPlan> {
        let (_tx, rx) = watch::channel(false);
        self.run_cycle_cancellable(ctx, rx).await
    }

    /// Run one cycle with external cancellation. Cancelled agent tasks
    /// are discarded; the cycle still returns a well-formed (possibly
    /// empty) plan.
    pub async fn run_cycle_cancellable(
        &self,
        ctx: &BusinessContext,
        cancel: watch::Receiver<bool>,
    ) -> MeridianResult<ActionPlan> {
        // Profile snapshot at cycle start; unavailable personalization
        // data degrades to neutral multipliers, never a failed cycle.
        let profile: Option<BusinessProfile> = match self.profiles.load(ctx.merchant_id).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(merchant = %ctx.merchant_id, error = %err, "profile load failed; scoring with neutral personalization");
                None
            }
        };

        let report = self.runner.run_cancellable(ctx, cancel).await;

        if report.candidates.is_empty() {
            info!(
                merchant = %ctx.merchant_id,
                cycle = %ctx.cycle_id,
                failed_agents = report.failed_agents().count(),
                "cycle produced no candidates"
            );
            return Ok(ActionPlan::empty(
                ctx.merchant_id,
                ctx.cycle_id,
                report.outcomes,
            ));
        }

        let mut scores: Vec<_> = report
            .candidates
            .iter()
            .map(|c| self.scorer.score(c, ctx))
            .collect();

        let drafts = self.analyzer.annotate(&report.candidates, &mut scores);
        let conflicts = self.resolver.resolve(drafts, &mut scores);
        self.personalization
            .apply(ctx, profile.as_ref(), &report.candidates, &mut scores);

        let plan = self.planner.generate(
            ctx,
            &report.candidates,
            scores,
            conflicts,
            report.outcomes,
        );

        info!(
            merchant = %ctx.merchant_id,
            cycle = %ctx.cycle_id,
            entries = plan.entries.len(),
            conflicts = plan.conflicts.len(),
            aggregate_impact = plan.aggregate_predicted_impact,
            "cycle complete"
        );
        Ok(plan)
    }
}
