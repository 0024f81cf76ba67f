//! End-to-end cycle tests: registry fan-out through plan generation.

use meridian_agents::AgentRegistry;
use meridian_engine::Orchestrator;
use meridian_test_utils::{
    candidate, context, targeted_candidate, ActionPayload, AgentKind, AgentRunStatus,
    BusinessContext, BusinessPriority, BusinessProfile, EngineConfig, FailingAgent,
    InMemoryProfileStore, ResolutionPolicy, ScriptedAgent, SlowAgent, Urgency, new_entity_id,
};
use std::sync::Arc;
use std::time::Duration;

fn orchestrator(registry: AgentRegistry, store: Arc<InMemoryProfileStore>) -> Orchestrator {
    Orchestrator::new(Arc::new(registry), store, EngineConfig::default_engine()).unwrap()
}

#[tokio::test]
async fn test_identical_inputs_yield_identical_plans() {
    let mut registry = AgentRegistry::new();
    registry
        .register(Arc::new(ScriptedAgent::new(
            AgentKind::Inventory,
            vec![
                targeted_candidate(
                    AgentKind::Inventory,
                    "sku-1",
                    400.0,
                    Urgency::High,
                    ActionPayload::Restock { units: 40 },
                ),
                candidate(AgentKind::Inventory, 150.0),
            ],
        )))
        .unwrap();
    registry
        .register(Arc::new(ScriptedAgent::new(
            AgentKind::Pricing,
            vec![targeted_candidate(
                AgentKind::Pricing,
                "sku-1",
                900.0,
                Urgency::Normal,
                ActionPayload::PriceChange {
                    current: 10.0,
                    proposed: 12.0,
                },
            )],
        )))
        .unwrap();

    let store = Arc::new(InMemoryProfileStore::new());
    let orchestrator = orchestrator(registry, store);
    let ctx = context();

    let first = orchestrator.run_cycle(&ctx).await.unwrap();
    let second = orchestrator.run_cycle(&ctx).await.unwrap();

    // Same candidate set and same profile snapshot: the ranking, scores,
    // and selection are identical run to run.
    assert_eq!(first.entries, second.entries);
    assert_eq!(
        first.aggregate_predicted_impact,
        second.aggregate_predicted_impact
    );
    assert_eq!(first.conflicts.len(), second.conflicts.len());
    for (a, b) in first.conflicts.iter().zip(&second.conflicts) {
        assert_eq!(a.conflict_type, b.conflict_type);
        assert_eq!(a.candidate_ids, b.candidate_ids);
        assert_eq!(a.resolution, b.resolution);
    }
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_agent_excluded_from_plan() {
    let mut registry = AgentRegistry::new();
    registry
        .register(Arc::new(ScriptedAgent::new(
            AgentKind::Inventory,
            vec![candidate(AgentKind::Inventory, 300.0)],
        )))
        .unwrap();
    registry
        .register(Arc::new(ScriptedAgent::new(
            AgentKind::Pricing,
            vec![candidate(AgentKind::Pricing, 200.0)],
        )))
        .unwrap();
    registry
        .register(Arc::new(SlowAgent::new(
            AgentKind::MarketTrend,
            Duration::from_secs(120),
            vec![candidate(AgentKind::MarketTrend, 999.0)],
        )))
        .unwrap();

    let store = Arc::new(InMemoryProfileStore::new());
    let plan = orchestrator(registry, store)
        .run_cycle(&context())
        .await
        .unwrap();

    assert_eq!(plan.entries.len(), 2);
    assert!(plan
        .entries
        .iter()
        .all(|e| e.candidate.agent != AgentKind::MarketTrend));

    let failed: Vec<_> = plan
        .agent_outcomes
        .iter()
        .filter(|o| !o.status.is_success())
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].agent, AgentKind::MarketTrend);
    assert!(matches!(failed[0].status, AgentRunStatus::TimedOut));
}

#[tokio::test]
async fn test_all_agents_empty_yields_no_candidates_plan() {
    let mut registry = AgentRegistry::new();
    registry
        .register(Arc::new(ScriptedAgent::new(AgentKind::Inventory, vec![])))
        .unwrap();
    registry
        .register(Arc::new(FailingAgent::new(
            AgentKind::Pricing,
            "feed unavailable",
        )))
        .unwrap();

    let store = Arc::new(InMemoryProfileStore::new());
    let ctx = context();
    let plan = orchestrator(registry, store).run_cycle(&ctx).await.unwrap();

    assert!(plan.no_candidates);
    assert!(plan.entries.is_empty());
    assert_eq!(plan.merchant_id, ctx.merchant_id);
    assert_eq!(plan.cycle_id, ctx.cycle_id);
    assert_eq!(plan.agent_outcomes.len(), 2);
}

#[tokio::test]
async fn test_critical_candidate_surfaced_beyond_top_n() {
    // Twelve strong normal candidates push a weak critical one past the
    // top-10 cut; it must still appear in the plan.
    let mut normals: Vec<_> = (0..12)
        .map(|i| candidate(AgentKind::Inventory, 2000.0 + i as f64 * 100.0))
        .collect();
    let mut weak_critical = candidate(AgentKind::Pricing, 5.0);
    weak_critical.urgency = Urgency::Critical;
    weak_critical.confidence = 0.0;
    let critical_id = weak_critical.candidate_id;
    normals.push(weak_critical.clone());

    let mut registry = AgentRegistry::new();
    registry
        .register(Arc::new(ScriptedAgent::new(
            AgentKind::Inventory,
            normals[..12].to_vec(),
        )))
        .unwrap();
    registry
        .register(Arc::new(ScriptedAgent::new(
            AgentKind::Pricing,
            vec![weak_critical],
        )))
        .unwrap();

    let store = Arc::new(InMemoryProfileStore::new());
    let plan = orchestrator(registry, store)
        .run_cycle(&context())
        .await
        .unwrap();

    let critical_entry = plan
        .entries
        .iter()
        .find(|e| e.candidate.candidate_id == critical_id)
        .expect("critical candidate surfaced");
    assert!(critical_entry.score.rank > 10);
}

#[tokio::test]
async fn test_resource_competition_resolved_in_plan() {
    let strong = targeted_candidate(
        AgentKind::Pricing,
        "sku-9",
        5000.0,
        Urgency::High,
        ActionPayload::PriceChange {
            current: 20.0,
            proposed: 24.0,
        },
    );
    let weak = targeted_candidate(
        AgentKind::Custom("assortment".to_string()),
        "sku-9",
        400.0,
        Urgency::Normal,
        ActionPayload::PriceChange {
            current: 20.0,
            proposed: 22.0,
        },
    );
    let strong_id = strong.candidate_id;
    let weak_id = weak.candidate_id;

    let mut registry = AgentRegistry::new();
    registry
        .register(Arc::new(ScriptedAgent::new(AgentKind::Pricing, vec![strong])))
        .unwrap();
    registry
        .register(Arc::new(ScriptedAgent::new(
            AgentKind::Custom("assortment".to_string()),
            vec![weak],
        )))
        .unwrap();

    let store = Arc::new(InMemoryProfileStore::new());
    let plan = orchestrator(registry, store)
        .run_cycle(&context())
        .await
        .unwrap();

    let record = plan
        .conflicts
        .iter()
        .find(|c| c.resolution == Some(ResolutionPolicy::PrioritizeHighestImpact))
        .expect("competition resolved");
    assert!(record.candidate_ids.contains(&strong_id));
    assert!(record.candidate_ids.contains(&weak_id));

    let entry = |id| plan.entries.iter().find(|e| e.candidate.candidate_id == id);
    let strong_entry = entry(strong_id).expect("winner in plan");
    let weak_entry = entry(weak_id).expect("loser still in plan");
    assert!(strong_entry.score.rank < weak_entry.score.rank);
    assert!(weak_entry.score.final_score < strong_entry.score.final_score / 2.0 + f64::EPSILON);
}

#[tokio::test]
async fn test_contradictory_actions_flagged_for_review() {
    let up = targeted_candidate(
        AgentKind::Pricing,
        "sku-3",
        800.0,
        Urgency::Normal,
        ActionPayload::PriceChange {
            current: 15.0,
            proposed: 18.0,
        },
    );
    let down = targeted_candidate(
        AgentKind::MarketTrend,
        "sku-3",
        600.0,
        Urgency::Normal,
        ActionPayload::PriceChange {
            current: 15.0,
            proposed: 12.0,
        },
    );

    let mut registry = AgentRegistry::new();
    registry
        .register(Arc::new(ScriptedAgent::new(AgentKind::Pricing, vec![up])))
        .unwrap();
    registry
        .register(Arc::new(ScriptedAgent::new(
            AgentKind::MarketTrend,
            vec![down],
        )))
        .unwrap();

    let store = Arc::new(InMemoryProfileStore::new());
    let plan = orchestrator(registry, store)
        .run_cycle(&context())
        .await
        .unwrap();

    assert_eq!(plan.review_required().count(), 2);
    assert!(plan
        .conflicts
        .iter()
        .any(|c| c.resolution == Some(ResolutionPolicy::EscalateToSeller)));
}

#[tokio::test]
async fn test_seeded_profile_reorders_equal_candidates() {
    let inventory = candidate(AgentKind::Inventory, 500.0);
    let pricing = candidate(AgentKind::Pricing, 500.0);
    let inventory_id = inventory.candidate_id;

    let mut registry = AgentRegistry::new();
    registry
        .register(Arc::new(ScriptedAgent::new(
            AgentKind::Inventory,
            vec![inventory],
        )))
        .unwrap();
    registry
        .register(Arc::new(ScriptedAgent::new(AgentKind::Pricing, vec![pricing])))
        .unwrap();

    let merchant_id = new_entity_id();
    let mut profile = BusinessProfile::new(merchant_id);
    profile
        .agent_implementation_rates
        .insert(AgentKind::Inventory, 1.0);
    profile
        .agent_implementation_rates
        .insert(AgentKind::Pricing, 0.0);

    let store = Arc::new(InMemoryProfileStore::new());
    store.seed(profile);

    let ctx = BusinessContext::new(merchant_id, 0.5, BusinessPriority::Stability);
    let plan = orchestrator(registry, store).run_cycle(&ctx).await.unwrap();

    assert_eq!(plan.entries[0].candidate.candidate_id, inventory_id);
    assert!(plan.entries[0].score.personalization_multiplier > 1.0);
}

#[tokio::test]
async fn test_profile_store_only_read_on_scoring_path() {
    // A cycle for a merchant with no profile runs with neutral
    // personalization and does not create one as a side effect.
    let mut registry = AgentRegistry::new();
    registry
        .register(Arc::new(ScriptedAgent::new(
            AgentKind::Inventory,
            vec![candidate(AgentKind::Inventory, 100.0)],
        )))
        .unwrap();

    let store = Arc::new(InMemoryProfileStore::new());
    let ctx = context();
    let plan = orchestrator(registry, store.clone())
        .run_cycle(&ctx)
        .await
        .unwrap();

    assert_eq!(plan.entries[0].score.personalization_multiplier, 1.0);
    assert!(meridian_engine::ProfileStore::load(&*store, ctx.merchant_id)
        .await
        .unwrap()
        .is_none());
}
