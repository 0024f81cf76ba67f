//! MERIDIAN Test Utilities
//!
//! Centralized test infrastructure for the MERIDIAN workspace:
//! - Scripted, failing, and slow mock agents
//! - In-memory profile store
//! - Candidate fixture builders

// Re-export core types for convenience
pub use meridian_core::{
    ActionPayload, ActionPlan, AgentKind, AgentOutcome, AgentRunStatus, BusinessContext,
    BusinessPriority, BusinessProfile, ConflictRecord, ConflictType, EngineConfig, EntityId,
    GlobalActionScore, MeridianError, MeridianResult, OutcomeSignal, PlanEntry,
    RecommendationCandidate, ResolutionPolicy, RiskClass, Urgency, new_entity_id,
};

use async_trait::async_trait;
use meridian_agents::AnalysisAgent;
use meridian_engine::ProfileStore;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// MOCK AGENTS
// ============================================================================

/// Agent that returns a fixed candidate set.
pub struct ScriptedAgent {
    kind: AgentKind,
    name: String,
    candidates: Vec<RecommendationCandidate>,
}

impl ScriptedAgent {
    pub fn new(kind: AgentKind, candidates: Vec<RecommendationCandidate>) -> Self {
        let name = kind.label().to_string();
        Self {
            kind,
            name,
            candidates,
        }
    }
}

#[async_trait]
impl AnalysisAgent for ScriptedAgent {
    fn kind(&self) -> AgentKind {
        self.kind.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn analyze(
        &self,
        _ctx: &BusinessContext,
    ) -> MeridianResult<Vec<RecommendationCandidate>> {
        Ok(self.candidates.clone())
    }
}

/// Agent that always fails with the given reason.
pub struct FailingAgent {
    kind: AgentKind,
    name: String,
    reason: String,
}

impl FailingAgent {
    pub fn new(kind: AgentKind, reason: impl Into<String>) -> Self {
        let name = kind.label().to_string();
        Self {
            kind,
            name,
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl AnalysisAgent for FailingAgent {
    fn kind(&self) -> AgentKind {
        self.kind.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn analyze(
        &self,
        _ctx: &BusinessContext,
    ) -> MeridianResult<Vec<RecommendationCandidate>> {
        Err(meridian_core::AgentError::Failed {
            agent: self.name.clone(),
            reason: self.reason.clone(),
        }
        .into())
    }
}

/// Agent that sleeps before answering; pair with a short per-agent
/// timeout (or paused tokio time) to exercise the timeout path.
pub struct SlowAgent {
    kind: AgentKind,
    name: String,
    delay: Duration,
    candidates: Vec<RecommendationCandidate>,
}

impl SlowAgent {
    pub fn new(kind: AgentKind, delay: Duration, candidates: Vec<RecommendationCandidate>) -> Self {
        let name = kind.label().to_string();
        Self {
            kind,
            name,
            delay,
            candidates,
        }
    }
}

#[async_trait]
impl AnalysisAgent for SlowAgent {
    fn kind(&self) -> AgentKind {
        self.kind.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn analyze(
        &self,
        _ctx: &BusinessContext,
    ) -> MeridianResult<Vec<RecommendationCandidate>> {
        tokio::time::sleep(self.delay).await;
        Ok(self.candidates.clone())
    }
}

// ============================================================================
// IN-MEMORY PROFILE STORE
// ============================================================================

/// Map-backed profile store for tests and non-persistent deployments.
#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: Mutex<HashMap<EntityId, BusinessProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a profile, bypassing the learning path.
    pub fn seed(&self, profile: BusinessProfile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.merchant_id, profile);
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn load(&self, merchant_id: EntityId) -> MeridianResult<Option<BusinessProfile>> {
        Ok(self.profiles.lock().unwrap().get(&merchant_id).cloned())
    }

    async fn store(&self, profile: &BusinessProfile) -> MeridianResult<()> {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.merchant_id, profile.clone());
        Ok(())
    }
}

// ============================================================================
// FIXTURE BUILDERS
// ============================================================================

/// Candidate with sensible defaults for tests.
pub fn candidate(agent: AgentKind, impact: f64) -> RecommendationCandidate {
    RecommendationCandidate::new(
        agent,
        impact,
        0.8,
        Urgency::Normal,
        RiskClass::Low,
        ActionPayload::Restock { units: 10 },
    )
}

/// Candidate targeting an entity, with explicit urgency and payload.
pub fn targeted_candidate(
    agent: AgentKind,
    entity: &str,
    impact: f64,
    urgency: Urgency,
    payload: ActionPayload,
) -> RecommendationCandidate {
    RecommendationCandidate::new(agent, impact, 0.8, urgency, RiskClass::Low, payload)
        .with_target_entity(entity)
}

/// Context with sensible defaults for tests.
pub fn context() -> BusinessContext {
    BusinessContext::new(new_entity_id(), 0.5, BusinessPriority::Growth)
}
