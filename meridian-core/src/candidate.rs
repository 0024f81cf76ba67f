//! Recommendation candidates emitted by analysis agents.

use crate::{new_entity_id, EntityId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ============================================================================
// CLASSIFICATION ENUMS
// ============================================================================

/// Urgency class of a candidate action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    Normal,
    High,
    /// Always surfaced in the final plan regardless of rank
    Critical,
}

/// Risk class of a candidate action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskClass {
    Low,
    Medium,
    High,
}

/// Identity of the analysis agent that produced a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// Stock levels, reorder points, stock-out prevention
    Inventory,
    /// Price positioning and margin analysis
    Pricing,
    /// Demand trends and seasonal signals
    MarketTrend,
    /// Promotion and campaign analysis
    Promotion,
    /// Any agent registered outside the built-in set
    Custom(String),
}

impl AgentKind {
    /// Stable label used for logging and distribution summaries.
    pub fn label(&self) -> &str {
        match self {
            AgentKind::Inventory => "inventory",
            AgentKind::Pricing => "pricing",
            AgentKind::MarketTrend => "market_trend",
            AgentKind::Promotion => "promotion",
            AgentKind::Custom(name) => name,
        }
    }
}

// ============================================================================
// ACTION PAYLOAD
// ============================================================================

/// Typed action payload, one variant per recommendation kind.
///
/// Replaces the loosely-typed nested "supporting data" blobs: each variant
/// carries only the fields that kind needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionPayload {
    /// Reorder stock for the target entity
    Restock { units: u32 },
    /// Change the price of the target entity
    PriceChange { current: f64, proposed: f64 },
    /// Run a promotion on the target entity
    Promotion { discount_pct: f64, duration_days: u32 },
    /// Scale demand generation (marketing spend) up or down
    DemandScaling { factor: f64 },
    /// Anything a custom agent emits
    Other { detail: serde_json::Value },
}

impl ActionPayload {
    /// Whether two payloads recommend semantically opposite actions.
    ///
    /// Only comparable kinds can contradict: two price changes pulling in
    /// opposite directions, or demand scaling up against scaling down.
    pub fn contradicts(&self, other: &ActionPayload) -> bool {
        match (self, other) {
            (
                ActionPayload::PriceChange { current: ca, proposed: pa },
                ActionPayload::PriceChange { current: cb, proposed: pb },
            ) => (pa - ca).signum() * (pb - cb).signum() < 0.0,
            (
                ActionPayload::DemandScaling { factor: a },
                ActionPayload::DemandScaling { factor: b },
            ) => (a - 1.0).signum() * (b - 1.0).signum() < 0.0,
            _ => false,
        }
    }
}

// ============================================================================
// RECOMMENDATION CANDIDATE
// ============================================================================

/// One proposed action, immutable once emitted by an agent within a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationCandidate {
    /// Unique identifier for this candidate
    pub candidate_id: EntityId,
    /// Agent that produced this candidate
    pub agent: AgentKind,
    /// Entity this action targets (e.g. a product id); None for
    /// merchant-wide actions
    pub target_entity: Option<String>,
    /// Predicted business impact in currency units; negative values are
    /// avoided costs
    pub predicted_impact: f64,
    /// Agent's confidence in the prediction, 0.0 to 1.0
    pub confidence: f64,
    /// Urgency class
    pub urgency: Urgency,
    /// Risk class
    pub risk: RiskClass,
    /// Typed action payload
    pub payload: ActionPayload,
    /// Candidate is stale past this point and dropped at collection
    pub expires_at: Option<Timestamp>,
    /// When the agent emitted this candidate
    pub created_at: Timestamp,
}

impl RecommendationCandidate {
    /// Create a new candidate. Confidence is clamped to [0, 1].
    pub fn new(
        agent: AgentKind,
        predicted_impact: f64,
        confidence: f64,
        urgency: Urgency,
        risk: RiskClass,
        payload: ActionPayload,
    ) -> Self {
        Self {
            candidate_id: new_entity_id(),
            agent,
            target_entity: None,
            predicted_impact,
            confidence: confidence.clamp(0.0, 1.0),
            urgency,
            risk,
            payload,
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    /// Set the target entity.
    pub fn with_target_entity(mut self, entity: impl Into<String>) -> Self {
        self.target_entity = Some(entity.into());
        self
    }

    /// Set the expiry horizon.
    pub fn with_expiry(mut self, expires_at: Timestamp) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Whether this candidate has expired as of `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}

// =============================================================================
// TESTS
// =============================================================================
