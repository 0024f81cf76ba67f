//! Business context supplied by the caller for one orchestration cycle.

use crate::{new_entity_id, EntityId};
use serde::{Deserialize, Serialize};

/// Stated business priority for a merchant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusinessPriority {
    /// Maximize revenue growth; high-impact actions are favored
    Growth,
    /// Protect existing revenue; low-risk actions are favored
    Stability,
    /// Reduce operating cost; cost-avoidance actions are favored
    Efficiency,
}

/// Immutable input for one orchestration cycle.
///
/// Supplied by the caller; the engine never mutates it. `domain_data` is
/// opaque to the orchestrator and passed through to agents unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessContext {
    /// Merchant this cycle runs for
    pub merchant_id: EntityId,
    /// Identifier of this orchestration cycle
    pub cycle_id: EntityId,
    /// Merchant's risk tolerance, 0.0 (averse) to 1.0 (tolerant)
    pub risk_tolerance: f64,
    /// Stated business priority
    pub priority: BusinessPriority,
    /// Opaque operating data handed to agents as-is
    pub domain_data: serde_json::Value,
}

impl BusinessContext {
    /// Create a context for a new cycle. Risk tolerance is clamped to [0, 1].
    pub fn new(merchant_id: EntityId, risk_tolerance: f64, priority: BusinessPriority) -> Self {
        Self {
            merchant_id,
            cycle_id: new_entity_id(),
            risk_tolerance: risk_tolerance.clamp(0.0, 1.0),
            priority,
            domain_data: serde_json::Value::Null,
        }
    }

    /// Attach opaque domain data for the agents.
    pub fn with_domain_data(mut self, data: serde_json::Value) -> Self {
        self.domain_data = data;
        self
    }
}
