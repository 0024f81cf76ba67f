//! Per-merchant behavioral profile.
//!
//! Long-lived across cycles. The learning coordinator is the sole writer;
//! the scoring path reads a snapshot taken at cycle start.

use crate::{candidate::AgentKind, EntityId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregated behavioral signals for one merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    /// Merchant this profile belongs to
    pub merchant_id: EntityId,
    /// Historical implementation rate per agent, 0.0 to 1.0
    pub agent_implementation_rates: HashMap<AgentKind, f64>,
    /// Aggregate satisfaction signal, 0.0 to 1.0
    pub satisfaction_signal: f64,
    /// Explicit per-agent multiplier overrides set by the merchant
    pub overrides: HashMap<AgentKind, f64>,
    /// Number of learning updates applied
    pub cycles_observed: u64,
    /// Last learning update
    pub updated_at: Timestamp,
}

impl BusinessProfile {
    /// Fresh profile for a merchant with no history yet.
    pub fn new(merchant_id: EntityId) -> Self {
        Self {
            merchant_id,
            agent_implementation_rates: HashMap::new(),
            satisfaction_signal: 0.5,
            overrides: HashMap::new(),
            cycles_observed: 0,
            updated_at: Utc::now(),
        }
    }

    /// Implementation rate for an agent; cold-start agents default to 0.5.
    pub fn implementation_rate(&self, agent: &AgentKind) -> f64 {
        self.agent_implementation_rates
            .get(agent)
            .copied()
            .unwrap_or(0.5)
    }
}
