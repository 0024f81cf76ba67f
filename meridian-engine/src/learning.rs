//! Cross-agent learning coordinator.
//!
//! Runs on its own slower cycle, off the synchronous scoring path. It is
//! the sole writer of `BusinessProfile`; scoring only ever reads a
//! snapshot. Updates are best-effort and eventually consistent - a failed
//! store is logged and never blocks future cycles.

use async_trait::async_trait;
use chrono::Utc;
use meridian_core::{
    AgentKind, BusinessProfile, EntityId, LearningError, MeridianResult, OutcomeSignal,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

// ============================================================================
// PROFILE STORE SEAM
// ============================================================================

/// Persistence collaborator for merchant profiles.
///
/// Owned by the external persistence layer; this engine only defines the
/// seam. Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load the current profile for a merchant, None for a new merchant.
    async fn load(&self, merchant_id: EntityId) -> MeridianResult<Option<BusinessProfile>>;

    /// Persist an updated profile.
    async fn store(&self, profile: &BusinessProfile) -> MeridianResult<()>;
}

// ============================================================================
// LEARNING COORDINATOR
// ============================================================================

/// Redistributes observed outcome signals into per-merchant profiles.
pub struct LearningCoordinator {
    store: Arc<dyn ProfileStore>,
    /// EWMA retention of the old estimate; a single bad outcome cannot
    /// whipsaw personalization.
    ewma_retention: f64,
    /// Single-writer-per-merchant discipline: two learning updates for
    /// one merchant never run concurrently.
    merchant_locks: Mutex<HashMap<EntityId, Arc<Mutex<()>>>>,
}

impl LearningCoordinator {
    pub fn new(store: Arc<dyn ProfileStore>, ewma_retention: f64) -> Self {
        Self {
            store,
            ewma_retention,
            merchant_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Fold a batch of outcome signals for one merchant into its profile
    /// and persist the result.
    ///
    /// Returns the updated profile. A store failure is surfaced as a
    /// `LearningError` for the caller to log; it must not roll anything
    /// back or block future cycles.
    pub async fn apply_outcomes(
        &self,
        merchant_id: EntityId,
        signals: &[OutcomeSignal],
    ) -> MeridianResult<BusinessProfile> {
        if signals.is_empty() {
            return Err(LearningError::NoSignals { merchant_id }.into());
        }

        let lock = self.merchant_lock(merchant_id).await;
        let _guard = lock.lock().await;

        let mut profile = self
            .store
            .load(merchant_id)
            .await?
            .unwrap_or_else(|| BusinessProfile::new(merchant_id));

        self.update_implementation_rates(&mut profile, signals);
        self.update_satisfaction(&mut profile, signals);
        profile.cycles_observed += 1;
        profile.updated_at = Utc::now();

        if let Err(err) = self.store.store(&profile).await {
            warn!(merchant = %merchant_id, error = %err, "profile store failed; update dropped");
            return Err(LearningError::ProfileStoreFailed {
                merchant_id,
                reason: err.to_string(),
            }
            .into());
        }

        debug!(
            merchant = %merchant_id,
            signals = signals.len(),
            cycles = profile.cycles_observed,
            "profile updated"
        );
        Ok(profile)
    }

    async fn merchant_lock(&self, merchant_id: EntityId) -> Arc<Mutex<()>> {
        let mut locks = self.merchant_locks.lock().await;
        Arc::clone(locks.entry(merchant_id).or_default())
    }

    /// EWMA the observed implementation rate per agent into the profile.
    fn update_implementation_rates(
        &self,
        profile: &mut BusinessProfile,
        signals: &[OutcomeSignal],
    ) {
        let mut per_agent: HashMap<&AgentKind, (usize, usize)> = HashMap::new();
        for signal in signals {
            let (implemented, total) = per_agent.entry(&signal.agent).or_insert((0, 0));
            if signal.implemented {
                *implemented += 1;
            }
            *total += 1;
        }

        for (agent, (implemented, total)) in per_agent {
            let observed = implemented as f64 / total as f64;
            let old = profile.implementation_rate(agent);
            let updated = self.ewma_retention * old + (1.0 - self.ewma_retention) * observed;
            profile
                .agent_implementation_rates
                .insert(agent.clone(), updated);
        }
    }

    /// Fold prediction accuracy of implemented actions into the aggregate
    /// satisfaction signal.
    fn update_satisfaction(&self, profile: &mut BusinessProfile, signals: &[OutcomeSignal]) {
        let accuracies: Vec<f64> = signals
            .iter()
            .filter(|s| s.implemented)
            .filter_map(|s| {
                let actual = s.actual_impact?;
                let denom = s.predicted_impact.abs().max(1.0);
                Some((1.0 - (actual - s.predicted_impact).abs() / denom).max(0.0))
            })
            .collect();

        if accuracies.is_empty() {
            return;
        }

        let observed = accuracies.iter().sum::<f64>() / accuracies.len() as f64;
        profile.satisfaction_signal =
            self.ewma_retention * profile.satisfaction_signal + (1.0 - self.ewma_retention) * observed;
    }
}

// =============================================================================
// TESTS
// =============================================================================
