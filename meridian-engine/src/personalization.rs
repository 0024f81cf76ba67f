//! Per-merchant score re-weighting.
//!
//! Personalization only boosts - every multiplier component is at least
//! the responsiveness floor, and the risk/priority components never drop
//! below 1.0, so it can never penalize a candidate beyond what the risk
//! adjustment already applied. A merchant with no profile yet gets neutral
//! responsiveness rather than a failed cycle.

use meridian_core::{
    BusinessContext, BusinessPriority, BusinessProfile, EngineConfig, GlobalActionScore,
    RecommendationCandidate, RiskClass,
};

/// Re-weights final scores from the merchant's behavioral profile and
/// stated preferences, then reassigns ranks.
pub struct PersonalizationLayer {
    risk_affinity_max_boost: f64,
    priority_boost: f64,
    responsiveness_floor: f64,
}

impl PersonalizationLayer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            risk_affinity_max_boost: config.risk_affinity_max_boost,
            priority_boost: config.priority_boost,
            responsiveness_floor: config.responsiveness_floor,
        }
    }

    /// Apply personalization multipliers, then sort `scores` into final
    /// rank order (score descending, candidate id ascending on ties) and
    /// assign ranks 1..n.
    ///
    /// `scores` must be index-aligned with `candidates` on entry; on exit
    /// it is in rank order instead.
    pub fn apply(
        &self,
        ctx: &BusinessContext,
        profile: Option<&BusinessProfile>,
        candidates: &[RecommendationCandidate],
        scores: &mut Vec<GlobalActionScore>,
    ) {
        debug_assert_eq!(candidates.len(), scores.len());

        for (candidate, score) in candidates.iter().zip(scores.iter_mut()) {
            let multiplier = self.risk_affinity(candidate.risk, ctx.risk_tolerance)
                * self.priority_affinity(ctx.priority, candidate, score)
                * self.responsiveness(profile, candidate);

            score.personalization_multiplier = multiplier;
            score.final_score *= multiplier;
        }

        scores.sort_by(|a, b| {
            b.final_score
                .total_cmp(&a.final_score)
                .then(a.candidate_id.cmp(&b.candidate_id))
        });
        for (position, score) in scores.iter_mut().enumerate() {
            score.rank = position + 1;
        }
    }

    /// Risk-tolerant merchants get a modest boost on riskier candidates;
    /// never below 1.0.
    fn risk_affinity(&self, risk: RiskClass, risk_tolerance: f64) -> f64 {
        let risk_weight = match risk {
            RiskClass::Low => 0.0,
            RiskClass::Medium => 0.5,
            RiskClass::High => 1.0,
        };
        1.0 + (self.risk_affinity_max_boost - 1.0) * risk_weight * risk_tolerance.clamp(0.0, 1.0)
    }

    /// Boost candidates matching the stated business priority.
    fn priority_affinity(
        &self,
        priority: BusinessPriority,
        candidate: &RecommendationCandidate,
        score: &GlobalActionScore,
    ) -> f64 {
        let matches = match priority {
            BusinessPriority::Growth => score.impact_score >= 0.5,
            BusinessPriority::Stability => candidate.risk == RiskClass::Low,
            BusinessPriority::Efficiency => candidate.predicted_impact < 0.0,
        };
        if matches {
            self.priority_boost
        } else {
            1.0
        }
    }

    /// Factor proportional to the agent's historical implementation rate.
    /// Cold-start agents sit at the neutral midpoint; the floor keeps an
    /// unresponsive agent visible. Explicit merchant overrides replace the
    /// learned rate entirely.
    fn responsiveness(
        &self,
        profile: Option<&BusinessProfile>,
        candidate: &RecommendationCandidate,
    ) -> f64 {
        let Some(profile) = profile else {
            return 1.0;
        };

        if let Some(&override_factor) = profile.overrides.get(&candidate.agent) {
            return override_factor.max(self.responsiveness_floor);
        }

        let rate = profile.implementation_rate(&candidate.agent);
        (0.5 + rate).max(self.responsiveness_floor)
    }
}

// =============================================================================
// TESTS
// =============================================================================
