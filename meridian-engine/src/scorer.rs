//! Per-candidate deterministic scoring.
//!
//! Every function here is a pure function of a single candidate and the
//! cycle's business context. No cross-candidate information enters until
//! the synergy/conflict stage, no randomness, no time-of-day dependence.

use meridian_core::{
    BusinessContext, EngineConfig, GlobalActionScore, RecommendationCandidate, RiskClass,
    ScoringWeights, Urgency, UrgencyMultipliers,
};

/// Computes the multi-factor score for one candidate.
pub struct ActionScorer {
    weights: ScoringWeights,
    base_score_cap: f64,
    impact_saturation: f64,
    urgency_multipliers: UrgencyMultipliers,
    medium_risk_discount: f64,
    high_risk_discount: f64,
}

impl ActionScorer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            weights: config.scoring_weights.clone(),
            base_score_cap: config.base_score_cap,
            impact_saturation: config.impact_saturation,
            urgency_multipliers: config.urgency_multipliers.clone(),
            medium_risk_discount: config.medium_risk_discount,
            high_risk_discount: config.high_risk_discount,
        }
    }

    /// Score one candidate. Identical attributes always yield identical
    /// scores.
    pub fn score(
        &self,
        candidate: &RecommendationCandidate,
        ctx: &BusinessContext,
    ) -> GlobalActionScore {
        let mut score = GlobalActionScore::new(candidate.candidate_id, candidate.agent.clone());

        score.impact_score = self.impact_score(candidate.predicted_impact);
        score.confidence_score = candidate.confidence;
        score.urgency_multiplier = self.urgency_multiplier(candidate.urgency);
        score.risk_adjustment = self.risk_adjustment(candidate.risk, ctx.risk_tolerance);
        score.base_score = self.base_score(
            score.impact_score,
            score.confidence_score,
            candidate.urgency,
        );
        score.final_score = score.base_score * score.urgency_multiplier * score.risk_adjustment;

        score
    }

    /// Impact magnitude normalized to [0, 1) via saturation, so one outlier
    /// prediction cannot dominate unboundedly. Negative impact (avoided
    /// cost) scores by magnitude.
    fn impact_score(&self, predicted_impact: f64) -> f64 {
        let magnitude = predicted_impact.abs();
        magnitude / (magnitude + self.impact_saturation)
    }

    fn urgency_multiplier(&self, urgency: Urgency) -> f64 {
        match urgency {
            Urgency::Low => self.urgency_multipliers.low,
            Urgency::Normal => self.urgency_multipliers.normal,
            Urgency::High => self.urgency_multipliers.high,
            Urgency::Critical => self.urgency_multipliers.critical,
        }
    }

    /// Bounded combination of normalized impact, confidence, and the
    /// urgency-class weight, clipped to [0, base_score_cap].
    fn base_score(&self, impact_score: f64, confidence: f64, urgency: Urgency) -> f64 {
        // Urgency contributes a unit weight relative to the top class so
        // the cap bounds every input the same way.
        let urgency_unit = self.urgency_multiplier(urgency) / self.urgency_multipliers.critical;

        let weight_sum = self.weights.impact + self.weights.confidence + self.weights.urgency;
        let combined = (self.weights.impact * impact_score
            + self.weights.confidence * confidence
            + self.weights.urgency * urgency_unit)
            / weight_sum;

        (combined * self.base_score_cap).clamp(0.0, self.base_score_cap)
    }

    /// Risk discount in (0, 1], modulated by merchant risk tolerance: a
    /// fully tolerant merchant discounts high-risk actions not at all.
    fn risk_adjustment(&self, risk: RiskClass, risk_tolerance: f64) -> f64 {
        let base = match risk {
            RiskClass::Low => 1.0,
            RiskClass::Medium => self.medium_risk_discount,
            RiskClass::High => self.high_risk_discount,
        };
        base + (1.0 - base) * risk_tolerance.clamp(0.0, 1.0)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::{new_entity_id, ActionPayload, AgentKind, BusinessPriority};

    fn scorer() -> ActionScorer {
        ActionScorer::new(&EngineConfig::default_engine())
    }

    fn ctx(risk_tolerance: f64) -> BusinessContext {
        BusinessContext::new(new_entity_id(), risk_tolerance, BusinessPriority::Growth)
    }

    fn candidate(
        impact: f64,
        confidence: f64,
        urgency: Urgency,
        risk: RiskClass,
    ) -> RecommendationCandidate {
        RecommendationCandidate::new(
            AgentKind::Inventory,
            impact,
            confidence,
            urgency,
            risk,
            ActionPayload::Restock { units: 5 },
        )
    }

    #[test]
    fn test_identical_inputs_yield_identical_scores() {
        let c = candidate(800.0, 0.75, Urgency::High, RiskClass::Medium);
        let context = ctx(0.4);
        let a = scorer().score(&c, &context);
        let b = scorer().score(&c, &context);
        assert_eq!(a, b);
    }

    #[test]
    fn test_impact_saturates_below_one() {
        let huge = candidate(1_000_000_000.0, 1.0, Urgency::Critical, RiskClass::Low);
        let score = scorer().score(&huge, &ctx(0.5));
        assert!(score.impact_score < 1.0);
        assert!(score.base_score <= 10.0);
    }

    #[test]
    fn test_negative_impact_scores_by_magnitude() {
        let gain = candidate(500.0, 0.8, Urgency::Normal, RiskClass::Low);
        let avoided_cost = candidate(-500.0, 0.8, Urgency::Normal, RiskClass::Low);
        let s = scorer();
        let context = ctx(0.5);
        assert_eq!(
            s.score(&gain, &context).impact_score,
            s.score(&avoided_cost, &context).impact_score
        );
    }

    #[test]
    fn test_urgency_ordering_of_multipliers() {
        let s = scorer();
        let context = ctx(0.5);
        let mk = |u| s.score(&candidate(300.0, 0.8, u, RiskClass::Low), &context);
        let low = mk(Urgency::Low);
        let normal = mk(Urgency::Normal);
        let high = mk(Urgency::High);
        let critical = mk(Urgency::Critical);
        assert!(low.urgency_multiplier < normal.urgency_multiplier);
        assert!(normal.urgency_multiplier < high.urgency_multiplier);
        assert!(high.urgency_multiplier < critical.urgency_multiplier);
        assert!(low.final_score < critical.final_score);
    }

    #[test]
    fn test_urgent_modest_impact_can_outrank_large_lazy_impact() {
        let s = scorer();
        let context = ctx(0.5);
        let urgent_modest = s.score(
            &candidate(400.0, 0.8, Urgency::Critical, RiskClass::Low),
            &context,
        );
        let large_lazy = s.score(
            &candidate(3000.0, 0.8, Urgency::Low, RiskClass::Low),
            &context,
        );
        assert!(urgent_modest.final_score > large_lazy.final_score);
    }

    #[test]
    fn test_risk_tolerance_softens_high_risk_discount() {
        let s = scorer();
        let c = candidate(500.0, 0.8, Urgency::Normal, RiskClass::High);
        let averse = s.score(&c, &ctx(0.0));
        let tolerant = s.score(&c, &ctx(1.0));
        assert!(averse.risk_adjustment < tolerant.risk_adjustment);
        assert_eq!(tolerant.risk_adjustment, 1.0);
    }

    #[test]
    fn test_low_risk_never_discounted() {
        let s = scorer();
        let c = candidate(500.0, 0.8, Urgency::Normal, RiskClass::Low);
        assert_eq!(s.score(&c, &ctx(0.0)).risk_adjustment, 1.0);
    }

    #[test]
    fn test_high_risk_discounts_at_least_as_much_as_medium() {
        let s = scorer();
        let context = ctx(0.3);
        let medium = s.score(
            &candidate(500.0, 0.8, Urgency::Normal, RiskClass::Medium),
            &context,
        );
        let high = s.score(
            &candidate(500.0, 0.8, Urgency::Normal, RiskClass::High),
            &context,
        );
        assert!(high.risk_adjustment <= medium.risk_adjustment);
    }
}
