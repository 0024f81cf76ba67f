//! Engine configuration types

use crate::error::{ConfigError, MeridianError, MeridianResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Weights for the base-score combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub impact: f64,
    pub confidence: f64,
    pub urgency: f64,
}

/// Per-urgency-class fixed multipliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrgencyMultipliers {
    pub low: f64,
    pub normal: f64,
    pub high: f64,
    pub critical: f64,
}

/// Master configuration struct.
/// ALL values are required - no defaults anywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    // Agent runner (REQUIRED)
    /// Timeout applied to each agent invocation
    pub per_agent_timeout: Duration,
    /// Outer bound on the whole fan-out/fan-in barrier
    pub global_deadline: Duration,
    /// Candidates accepted per agent per cycle; excess is truncated
    pub max_candidates_per_agent: usize,

    // Scoring (REQUIRED)
    pub scoring_weights: ScoringWeights,
    /// Base score is clipped to [0, base_score_cap]
    pub base_score_cap: f64,
    /// Saturation constant k in |impact| / (|impact| + k)
    pub impact_saturation: f64,
    pub urgency_multipliers: UrgencyMultipliers,
    /// Base discount for medium-risk candidates, in (0, 1]
    pub medium_risk_discount: f64,
    /// Base discount for high-risk candidates, in (0, 1]
    pub high_risk_discount: f64,

    // Synergy / conflict (REQUIRED)
    /// Bounded bonus applied to both members of a synergy pair
    pub synergy_bonus: f64,
    /// Penalty annotation for a flagged conflict pairing
    pub conflict_penalty: f64,
    /// Multiplier applied to non-winning members of a resolved conflict,
    /// in (0, 0.5]
    pub conflict_loser_factor: f64,

    // Personalization (REQUIRED)
    /// Maximum risk-affinity boost for a fully risk-tolerant merchant
    pub risk_affinity_max_boost: f64,
    /// Boost applied when a candidate matches the business priority
    pub priority_boost: f64,
    /// Floor on the agent-responsiveness factor, avoids suppressing
    /// cold-start agents
    pub responsiveness_floor: f64,

    // Plan generation (REQUIRED)
    /// Entries in the top-N cut (critical candidates bypass it)
    pub top_n: usize,
    /// Execution-time estimate per plan entry
    pub per_entry_execution_estimate: Duration,

    // Learning (REQUIRED)
    /// EWMA retention of the old implementation-rate estimate, in [0, 1)
    pub ewma_retention: f64,
}

impl EngineConfig {
    /// Build the default engine configuration.
    ///
    /// This centralizes the "sane defaults" that callers can reuse without
    /// hardcoding policy at the call site.
    pub fn default_engine() -> Self {
        Self {
            per_agent_timeout: Duration::from_secs(10),
            global_deadline: Duration::from_secs(15),
            max_candidates_per_agent: 25,
            scoring_weights: ScoringWeights {
                impact: 4.0,
                confidence: 3.0,
                urgency: 3.0,
            },
            base_score_cap: 10.0,
            impact_saturation: 1000.0,
            urgency_multipliers: UrgencyMultipliers {
                low: 0.7,
                normal: 1.0,
                high: 1.5,
                critical: 2.0,
            },
            medium_risk_discount: 0.85,
            high_risk_discount: 0.6,
            synergy_bonus: 0.5,
            conflict_penalty: 0.5,
            conflict_loser_factor: 0.5,
            risk_affinity_max_boost: 1.2,
            priority_boost: 1.15,
            responsiveness_floor: 0.5,
            top_n: 10,
            per_entry_execution_estimate: Duration::from_secs(15 * 60),
            ewma_retention: 0.9,
        }
    }

    /// Validate the configuration.
    /// Returns Ok(()) if valid, Err(MeridianError::Config) if invalid.
    pub fn validate(&self) -> MeridianResult<()> {
        if self.per_agent_timeout.is_zero() {
            return Err(invalid(
                "per_agent_timeout",
                format!("{:?}", self.per_agent_timeout),
                "per_agent_timeout must be positive",
            ));
        }

        if self.global_deadline < self.per_agent_timeout {
            return Err(invalid(
                "global_deadline",
                format!("{:?}", self.global_deadline),
                "global_deadline must be at least per_agent_timeout",
            ));
        }

        if self.max_candidates_per_agent == 0 {
            return Err(invalid(
                "max_candidates_per_agent",
                self.max_candidates_per_agent.to_string(),
                "must accept at least one candidate per agent",
            ));
        }

        let weight_sum = self.scoring_weights.impact
            + self.scoring_weights.confidence
            + self.scoring_weights.urgency;
        if weight_sum <= 0.0 {
            return Err(invalid(
                "scoring_weights",
                weight_sum.to_string(),
                "weights must sum to a positive value",
            ));
        }

        if self.base_score_cap <= 0.0 {
            return Err(invalid(
                "base_score_cap",
                self.base_score_cap.to_string(),
                "base_score_cap must be positive",
            ));
        }

        if self.impact_saturation <= 0.0 {
            return Err(invalid(
                "impact_saturation",
                self.impact_saturation.to_string(),
                "impact_saturation must be positive",
            ));
        }

        let m = &self.urgency_multipliers;
        if !(m.low > 0.0 && m.low <= m.normal && m.normal <= m.high && m.high <= m.critical) {
            return Err(invalid(
                "urgency_multipliers",
                format!("{:?}", m),
                "multipliers must be positive and non-decreasing low..critical",
            ));
        }

        for (field, value) in [
            ("medium_risk_discount", self.medium_risk_discount),
            ("high_risk_discount", self.high_risk_discount),
        ] {
            if value <= 0.0 || value > 1.0 {
                return Err(invalid(field, value.to_string(), "must be in (0, 1]"));
            }
        }

        if self.high_risk_discount > self.medium_risk_discount {
            return Err(invalid(
                "high_risk_discount",
                self.high_risk_discount.to_string(),
                "high risk must discount at least as much as medium risk",
            ));
        }

        if self.synergy_bonus < 0.0 {
            return Err(invalid(
                "synergy_bonus",
                self.synergy_bonus.to_string(),
                "synergy_bonus must be non-negative",
            ));
        }

        if self.conflict_penalty < 0.0 {
            return Err(invalid(
                "conflict_penalty",
                self.conflict_penalty.to_string(),
                "conflict_penalty must be non-negative",
            ));
        }

        if self.conflict_loser_factor <= 0.0 || self.conflict_loser_factor > 0.5 {
            return Err(invalid(
                "conflict_loser_factor",
                self.conflict_loser_factor.to_string(),
                "must be in (0, 0.5] so losers are penalized by at least half",
            ));
        }

        if self.risk_affinity_max_boost < 1.0 {
            return Err(invalid(
                "risk_affinity_max_boost",
                self.risk_affinity_max_boost.to_string(),
                "personalization only boosts; must be >= 1.0",
            ));
        }

        if self.priority_boost < 1.0 {
            return Err(invalid(
                "priority_boost",
                self.priority_boost.to_string(),
                "personalization only boosts; must be >= 1.0",
            ));
        }

        if self.responsiveness_floor <= 0.0 || self.responsiveness_floor > 1.0 {
            return Err(invalid(
                "responsiveness_floor",
                self.responsiveness_floor.to_string(),
                "must be in (0, 1]",
            ));
        }

        if self.top_n == 0 {
            return Err(invalid(
                "top_n",
                self.top_n.to_string(),
                "top_n must be greater than 0",
            ));
        }

        if self.ewma_retention < 0.0 || self.ewma_retention >= 1.0 {
            return Err(invalid(
                "ewma_retention",
                self.ewma_retention.to_string(),
                "must be in [0, 1) so new outcomes always contribute",
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, value: String, reason: &str) -> MeridianError {
    MeridianError::Config(ConfigError::InvalidValue {
        field: field.to_string(),
        value,
        reason: reason.to_string(),
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_engine_validates() {
        assert!(EngineConfig::default_engine().validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut cfg = EngineConfig::default_engine();
        cfg.per_agent_timeout = Duration::ZERO;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_deadline_shorter_than_agent_timeout_rejected() {
        let mut cfg = EngineConfig::default_engine();
        cfg.global_deadline = Duration::from_secs(1);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_unordered_urgency_multipliers_rejected() {
        let mut cfg = EngineConfig::default_engine();
        cfg.urgency_multipliers.critical = 0.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_loser_factor_above_half_rejected() {
        let mut cfg = EngineConfig::default_engine();
        cfg.conflict_loser_factor = 0.9;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_penalizing_personalization_rejected() {
        let mut cfg = EngineConfig::default_engine();
        cfg.risk_affinity_max_boost = 0.8;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_ewma_retention_of_one_rejected() {
        let mut cfg = EngineConfig::default_engine();
        cfg.ewma_retention = 1.0;
        assert!(cfg.validate().is_err());
    }
}
