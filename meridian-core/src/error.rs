//! Error types for MERIDIAN operations

use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Agent invocation errors. Never fatal to a cycle - the runner isolates
/// them into the per-agent manifest.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AgentError {
    #[error("Agent {agent} timed out after {timeout:?}")]
    Timeout { agent: String, timeout: Duration },

    #[error("Agent {agent} failed: {reason}")]
    Failed { agent: String, reason: String },

    #[error("Agent {agent} emitted malformed output: {reason}")]
    MalformedOutput { agent: String, reason: String },

    #[error("Agent {agent} panicked")]
    Panicked { agent: String },

    #[error("Agent kind already registered: {agent}")]
    DuplicateKind { agent: String },

    #[error("No agents registered")]
    EmptyRegistry,
}

/// Data-quality problems found during scoring or conflict analysis.
/// These exclude a candidate from a stage, never abort the cycle.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScoringError {
    #[error("Candidate {candidate_id} references unknown target entity {entity}")]
    UnknownTargetEntity { candidate_id: Uuid, entity: String },

    #[error("Candidate {candidate_id} expired before scoring")]
    ExpiredCandidate { candidate_id: Uuid },
}

/// Learning-coordinator errors. Best-effort: logged, never block future
/// cycles.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LearningError {
    #[error("Failed to load profile for merchant {merchant_id}: {reason}")]
    ProfileLoadFailed { merchant_id: Uuid, reason: String },

    #[error("Failed to store profile for merchant {merchant_id}: {reason}")]
    ProfileStoreFailed { merchant_id: Uuid, reason: String },

    #[error("No outcome signals supplied for merchant {merchant_id}")]
    NoSignals { merchant_id: Uuid },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all MERIDIAN errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MeridianError {
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Learning error: {0}")]
    Learning(#[from] LearningError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for MERIDIAN operations.
pub type MeridianResult<T> = Result<T, MeridianError>;

// =============================================================================
// TESTS
// =============================================================================
