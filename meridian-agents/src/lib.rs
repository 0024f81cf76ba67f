//! MERIDIAN Agents - Contract, Registry, and Runner
//!
//! Provides the capability contract every analysis agent implements, the
//! startup-time registry of concrete agents, and the concurrent runner
//! that fans one business context out to all registered agents:
//! - Per-agent timeout and failure isolation
//! - Global fan-out/fan-in deadline
//! - Cooperative cancellation
//! - Per-agent outcome manifest for observability and learning

use async_trait::async_trait;
use chrono::Utc;
use meridian_core::{
    AgentError, AgentKind, AgentOutcome, AgentRunStatus, BusinessContext, EngineConfig,
    MeridianResult, RecommendationCandidate,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, warn};

// ============================================================================
// AGENT CONTRACT
// ============================================================================

/// Capability contract for one analysis agent.
///
/// Implementations must be thread-safe (Send + Sync). An agent examines
/// one merchant's operating data and proposes candidate actions; it never
/// sees other agents' output and must tolerate being cancelled at any
/// await point.
///
/// # Example
/// ```ignore
/// struct InventoryAgent { /* ... */ }
///
/// #[async_trait]
/// impl AnalysisAgent for InventoryAgent {
///     fn kind(&self) -> AgentKind { AgentKind::Inventory }
///     fn name(&self) -> &str { "inventory" }
///     async fn analyze(&self, ctx: &BusinessContext)
///         -> MeridianResult<Vec<RecommendationCandidate>> {
///         // Inspect ctx.domain_data, emit candidates
///     }
/// }
/// ```
#[async_trait]
pub trait AnalysisAgent: Send + Sync {
    /// Stable identity of this agent; one registration per kind.
    fn kind(&self) -> AgentKind;

    /// Human-readable name used in logs and error records.
    fn name(&self) -> &str;

    /// Analyze the business context and emit candidate actions.
    ///
    /// Must complete within the runner's per-agent timeout or the whole
    /// invocation is treated as failed. Errors are isolated per agent and
    /// never abort the cycle.
    async fn analyze(
        &self,
        ctx: &BusinessContext,
    ) -> MeridianResult<Vec<RecommendationCandidate>>;
}

// ============================================================================
// AGENT REGISTRY
// ============================================================================

/// Startup-time registry of concrete agents.
///
/// The runner depends only on the `AnalysisAgent` contract, never on
/// concrete agent types. Registration order is invocation order, but
/// completion order never affects downstream ranking.
#[derive(Default)]
pub struct AgentRegistry {
    agents: Vec<Arc<dyn AnalysisAgent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self { agents: Vec::new() }
    }

    /// Register an agent. Rejects a second agent of the same kind.
    pub fn register(&mut self, agent: Arc<dyn AnalysisAgent>) -> MeridianResult<()> {
        if self.agents.iter().any(|a| a.kind() == agent.kind()) {
            return Err(AgentError::DuplicateKind {
                agent: agent.kind().label().to_string(),
            }
            .into());
        }
        self.agents.push(agent);
        Ok(())
    }

    pub fn agents(&self) -> &[Arc<dyn AnalysisAgent>] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

// ============================================================================
// RUN REPORT
// ============================================================================

/// Output of one fan-out: the union of surviving candidates plus the
/// per-agent outcome manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRunReport {
    /// Surviving candidates, sorted by candidate id so that concurrent
    /// completion order never leaks into downstream ordering
    pub candidates: Vec<RecommendationCandidate>,
    /// One entry per registered agent
    pub outcomes: Vec<AgentOutcome>,
}

impl AgentRunReport {
    /// Agents whose invocation did not succeed this cycle.
    pub fn failed_agents(&self) -> impl Iterator<Item = &AgentOutcome> {
        self.outcomes.iter().filter(|o| !o.status.is_success())
    }
}

// ============================================================================
// AGENT RUNNER
// ============================================================================

/// Invokes all registered agents concurrently for one business context.
///
/// One tokio task per agent, started together and joined under a global
/// deadline. An agent's timeout, error, or panic produces a per-agent
/// outcome record and an empty candidate slice for that agent - never a
/// cycle failure. Zero surviving candidates is a valid terminal state.
pub struct AgentRunner {
    registry: Arc<AgentRegistry>,
    per_agent_timeout: Duration,
    global_deadline: Duration,
    max_candidates_per_agent: usize,
}

impl AgentRunner {
    pub fn new(registry: Arc<AgentRegistry>, config: &EngineConfig) -> Self {
        Self {
            registry,
            per_agent_timeout: config.per_agent_timeout,
            global_deadline: config.global_deadline,
            max_candidates_per_agent: config.max_candidates_per_agent,
        }
    }

    /// Run all agents without external cancellation.
    pub async fn run(&self, ctx: &BusinessContext) -> AgentRunReport {
        let (_tx, rx) = watch::channel(false);
        self.run_cancellable(ctx, rx).await
    }

    /// Run all agents; flipping the watch channel to `true` cancels the
    /// cycle. Results from tasks that do not observe cancellation promptly
    /// are discarded, bounded by the same global deadline as the join.
    pub async fn run_cancellable(
        &self,
        ctx: &BusinessContext,
        cancel: watch::Receiver<bool>,
    ) -> AgentRunReport {
        let mut tasks = Vec::with_capacity(self.registry.len());

        for agent in self.registry.agents() {
            let agent = Arc::clone(agent);
            let ctx = ctx.clone();
            let timeout = self.per_agent_timeout;
            let max_candidates = self.max_candidates_per_agent;
            let mut cancel = cancel.clone();
            let kind = agent.kind();

            let handle = tokio::spawn(async move {
                let started = Instant::now();
                let name = agent.name().to_string();

                // A dropped sender means the caller discarded its cancel
                // handle, not that the cycle was cancelled.
                let cancelled = async move {
                    if cancel.wait_for(|&c| c).await.is_err() {
                        std::future::pending::<()>().await;
                    }
                };

                let invocation = tokio::time::timeout(timeout, agent.analyze(&ctx));
                let result = tokio::select! {
                    res = invocation => res,
                    _ = cancelled => {
                        return (AgentRunStatus::Cancelled, Vec::new(), started.elapsed());
                    }
                };

                let status_and_candidates = match result {
                    Ok(Ok(candidates)) => validate_output(&name, candidates, max_candidates),
                    Ok(Err(err)) => (
                        AgentRunStatus::Failed {
                            error: err.to_string(),
                        },
                        Vec::new(),
                    ),
                    Err(_elapsed) => (AgentRunStatus::TimedOut, Vec::new()),
                };

                (
                    status_and_candidates.0,
                    status_and_candidates.1,
                    started.elapsed(),
                )
            });

            tasks.push((kind, handle));
        }

        let deadline = Instant::now() + self.global_deadline;
        let mut outcomes = Vec::with_capacity(tasks.len());
        let mut candidates = Vec::new();

        for (kind, mut handle) in tasks {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, &mut handle).await {
                Ok(Ok((status, agent_candidates, duration))) => {
                    match &status {
                        AgentRunStatus::Succeeded { candidate_count } => {
                            debug!(
                                agent = kind.label(),
                                candidates = candidate_count,
                                ?duration,
                                "agent completed"
                            );
                        }
                        other => {
                            warn!(agent = kind.label(), status = ?other, "agent did not succeed");
                        }
                    }
                    candidates.extend(agent_candidates);
                    outcomes.push(AgentOutcome {
                        agent: kind,
                        status,
                        duration,
                    });
                }
                Ok(Err(join_err)) => {
                    warn!(agent = kind.label(), error = %join_err, "agent task panicked");
                    outcomes.push(AgentOutcome {
                        agent: kind,
                        status: AgentRunStatus::Panicked,
                        duration: self.global_deadline,
                    });
                }
                Err(_elapsed) => {
                    // Still running at the global deadline: partial output is
                    // discarded to preserve determinism.
                    handle.abort();
                    warn!(agent = kind.label(), "agent still running at global deadline");
                    outcomes.push(AgentOutcome {
                        agent: kind,
                        status: AgentRunStatus::TimedOut,
                        duration: self.global_deadline,
                    });
                }
            }
        }

        // Drop stale candidates at one consistent collection instant.
        let now = Utc::now();
        candidates.retain(|c| {
            let fresh = !c.is_expired(now);
            if !fresh {
                warn!(candidate = %c.candidate_id, agent = c.agent.label(), "dropping expired candidate");
            }
            fresh
        });

        candidates.sort_by_key(|c| c.candidate_id);

        AgentRunReport {
            candidates,
            outcomes,
        }
    }
}

/// Check an agent's raw output, truncating oversized sets and rejecting
/// non-finite numerics as malformed.
fn validate_output(
    name: &str,
    mut candidates: Vec<RecommendationCandidate>,
    max_candidates: usize,
) -> (AgentRunStatus, Vec<RecommendationCandidate>) {
    if candidates
        .iter()
        .any(|c| !c.predicted_impact.is_finite() || !c.confidence.is_finite())
    {
        let err = AgentError::MalformedOutput {
            agent: name.to_string(),
            reason: "non-finite impact or confidence".to_string(),
        };
        return (
            AgentRunStatus::Failed {
                error: err.to_string(),
            },
            Vec::new(),
        );
    }

    if candidates.len() > max_candidates {
        warn!(
            agent = name,
            emitted = candidates.len(),
            max = max_candidates,
            "truncating oversized candidate set"
        );
        candidates.truncate(max_candidates);
    }

    (
        AgentRunStatus::Succeeded {
            candidate_count: candidates.len(),
        },
        candidates,
    )
}

// =============================================================================
// TESTS
// =============================================================================
