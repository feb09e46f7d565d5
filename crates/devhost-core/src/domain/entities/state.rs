//! Orchestration state machine.
//!
//! ```text
//! Requested → Scaffolding → NetworkWiring → Tls → VhostWiring → DatabaseWiring → Complete
//!     └──────────────┴─────────────┴──────────┴────────┴──────────────┴──→ Failed{step, cause}
//! ```
//!
//! Every transition goes through [`OrchestrationState::advance`] or
//! [`OrchestrationState::fail`]; terminal states refuse both.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Unit of work the orchestrator reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    /// Validation, port allocation, domain lock. Never mutates.
    Preflight,
    Scaffold,
    Hosts,
    Tls,
    Vhost,
    Database,
}

impl Step {
    /// Steps in execution order.
    pub const SEQUENCE: [Step; 6] = [
        Self::Preflight,
        Self::Scaffold,
        Self::Hosts,
        Self::Tls,
        Self::Vhost,
        Self::Database,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Preflight => "preflight",
            Self::Scaffold => "scaffold",
            Self::Hosts => "hosts",
            Self::Tls => "tls",
            Self::Vhost => "vhost",
            Self::Database => "database",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "state")]
pub enum OrchestrationState {
    Requested,
    Scaffolding,
    NetworkWiring,
    Tls,
    VhostWiring,
    DatabaseWiring,
    Complete,
    Failed { step: Step, cause: String },
}

impl OrchestrationState {
    /// Next state in the fixed sequence.
    pub fn advance(&self) -> Result<Self, DomainError> {
        let next = match self {
            Self::Requested => Self::Scaffolding,
            Self::Scaffolding => Self::NetworkWiring,
            Self::NetworkWiring => Self::Tls,
            Self::Tls => Self::VhostWiring,
            Self::VhostWiring => Self::DatabaseWiring,
            Self::DatabaseWiring => Self::Complete,
            Self::Complete | Self::Failed { .. } => {
                return Err(DomainError::InvalidTransition {
                    from: self.to_string(),
                });
            }
        };
        Ok(next)
    }

    /// Move to `Failed`; allowed from any non-terminal state.
    pub fn fail(&self, step: Step, cause: impl Into<String>) -> Result<Self, DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidTransition {
                from: self.to_string(),
            });
        }
        Ok(Self::Failed {
            step,
            cause: cause.into(),
        })
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed { .. })
    }

    /// The step that runs while in this state.
    pub const fn step(&self) -> Option<Step> {
        match self {
            Self::Requested => Some(Step::Preflight),
            Self::Scaffolding => Some(Step::Scaffold),
            Self::NetworkWiring => Some(Step::Hosts),
            Self::Tls => Some(Step::Tls),
            Self::VhostWiring => Some(Step::Vhost),
            Self::DatabaseWiring => Some(Step::Database),
            Self::Complete | Self::Failed { .. } => None,
        }
    }
}

impl fmt::Display for OrchestrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => f.write_str("requested"),
            Self::Scaffolding => f.write_str("scaffolding"),
            Self::NetworkWiring => f.write_str("network-wiring"),
            Self::Tls => f.write_str("tls"),
            Self::VhostWiring => f.write_str("vhost-wiring"),
            Self::DatabaseWiring => f.write_str("database-wiring"),
            Self::Complete => f.write_str("complete"),
            Self::Failed { step, cause } => write!(f, "failed at {step}: {cause}"),
        }
    }
}

/// What a step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "outcome", content = "reason")]
pub enum StepOutcome {
    /// The step changed the host.
    Committed,
    /// Everything the step would create was already there.
    AlreadyPresent,
    /// Not requested, or optional capability missing.
    Skipped(String),
    /// Dry run: the step's mutations were described, not performed.
    Simulated,
    Failed,
    /// Failed after changing the host, e.g. a generator that wrote files and
    /// then exited non-zero.
    FailedAfterChanges,
}

impl StepOutcome {
    /// Whether this outcome left (or, in a dry run, would leave) a mark on
    /// the host.
    pub const fn mutated(&self) -> bool {
        matches!(
            self,
            Self::Committed | Self::Simulated | Self::FailedAfterChanges
        )
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Committed => f.write_str("committed"),
            Self::AlreadyPresent => f.write_str("already present"),
            Self::Skipped(reason) => write!(f, "skipped ({reason})"),
            Self::Simulated => f.write_str("simulated"),
            Self::Failed => f.write_str("failed"),
            Self::FailedAfterChanges => f.write_str("failed after changes"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: Step,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

impl StepRecord {
    pub fn new(step: Step, outcome: StepOutcome) -> Self {
        Self { step, outcome }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_through_the_full_sequence() {
        let mut state = OrchestrationState::Requested;
        let mut steps = vec![];
        while let Some(step) = state.step() {
            steps.push(step);
            state = state.advance().unwrap();
        }
        assert_eq!(state, OrchestrationState::Complete);
        assert_eq!(steps, Step::SEQUENCE);
    }

    #[test]
    fn terminal_states_refuse_transitions() {
        assert!(OrchestrationState::Complete.advance().is_err());
        let failed = OrchestrationState::Tls.fail(Step::Tls, "boom").unwrap();
        assert!(failed.advance().is_err());
        assert!(failed.fail(Step::Vhost, "again").is_err());
        assert_eq!(failed.to_string(), "failed at tls: boom");
    }

    #[test]
    fn any_non_terminal_state_can_fail() {
        let mut state = OrchestrationState::Requested;
        while !state.is_terminal() {
            let step = state.step().unwrap();
            assert!(state.fail(step, "x").is_ok());
            state = state.advance().unwrap();
        }
    }

    #[test]
    fn simulated_counts_as_mutation() {
        assert!(StepOutcome::Simulated.mutated());
        assert!(StepOutcome::Committed.mutated());
        assert!(!StepOutcome::AlreadyPresent.mutated());
        assert!(!StepOutcome::Skipped("not requested".into()).mutated());
    }
}
