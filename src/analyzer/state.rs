/// Run state definitions for tracking audit progress
///
/// Every audit run walks `Init -> Fetching -> Checking -> Aggregating -> Done`,
/// or ends in `Failed` when the main page cannot be fetched or parsed.
use crate::AuditError;
use std::fmt;

/// Represents the current state of one audit run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    // ===== Active States =====
    /// Run created, nothing requested yet
    Init,

    /// Main page is being fetched and parsed
    Fetching,

    /// Checkers are running
    Checking,

    /// Category results are being folded into the report
    Aggregating,

    // ===== Terminal States =====
    /// Report produced from checker results
    Done,

    /// Main page was unavailable; a full-failure report was produced
    Failed,
}

impl RunState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if the run may move from `self` to `next`
    ///
    /// `Failed` is reachable from every non-terminal state; terminal
    /// states have no successors.
    pub fn can_transition_to(&self, next: RunState) -> bool {
        match (self, next) {
            (Self::Init, Self::Fetching)
            | (Self::Fetching, Self::Checking)
            | (Self::Checking, Self::Aggregating)
            | (Self::Aggregating, Self::Done) => true,
            (current, Self::Failed) => !current.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Fetching => "fetching",
            Self::Checking => "checking",
            Self::Aggregating => "aggregating",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current state of a run plus the states it has visited
#[derive(Debug, Clone)]
pub struct RunTracker {
    current: RunState,
    history: Vec<RunState>,
}

impl RunTracker {
    pub fn new() -> Self {
        Self {
            current: RunState::Init,
            history: vec![RunState::Init],
        }
    }

    pub fn current(&self) -> RunState {
        self.current
    }

    /// States visited so far, oldest first
    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    /// Moves to `next`, rejecting transitions the run lifecycle forbids
    pub fn advance(&mut self, next: RunState) -> Result<(), AuditError> {
        if !self.current.can_transition_to(next) {
            return Err(AuditError::InvalidTransition {
                from: self.current,
                to: next,
            });
        }

        tracing::debug!("Run state {} -> {}", self.current, next);
        self.current = next;
        self.history.push(next);
        Ok(())
    }
}

impl Default for RunTracker {
    fn default() -> Self {
        Self::new()
    }
}
