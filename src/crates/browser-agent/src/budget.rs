//! Nested time budgets for an escalation.
//!
//! Three independent limits apply: each browser action, the browser session,
//! and the task as a whole. The task deadline is fixed when the budget starts;
//! inner limits are clamped to whatever task time remains, so the task
//! deadline always wins.

use crate::error::{AgentError, Result};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Which budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutScope {
    /// A single browser action or HTTP exchange.
    Action,
    /// The browser session.
    Session,
    /// The escalation as a whole.
    Task,
}

impl fmt::Display for TimeoutScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeoutScope::Action => write!(f, "Action"),
            TimeoutScope::Session => write!(f, "Session"),
            TimeoutScope::Task => write!(f, "Task"),
        }
    }
}

/// The three configured limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub action: Duration,
    pub session: Duration,
    pub task: Duration,
}

/// A running escalation's budget.
#[derive(Debug, Clone)]
pub struct EscalationBudget {
    timeouts: Timeouts,
    deadline: Instant,
}

impl EscalationBudget {
    /// Start the task clock now.
    pub fn start(timeouts: Timeouts) -> Self {
        Self {
            timeouts,
            deadline: Instant::now() + timeouts.task,
        }
    }

    /// Configured limits.
    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    /// Time left before the task deadline, `None` once it passed.
    pub fn remaining(&self) -> Option<Duration> {
        let now = Instant::now();
        if now >= self.deadline {
            None
        } else {
            Some(self.deadline.duration_since(now))
        }
    }

    /// Whether the task deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.remaining().is_none()
    }

    /// Effective limit for `scope` right now, and the scope that owns it.
    ///
    /// When less task time remains than the inner limit, the task is the
    /// binding constraint and gets reported as such.
    pub fn limit(&self, scope: TimeoutScope) -> (TimeoutScope, Duration) {
        let remaining = self.remaining().unwrap_or(Duration::ZERO);
        let inner = match scope {
            TimeoutScope::Action => self.timeouts.action,
            TimeoutScope::Session => self.timeouts.session,
            TimeoutScope::Task => return (TimeoutScope::Task, remaining),
        };
        if remaining < inner {
            (TimeoutScope::Task, remaining)
        } else {
            (scope, inner)
        }
    }

    /// Run `operation` under the limit for `scope`.
    pub async fn run<F, T>(&self, scope: TimeoutScope, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let (owner, limit) = self.limit(scope);
        if limit.is_zero() {
            return Err(AgentError::Timeout {
                scope: owner,
                after: self.configured(owner),
            });
        }
        match tokio::time::timeout(limit, operation).await {
            Ok(result) => result,
            Err(_elapsed) => Err(AgentError::Timeout {
                scope: owner,
                after: if owner == scope { limit } else { self.configured(owner) },
            }),
        }
    }

    fn configured(&self, scope: TimeoutScope) -> Duration {
        match scope {
            TimeoutScope::Action => self.timeouts.action,
            TimeoutScope::Session => self.timeouts.session,
            TimeoutScope::Task => self.timeouts.task,
        }
    }
}
