//! Per-invocation deadline and cancellation scope.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// What the caller brings to an invocation: a cancellation token tied to
/// its own lifetime and, optionally, the instant its own budget runs out.
#[derive(Debug, Clone, Default)]
pub struct ParentScope {
    pub cancel: CancellationToken,
    pub deadline: Option<Instant>,
}

impl ParentScope {
    pub fn new(cancel: CancellationToken, deadline: Option<Instant>) -> Self {
        Self { cancel, deadline }
    }
}

/// Cancellable deadline owned by exactly one command execution.
///
/// The token is a child of the parent's token, so cancelling the parent
/// cancels this context but not the other way round. Dropping the context
/// cancels its token.
#[derive(Debug)]
pub struct ExecutionContext {
    token: CancellationToken,
    deadline: Instant,
}

impl ExecutionContext {
    /// Derive a context whose deadline is the earlier of the parent's
    /// deadline and `now + cap`.
    pub fn derive(parent: &ParentScope, cap: Duration) -> Self {
        let capped = Instant::now() + cap;
        let deadline = match parent.deadline {
            Some(parent_deadline) => parent_deadline.min(capped),
            None => capped,
        };
        Self {
            token: parent.cancel.child_token(),
            deadline,
        }
    }

    #[cfg(test)]
    fn deadline(&self) -> Instant {
        self.deadline
    }

    /// `true` once the deadline has passed.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// `true` once the parent (or this context) has been cancelled.
    #[cfg(test)]
    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves when the deadline passes.
    pub async fn expired(&self) {
        tokio::time::sleep_until(self.deadline).await;
    }

    /// Resolves when the context is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}

impl Drop for ExecutionContext {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
