//! Stop conditions: when to give up and surface the last failure

use std::time::Duration;

use crate::outcome::AttemptContext;

/// Decides, after a retryable failure, whether to stop retrying
pub trait StopCondition {
    fn should_stop(&self, ctx: &AttemptContext) -> bool;
}

/// Stop once `n` attempts have been made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopAfterAttempt(pub u32);

impl StopCondition for StopAfterAttempt {
    fn should_stop(&self, ctx: &AttemptContext) -> bool {
        ctx.attempt_number >= self.0
    }
}

/// Stop once the time since the first attempt reaches the bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopAfterDelay(pub Duration);

impl StopCondition for StopAfterDelay {
    fn should_stop(&self, ctx: &AttemptContext) -> bool {
        ctx.elapsed >= self.0
    }
}

/// Retry forever
#[derive(Debug, Clone, Copy, Default)]
pub struct StopNever;

impl StopCondition for StopNever {
    fn should_stop(&self, _ctx: &AttemptContext) -> bool {
        false
    }
}
