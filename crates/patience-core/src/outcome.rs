//! Attempt outcomes and the timing context that travels with them

use std::time::Duration;

/// Result of a single attempt: either the produced value or the failure.
///
/// Created fresh by the orchestrator for every attempt and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptOutcome<T, E> {
    result: Result<T, E>,
}

impl<T, E> AttemptOutcome<T, E> {
    pub fn success(value: T) -> Self {
        Self { result: Ok(value) }
    }

    pub fn failure(error: E) -> Self {
        Self { result: Err(error) }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn is_failure(&self) -> bool {
        self.result.is_err()
    }

    /// The produced value, if the attempt succeeded
    pub fn value(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    /// The failure payload, if the attempt failed
    pub fn error(&self) -> Option<&E> {
        self.result.as_ref().err()
    }

    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

impl<T, E> From<Result<T, E>> for AttemptOutcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        Self { result }
    }
}

/// Counting and timing state for the attempt that just finished
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttemptContext {
    /// 1-based number of the attempt that produced the outcome
    pub attempt_number: u32,
    /// Time since the first attempt started
    pub elapsed: Duration,
    /// Total time spent sleeping between attempts so far
    pub idle_for: Duration,
}

impl AttemptContext {
    pub fn new(attempt_number: u32) -> Self {
        Self {
            attempt_number,
            ..Self::default()
        }
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn with_idle_for(mut self, idle_for: Duration) -> Self {
        self.idle_for = idle_for;
        self
    }
}
