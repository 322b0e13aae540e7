//! Retry orchestration
//!
//! Runs an async operation, asks the predicate whether each outcome should be retried,
//! asks the stop condition whether to give up, and sleeps for whatever the wait
//! strategy computes. The last failure is returned unchanged when retries run out.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use super::predicate::RetryPredicate;
use super::stop::StopCondition;
use super::wait::WaitStrategy;
use crate::outcome::{AttemptContext, AttemptOutcome};

/// Hook invoked right before sleeping, with the failed attempt's context and the delay
pub type BeforeSleep = Arc<dyn Fn(&AttemptContext, Duration) + Send + Sync>;

/// Composes a retry predicate, a wait strategy and a stop condition
///
/// Holds no per-call state, so one instance can drive any number of independent
/// (including concurrent) call sequences.
#[derive(Clone)]
pub struct Retrying<P, W, S> {
    predicate: P,
    wait: W,
    stop: S,
    before_sleep: Option<BeforeSleep>,
}

impl<P, W, S> Retrying<P, W, S> {
    pub fn new(predicate: P, wait: W, stop: S) -> Self {
        Self {
            predicate,
            wait,
            stop,
            before_sleep: None,
        }
    }

    /// Register a hook called before every sleep
    pub fn before_sleep<H>(mut self, hook: H) -> Self
    where
        H: Fn(&AttemptContext, Duration) + Send + Sync + 'static,
    {
        self.before_sleep = Some(Arc::new(hook));
        self
    }

    pub fn predicate(&self) -> &P {
        &self.predicate
    }

    pub fn stop(&self) -> &S {
        &self.stop
    }

    /// Run `op` until it produces an outcome that should not be retried, or until the
    /// stop condition fires
    pub async fn call<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        P: RetryPredicate<T, E>,
        W: WaitStrategy<T, E>,
        S: StopCondition,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let start = Instant::now();
        let mut idle_for = Duration::ZERO;
        let mut attempt_number: u32 = 0;

        loop {
            attempt_number = attempt_number.saturating_add(1);
            let outcome = AttemptOutcome::from(op().await);
            let ctx = AttemptContext::new(attempt_number)
                .with_elapsed(start.elapsed())
                .with_idle_for(idle_for);

            if !self.predicate.should_retry(&outcome) {
                return outcome.into_result();
            }

            if self.stop.should_stop(&ctx) {
                warn!(
                    attempts = attempt_number,
                    ?idle_for,
                    "Giving up after retryable failure"
                );
                return outcome.into_result();
            }

            let delay = self.wait.compute(&outcome, &ctx);
            debug!(attempt = attempt_number, ?delay, "Retrying after backoff");

            if let Some(hook) = &self.before_sleep {
                hook(&ctx, delay);
            }

            tokio::time::sleep(delay).await;
            idle_for = idle_for.saturating_add(delay);
        }
    }
}

impl<P: fmt::Debug, W: fmt::Debug, S: fmt::Debug> fmt::Debug for Retrying<P, W, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrying")
            .field("predicate", &self.predicate)
            .field("wait", &self.wait)
            .field("stop", &self.stop)
            .field("before_sleep", &self.before_sleep.is_some())
            .finish()
    }
}
