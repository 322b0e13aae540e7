//! Wait strategies: how long to sleep before the next attempt

use std::time::Duration;

use rand::Rng;

use crate::outcome::{AttemptContext, AttemptOutcome};

/// Computes the delay before the next attempt.
///
/// Strategies receive the outcome of the attempt that just finished together with
/// its counting/timing context. They only compute a value; sleeping is the
/// orchestrator's job.
pub trait WaitStrategy<T, E> {
    fn compute(&self, outcome: &AttemptOutcome<T, E>, ctx: &AttemptContext) -> Duration;
}

/// Always waits the same amount of time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitFixed(pub Duration);

impl WaitFixed {
    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }
}

impl<T, E> WaitStrategy<T, E> for WaitFixed {
    fn compute(&self, _outcome: &AttemptOutcome<T, E>, _ctx: &AttemptContext) -> Duration {
        self.0
    }
}

/// Exponential backoff driven by the attempt number.
///
/// The first attempt waits `min`, each following one multiplies the delay by
/// `multiplier`, and the result never leaves `[min, max]`. With jitter enabled the
/// delay `D` is drawn uniformly from `[D/2, D]` before clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitExponential {
    min: Duration,
    max: Duration,
    multiplier: f64,
    jitter: bool,
}

impl WaitExponential {
    /// Doubling backoff between `min` and `max`, without jitter
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
            multiplier: 2.0,
            jitter: false,
        }
    }

    /// Sets the growth factor; values below 1.0 are treated as 1.0
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = if multiplier.is_finite() {
            multiplier.max(1.0)
        } else {
            1.0
        };
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    fn backoff_for(&self, attempt_number: u32) -> Duration {
        let exponent = attempt_number.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.min.as_secs_f64() * self.multiplier.powi(exponent);

        // Overflowing float math saturates at the upper bound
        let backoff = if secs.is_finite() && secs < self.max.as_secs_f64() {
            Duration::from_secs_f64(secs)
        } else {
            self.max
        };

        let backoff = if self.jitter && !backoff.is_zero() {
            rand::thread_rng().gen_range(backoff / 2..=backoff)
        } else {
            backoff
        };

        backoff.clamp(self.min, self.max)
    }
}

impl<T, E> WaitStrategy<T, E> for WaitExponential {
    fn compute(&self, _outcome: &AttemptOutcome<T, E>, ctx: &AttemptContext) -> Duration {
        self.backoff_for(ctx.attempt_number)
    }
}

/// Waits a uniformly random duration between `min` and `max`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitRandom {
    min: Duration,
    max: Duration,
}

impl WaitRandom {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }
}

impl<T, E> WaitStrategy<T, E> for WaitRandom {
    fn compute(&self, _outcome: &AttemptOutcome<T, E>, _ctx: &AttemptContext) -> Duration {
        rand::thread_rng().gen_range(self.min..=self.max)
    }
}

/// One of the built-in strategies, selected at runtime (e.g. from config)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FallbackWait {
    Fixed(WaitFixed),
    Exponential(WaitExponential),
    Random(WaitRandom),
}

impl Default for FallbackWait {
    fn default() -> Self {
        FallbackWait::Fixed(WaitFixed::from_secs(1))
    }
}

impl<T, E> WaitStrategy<T, E> for FallbackWait {
    fn compute(&self, outcome: &AttemptOutcome<T, E>, ctx: &AttemptContext) -> Duration {
        match self {
            FallbackWait::Fixed(wait) => wait.compute(outcome, ctx),
            FallbackWait::Exponential(wait) => wait.compute(outcome, ctx),
            FallbackWait::Random(wait) => wait.compute(outcome, ctx),
        }
    }
}
