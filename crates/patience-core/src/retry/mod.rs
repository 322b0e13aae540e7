//! Retry decisions and wait strategies
//!
//! Provides the 429 predicate, the `Retry-After` aware wait strategy, fallback
//! backoff strategies, stop conditions, and the orchestrator that composes them.

mod predicate;
mod retry_after;
mod retrying;
mod stop;
mod wait;

pub use predicate::{RetryIf, RetryIfHttp429, RetryIfStatus, RetryNever, RetryPredicate};
pub use retry_after::{parse_retry_after, WaitRetryAfter};
pub use retrying::{BeforeSleep, Retrying};
pub use stop::{StopAfterAttempt, StopAfterDelay, StopCondition, StopNever};
pub use wait::{FallbackWait, WaitExponential, WaitFixed, WaitRandom, WaitStrategy};
