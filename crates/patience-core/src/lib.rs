//! Core library for patience
//!
//! - Retry predicates and wait strategies for HTTP 429 (Too Many Requests)
//! - `Retry-After` aware waiting with a pluggable fallback
//! - A small async retry orchestrator
//! - reqwest fetch helper and TOML configuration

pub mod config;
pub mod fetch;
pub mod http;
pub mod outcome;
pub mod retry;

pub use config::{ConfigError, ConfiguredRetrying, FallbackConfig, RetryConfig};
pub use fetch::{fetch_url, FetchError, HttpStatusError};
pub use http::{AsHttpResponse, HttpResponseLike};
pub use outcome::{AttemptContext, AttemptOutcome};
pub use retry::{
    FallbackWait, RetryIf, RetryIfHttp429, RetryIfStatus, RetryNever, RetryPredicate, Retrying,
    StopAfterAttempt, StopAfterDelay, StopCondition, StopNever, WaitExponential, WaitFixed,
    WaitRandom, WaitRetryAfter, WaitStrategy,
};
