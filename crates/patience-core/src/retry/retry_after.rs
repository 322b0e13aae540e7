//! Wait strategy honoring the `Retry-After` response header
//!
//! See RFC 6585 § 4 and RFC 9110 § 10.2.3. A missing or malformed header is never an
//! error: the configured fallback strategy decides the delay instead.

use std::time::{Duration, SystemTime};

use tracing::debug;

use super::wait::WaitStrategy;
use crate::http::{AsHttpResponse, HttpResponseLike};
use crate::outcome::{AttemptContext, AttemptOutcome};

const RETRY_AFTER: &str = "Retry-After";

/// Parse a `Retry-After` value given as a non-negative count of seconds
///
/// Surrounding whitespace is ignored. Signs, fractions and anything that does not
/// fit in a `u64` are rejected.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<u64>().ok().map(Duration::from_secs)
}

/// Parse the HTTP-date form, returning the time left until that date
fn parse_retry_after_date(value: &str, now: SystemTime) -> Option<Duration> {
    let at = httpdate::parse_http_date(value.trim()).ok()?;
    Some(at.duration_since(now).unwrap_or(Duration::ZERO))
}

/// Waits for the server's `Retry-After` hint, or for `fallback` when there is none
#[derive(Debug, Clone)]
pub struct WaitRetryAfter<F> {
    fallback: F,
    max_wait: Option<Duration>,
    http_dates: bool,
}

impl<F> WaitRetryAfter<F> {
    pub fn new(fallback: F) -> Self {
        Self {
            fallback,
            max_wait: None,
            http_dates: false,
        }
    }

    /// Cap server-supplied delays. The fallback's delays are left untouched.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Also accept the HTTP-date form of `Retry-After`
    pub fn with_http_dates(mut self, enabled: bool) -> Self {
        self.http_dates = enabled;
        self
    }

    fn hinted_delay(&self, response: &dyn HttpResponseLike, now: SystemTime) -> Option<Duration> {
        let value = response.header(RETRY_AFTER)?;

        let delay = parse_retry_after(value).or_else(|| {
            self.http_dates
                .then(|| parse_retry_after_date(value, now))
                .flatten()
        });

        if delay.is_none() {
            debug!("Ignoring unparseable Retry-After value {:?}", value);
        }

        delay.map(|delay| match self.max_wait {
            Some(max_wait) => delay.min(max_wait),
            None => delay,
        })
    }
}

impl<T, E, F> WaitStrategy<T, E> for WaitRetryAfter<F>
where
    E: AsHttpResponse,
    F: WaitStrategy<T, E>,
{
    fn compute(&self, outcome: &AttemptOutcome<T, E>, ctx: &AttemptContext) -> Duration {
        let hinted = outcome
            .error()
            .and_then(|err| err.as_http_response())
            .and_then(|response| self.hinted_delay(response, SystemTime::now()));

        match hinted {
            Some(delay) => {
                debug!(
                    attempt = ctx.attempt_number,
                    ?delay,
                    "Waiting as requested by Retry-After"
                );
                delay
            }
            None => {
                let delay = self.fallback.compute(outcome, ctx);
                debug!(
                    attempt = ctx.attempt_number,
                    ?delay,
                    "No usable Retry-After, using fallback wait"
                );
                delay
            }
        }
    }
}
