//! Predicates deciding whether an attempt should be retried

use crate::http::AsHttpResponse;
use crate::outcome::AttemptOutcome;

/// HTTP status for Too Many Requests (RFC 6585 § 4)
pub const TOO_MANY_REQUESTS: u16 = 429;

/// Determines whether or not an attempt should be retried.
///
/// Implementations must not panic on any outcome: a failing predicate would abort
/// the whole retry loop.
pub trait RetryPredicate<T, E> {
    /// Returns `true` if the attempt should be retried.
    fn should_retry(&self, outcome: &AttemptOutcome<T, E>) -> bool;
}

/// Retries failures carrying an HTTP 429 response
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryIfHttp429;

impl<T, E: AsHttpResponse> RetryPredicate<T, E> for RetryIfHttp429 {
    fn should_retry(&self, outcome: &AttemptOutcome<T, E>) -> bool {
        outcome
            .error()
            .and_then(|err| err.as_http_response())
            .is_some_and(|response| response.status_code() == TOO_MANY_REQUESTS)
    }
}

/// Retries failures carrying an HTTP response with one of the given statuses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryIfStatus {
    statuses: Vec<u16>,
}

impl RetryIfStatus {
    pub fn new(statuses: impl IntoIterator<Item = u16>) -> Self {
        Self {
            statuses: statuses.into_iter().collect(),
        }
    }

    pub fn statuses(&self) -> &[u16] {
        &self.statuses
    }
}

impl Default for RetryIfStatus {
    fn default() -> Self {
        Self::new([TOO_MANY_REQUESTS])
    }
}

impl<T, E: AsHttpResponse> RetryPredicate<T, E> for RetryIfStatus {
    fn should_retry(&self, outcome: &AttemptOutcome<T, E>) -> bool {
        outcome
            .error()
            .and_then(|err| err.as_http_response())
            .is_some_and(|response| self.statuses.contains(&response.status_code()))
    }
}

/// Retries failures matching a caller-supplied check; successes are never retried
#[derive(Debug, Clone, Copy)]
pub struct RetryIf<F> {
    check: F,
}

impl<F> RetryIf<F> {
    pub fn new(check: F) -> Self {
        Self { check }
    }
}

impl<T, E, F> RetryPredicate<T, E> for RetryIf<F>
where
    F: Fn(&E) -> bool,
{
    fn should_retry(&self, outcome: &AttemptOutcome<T, E>) -> bool {
        outcome.error().is_some_and(|err| (self.check)(err))
    }
}

/// Never retries
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryNever;

impl<T, E> RetryPredicate<T, E> for RetryNever {
    fn should_retry(&self, _outcome: &AttemptOutcome<T, E>) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchError, HttpStatusError};
    use reqwest::header::HeaderMap;
    use reqwest::StatusCode;

    fn http_failure(status: u16) -> AttemptOutcome<(), FetchError> {
        AttemptOutcome::failure(FetchError::Status(HttpStatusError::new(
            "http://localhost/",
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
        )))
    }

    #[test]
    fn test_success_is_not_retried() {
        let outcome: AttemptOutcome<&str, FetchError> = AttemptOutcome::success("body");
        assert!(!RetryIfHttp429.should_retry(&outcome));
    }

    #[test]
    fn test_429_is_retried() {
        assert!(RetryIfHttp429.should_retry(&http_failure(429)));
    }

    #[test]
    fn test_other_statuses_are_not_retried() {
        for status in [400, 404, 500, 503] {
            assert!(
                !RetryIfHttp429.should_retry(&http_failure(status)),
                "status {status} should not be retried"
            );
        }
    }

    #[test]
    fn test_failure_without_response_is_not_retried() {
        let outcome: AttemptOutcome<(), anyhow::Error> =
            AttemptOutcome::failure(anyhow::anyhow!("connection reset by peer"));
        assert!(!RetryIfHttp429.should_retry(&outcome));
    }

    #[test]
    fn test_anyhow_wrapped_429_is_retried() {
        let outcome: AttemptOutcome<(), anyhow::Error> =
            AttemptOutcome::failure(anyhow::Error::new(HttpStatusError::new(
                "http://localhost/",
                StatusCode::TOO_MANY_REQUESTS,
                HeaderMap::new(),
            )));
        assert!(RetryIfHttp429.should_retry(&outcome));
    }

    #[test]
    fn test_status_set() {
        let predicate = RetryIfStatus::new([429, 503]);
        assert!(predicate.should_retry(&http_failure(429)));
        assert!(predicate.should_retry(&http_failure(503)));
        assert!(!predicate.should_retry(&http_failure(500)));
        assert_eq!(RetryIfStatus::default().statuses(), &[429]);
    }

    #[test]
    fn test_retry_if_only_sees_failures() {
        let predicate = RetryIf::new(|err: &String| err.contains("transient"));
        let transient: AttemptOutcome<u8, String> = AttemptOutcome::failure("transient".into());
        let fatal: AttemptOutcome<u8, String> = AttemptOutcome::failure("fatal".into());
        let ok: AttemptOutcome<u8, String> = AttemptOutcome::success(1);

        assert!(predicate.should_retry(&transient));
        assert!(!predicate.should_retry(&fatal));
        assert!(!predicate.should_retry(&ok));
        assert!(!RetryNever.should_retry(&transient));
    }
}
