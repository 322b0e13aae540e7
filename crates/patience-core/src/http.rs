//! HTTP response capabilities inspected by the retry components
//!
//! Failures are not required to carry an HTTP response. [`AsHttpResponse`] is the
//! typed accessor used to ask for one; `None` is the ordinary answer for transport
//! errors and anything else that never reached a server.

use reqwest::header::HeaderMap;

use crate::fetch::{FetchError, HttpStatusError};

/// Anything exposing a numeric status code and header lookup
pub trait HttpResponseLike {
    /// Numeric HTTP status code
    fn status_code(&self) -> u16;

    /// Header value by name, matched case-insensitively
    ///
    /// Values that are not visible ASCII are reported as absent.
    fn header(&self, name: &str) -> Option<&str>;
}

/// Extract an HTTP response from a failure payload, if it carries one
pub trait AsHttpResponse {
    fn as_http_response(&self) -> Option<&dyn HttpResponseLike>;
}

pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

impl HttpResponseLike for reqwest::Response {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }

    fn header(&self, name: &str) -> Option<&str> {
        header_str(self.headers(), name)
    }
}

impl AsHttpResponse for anyhow::Error {
    fn as_http_response(&self) -> Option<&dyn HttpResponseLike> {
        // The response may sit anywhere in the source chain, not only at the top
        self.chain().find_map(|cause| {
            if let Some(err) = cause.downcast_ref::<FetchError>() {
                return err.as_http_response();
            }
            cause
                .downcast_ref::<HttpStatusError>()
                .map(|err| err as &dyn HttpResponseLike)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use reqwest::StatusCode;

    fn status_error(status: u16, headers: &[(&'static str, &str)]) -> HttpStatusError {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        HttpStatusError::new(
            "http://localhost/",
            StatusCode::from_u16(status).unwrap(),
            map,
        )
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let err = status_error(429, &[("retry-after", "30")]);
        assert_eq!(err.header("Retry-After"), Some("30"));
        assert_eq!(err.header("RETRY-AFTER"), Some("30"));
        assert_eq!(err.header("X-Missing"), None);
    }

    #[test]
    fn test_non_ascii_header_value_is_absent() {
        let mut map = HeaderMap::new();
        map.insert(
            "retry-after",
            HeaderValue::from_bytes(b"\xfa\xfb").unwrap(),
        );
        let err = HttpStatusError::new("http://localhost/", StatusCode::TOO_MANY_REQUESTS, map);
        assert_eq!(err.header("Retry-After"), None);
    }

    #[test]
    fn test_anyhow_downcasts_to_response() {
        let err = anyhow::Error::new(status_error(429, &[]));
        let response = err.as_http_response().expect("response attached");
        assert_eq!(response.status_code(), 429);

        let wrapped = anyhow::Error::new(FetchError::Status(status_error(503, &[])));
        assert_eq!(
            wrapped.as_http_response().map(|r| r.status_code()),
            Some(503)
        );

        let plain = anyhow::anyhow!("connection reset");
        assert!(plain.as_http_response().is_none());
    }

    #[derive(Debug, thiserror::Error)]
    enum AppError {
        #[error("upstream call failed")]
        Fetch(#[source] FetchError),
    }

    #[test]
    fn test_anyhow_finds_response_in_source_chain() {
        let nested = anyhow::Error::new(AppError::Fetch(FetchError::Status(status_error(
            429,
            &[("retry-after", "5")],
        ))));
        let response = nested.as_http_response().expect("response in source chain");
        assert_eq!(response.status_code(), 429);
        assert_eq!(response.header("Retry-After"), Some("5"));

        let with_context = anyhow::Error::new(status_error(429, &[])).context("fetching feed");
        assert_eq!(
            with_context.as_http_response().map(|r| r.status_code()),
            Some(429)
        );
    }
}
