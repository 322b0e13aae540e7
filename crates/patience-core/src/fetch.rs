//! URL fetching that turns non-2xx responses into inspectable failures

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::http::{header_str, AsHttpResponse, HttpResponseLike};

/// A response with a non-success status, kept as a failure payload
#[derive(Debug, Error)]
#[error("HTTP {status} for {url}")]
pub struct HttpStatusError {
    url: String,
    status: StatusCode,
    headers: HeaderMap,
}

impl HttpStatusError {
    pub fn new(url: impl Into<String>, status: StatusCode, headers: HeaderMap) -> Self {
        Self {
            url: url.into(),
            status,
            headers,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl HttpResponseLike for HttpStatusError {
    fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    fn header(&self, name: &str) -> Option<&str> {
        header_str(&self.headers, name)
    }
}

impl AsHttpResponse for HttpStatusError {
    fn as_http_response(&self) -> Option<&dyn HttpResponseLike> {
        Some(self)
    }
}

/// Errors from [`fetch_url`]
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status
    #[error(transparent)]
    Status(#[from] HttpStatusError),

    /// The request never produced a response (DNS, connect, TLS, timeout...)
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl AsHttpResponse for FetchError {
    fn as_http_response(&self) -> Option<&dyn HttpResponseLike> {
        match self {
            FetchError::Status(err) => Some(err),
            FetchError::Transport(_) => None,
        }
    }
}

/// GET a URL, failing with [`FetchError::Status`] on any non-2xx response
pub async fn fetch_url(
    client: &reqwest::Client,
    url: &str,
) -> Result<reqwest::Response, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    debug!("GET {} -> {}", url, status);

    if status.is_success() {
        return Ok(response);
    }

    Err(HttpStatusError::new(url, status, response.headers().clone()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = HttpStatusError::new(
            "http://localhost/limited",
            StatusCode::TOO_MANY_REQUESTS,
            HeaderMap::new(),
        );
        assert_eq!(
            err.to_string(),
            "HTTP 429 Too Many Requests for http://localhost/limited"
        );
        assert_eq!(
            FetchError::from(err).to_string(),
            "HTTP 429 Too Many Requests for http://localhost/limited"
        );
    }

    #[test]
    fn test_status_variant_exposes_response() {
        let err = FetchError::Status(HttpStatusError::new(
            "http://localhost/",
            StatusCode::NOT_FOUND,
            HeaderMap::new(),
        ));
        assert_eq!(err.as_http_response().map(|r| r.status_code()), Some(404));
    }

    #[tokio::test]
    async fn test_transport_error_has_no_response() {
        // Grab a free port, then close it so the connection is refused
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = reqwest::Client::new();
        let err = fetch_url(&client, &format!("http://{addr}/"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
        assert!(err.as_http_response().is_none());
    }
}
