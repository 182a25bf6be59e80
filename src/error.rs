//! Error types for gridscale API calls.
//!
//! Every failure the client produces is an [`Error`]. Besides the human
//! readable message, each error exposes its [`ErrorCategory`], the HTTP
//! status (0 when no response was involved) and the server-assigned request
//! UUID, so callers can branch on outcomes without parsing strings.

use http::{HeaderMap, StatusCode};

/// Broad classification of an [`Error`].
///
/// # Examples
///
/// ```no_run
/// use gsclient::{Client, Context, ErrorCategory};
///
/// # async fn example(client: Client, id: &str) -> Result<(), gsclient::Error> {
/// let ctx = Context::background();
/// match client.ips().delete(&ctx, id).await {
///     Ok(()) => {}
///     // Deleting something that is already gone is fine.
///     Err(e) if e.is_not_found() => {}
///     Err(e) if e.category() == ErrorCategory::Timeout => eprintln!("gave up waiting: {e}"),
///     Err(e) => return Err(e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The request never produced an HTTP response (connection, TLS, DNS, read failures).
    Transport,
    /// The server answered with a 3xx or 4xx status.
    HttpClient,
    /// The server answered with a 5xx status, or reported an asynchronous request as failed.
    HttpServer,
    /// A deadline passed or the context was cancelled.
    Timeout,
    /// A success response could not be decoded.
    Decode,
    /// An argument was rejected before any I/O happened.
    Validation,
}

/// The main error type for gridscale API calls.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An argument was rejected before the request was sent (malformed UUID, empty id, ...).
    #[error("invalid argument: {0}")]
    Validation(String),

    /// The client or a request was configured with invalid values.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request body could not be encoded as JSON.
    #[error("failed to serialize request: {0}")]
    Serialization(String),

    /// A network-level failure (connection refused, TLS, DNS, body read).
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server returned a non-2xx status.
    ///
    /// `title` and `description` come from the JSON error body when the
    /// server sent one; otherwise `description` holds the raw body.
    #[error(
        "status code: {}, error: {title}, description: {description}, request UUID: {}",
        .status.as_u16(),
        .request_uuid.as_deref().unwrap_or("-")
    )]
    Http {
        /// The HTTP status code
        status: StatusCode,
        /// Error title reported by the server
        title: String,
        /// Error description reported by the server
        description: String,
        /// Value of the request-id response header
        request_uuid: Option<String>,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: Box<HeaderMap>,
        /// Rate limit information parsed from headers
        rate_limit_info: Option<crate::rate_limit::RateLimitInfo>,
    },

    /// A success response body was not the expected JSON.
    #[error("failed to decode response from {url} (status {}): {serde_error}; body starts with: {body_prefix:?}", .status.as_u16())]
    Decode {
        /// The URL the response came from
        url: String,
        /// The HTTP status code
        status: StatusCode,
        /// The serde error message
        serde_error: String,
        /// The first characters of the body
        body_prefix: String,
        /// Value of the request-id response header
        request_uuid: Option<String>,
    },

    /// Every allowed attempt failed with a retryable error.
    #[error("Maximum number of trials has been exhausted with error: {last_error}")]
    MaxRetriesExceeded {
        /// The number of attempts made
        attempts: usize,
        /// The last error encountered
        last_error: Box<Error>,
    },

    /// The server reported that an asynchronous request failed.
    #[error("request {request_uuid} failed with status {status:?}")]
    RequestFailed {
        /// The request that failed
        request_uuid: String,
        /// The status the server reported
        status: String,
    },

    /// A deadline passed while waiting; the message names what was waited for.
    #[error("timeout: {0}")]
    Timeout(String),

    /// The context was cancelled.
    #[error("context cancelled")]
    Cancelled,
}

impl Error {
    /// Returns the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Validation(_) | Error::Configuration(_) | Error::Serialization(_) => {
                ErrorCategory::Validation
            }
            Error::Transport(_) => ErrorCategory::Transport,
            Error::Http { status, .. } => {
                if status.is_server_error() {
                    ErrorCategory::HttpServer
                } else {
                    ErrorCategory::HttpClient
                }
            }
            Error::Decode { .. } => ErrorCategory::Decode,
            Error::MaxRetriesExceeded { last_error, .. } => last_error.category(),
            Error::RequestFailed { .. } => ErrorCategory::HttpServer,
            Error::Timeout(_) | Error::Cancelled => ErrorCategory::Timeout,
        }
    }

    /// Returns the HTTP status code, or 0 when no HTTP response is involved.
    pub fn status_code(&self) -> u16 {
        self.status().map(|s| s.as_u16()).unwrap_or(0)
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Http { status, .. } => Some(*status),
            Error::Decode { status, .. } => Some(*status),
            Error::MaxRetriesExceeded { last_error, .. } => last_error.status(),
            _ => None,
        }
    }

    /// Returns the server-assigned request UUID, when the server sent one.
    pub fn request_uuid(&self) -> Option<&str> {
        match self {
            Error::Http { request_uuid, .. } => request_uuid.as_deref(),
            Error::Decode { request_uuid, .. } => request_uuid.as_deref(),
            Error::MaxRetriesExceeded { last_error, .. } => last_error.request_uuid(),
            Error::RequestFailed { request_uuid, .. } => Some(request_uuid),
            _ => None,
        }
    }

    /// Returns the error title reported by the server, if any.
    pub fn title(&self) -> Option<&str> {
        match self {
            Error::Http { title, .. } => Some(title),
            Error::MaxRetriesExceeded { last_error, .. } => last_error.title(),
            _ => None,
        }
    }

    /// Returns a human readable description of the failure.
    ///
    /// For HTTP errors this is the server's description; for exhausted
    /// retries it says so and includes the last underlying error.
    pub fn description(&self) -> String {
        match self {
            Error::Http { description, .. } => description.clone(),
            other => other.to_string(),
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Http { raw_response, .. } => Some(raw_response),
            Error::Decode { body_prefix, .. } => Some(body_prefix),
            Error::MaxRetriesExceeded { last_error, .. } => last_error.raw_response(),
            _ => None,
        }
    }

    /// Returns `true` if the server answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Returns `true` if the failed attempt may succeed when repeated.
    ///
    /// Transport failures and 5xx responses are retryable. A 429 is
    /// retryable only when rate-limit information was captured, which
    /// happens when rate-limit handling is enabled.
    ///
    /// # Examples
    ///
    /// ```
    /// use gsclient::Error;
    /// use http::StatusCode;
    ///
    /// let err = Error::Http {
    ///     status: StatusCode::BAD_GATEWAY,
    ///     title: "Bad Gateway".to_string(),
    ///     description: String::new(),
    ///     request_uuid: None,
    ///     raw_response: String::new(),
    ///     headers: Box::default(),
    ///     rate_limit_info: None,
    /// };
    /// assert!(err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(_) => true,
            Error::Http {
                status,
                rate_limit_info,
                ..
            } => {
                status.is_server_error()
                    || (*status == StatusCode::TOO_MANY_REQUESTS && rate_limit_info.is_some())
            }
            _ => false,
        }
    }

    /// Returns rate limit information if available.
    pub fn rate_limit_info(&self) -> Option<&crate::rate_limit::RateLimitInfo> {
        match self {
            Error::Http {
                rate_limit_info, ..
            } => rate_limit_info.as_ref(),
            _ => None,
        }
    }

    /// Returns the recommended delay from rate limit information, capped by `max_wait`.
    pub fn rate_limit_delay(
        &self,
        max_wait: std::time::Duration,
    ) -> Option<std::time::Duration> {
        self.rate_limit_info()?.delay(max_wait)
    }

    pub(crate) fn http(
        status: StatusCode,
        raw_response: String,
        headers: HeaderMap,
        request_uuid: Option<String>,
        rate_limit_info: Option<crate::rate_limit::RateLimitInfo>,
    ) -> Self {
        #[derive(serde::Deserialize)]
        struct ErrorBody {
            #[serde(default)]
            title: String,
            #[serde(default)]
            description: String,
        }

        let (title, description) = match serde_json::from_str::<ErrorBody>(&raw_response) {
            Ok(body) => (body.title, body.description),
            Err(_) => (
                status.canonical_reason().unwrap_or_default().to_string(),
                raw_response.clone(),
            ),
        };

        Error::Http {
            status,
            title,
            description,
            request_uuid,
            raw_response,
            headers: Box::new(headers),
            rate_limit_info,
        }
    }
}

/// A specialized `Result` type for gridscale API calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn http_error(status: u16, body: &str) -> Error {
        Error::http(
            StatusCode::from_u16(status).unwrap(),
            body.to_string(),
            HeaderMap::new(),
            Some("a1b2".to_string()),
            None,
        )
    }

    #[test]
    fn test_http_error_parses_title_and_description() {
        let err = http_error(400, r#"{"title":"Bad","description":"nope"}"#);
        assert_eq!(err.category(), ErrorCategory::HttpClient);
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.title(), Some("Bad"));
        assert_eq!(err.description(), "nope");
        assert_eq!(err.request_uuid(), Some("a1b2"));

        let message = err.to_string();
        assert!(message.contains("400"));
        assert!(message.contains("nope"));
    }

    #[test]
    fn test_http_error_with_non_json_body() {
        let err = http_error(502, "upstream down");
        assert_eq!(err.category(), ErrorCategory::HttpServer);
        assert_eq!(err.title(), Some("Bad Gateway"));
        assert_eq!(err.description(), "upstream down");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_redirect_is_client_category() {
        let err = http_error(302, "");
        assert_eq!(err.category(), ErrorCategory::HttpClient);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_exhausted_retries_delegate_to_last_error() {
        let err = Error::MaxRetriesExceeded {
            attempts: 6,
            last_error: Box::new(http_error(503, r#"{"title":"Unavailable","description":"later"}"#)),
        };
        assert_eq!(err.category(), ErrorCategory::HttpServer);
        assert_eq!(err.status_code(), 503);
        assert_eq!(err.request_uuid(), Some("a1b2"));
        assert!(err
            .description()
            .starts_with("Maximum number of trials has been exhausted with error:"));
    }

    #[test]
    fn test_non_http_errors() {
        assert_eq!(Error::Cancelled.category(), ErrorCategory::Timeout);
        assert_eq!(Error::Cancelled.status_code(), 0);
        assert_eq!(
            Error::Serialization("bad".into()).category(),
            ErrorCategory::Validation
        );
        let failed = Error::RequestFailed {
            request_uuid: "r1".into(),
            status: "failed".into(),
        };
        assert_eq!(failed.category(), ErrorCategory::HttpServer);
        assert_eq!(failed.request_uuid(), Some("r1"));
    }

    #[test]
    fn test_too_many_requests_needs_rate_limit_info() {
        let err = http_error(429, "slow down");
        assert!(!err.is_retryable());
    }
}
