//! Response wrapper that keeps the decoded data together with transport details.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A successful API response.
///
/// Besides the decoded body, it carries the server-assigned request UUID,
/// which the completion waiters use and which callers can log to correlate
/// with the provider's records.
///
/// # Examples
///
/// ```no_run
/// use gsclient::{Client, Context, request::Request};
///
/// # async fn example(client: Client) -> Result<(), gsclient::Error> {
/// let ctx = Context::background();
/// let response = client
///     .execute::<serde_json::Value>(&ctx, Request::get("/objects/locations"))
///     .await?;
///
/// println!("request {:?} took {:?}", response.request_uuid, response.latency);
/// if response.was_retried() {
///     println!("needed {} attempts", response.attempts);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The decoded response data.
    pub data: T,

    /// The raw response body.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Server-assigned request UUID, from the `X-Request-Id` header.
    pub request_uuid: Option<String>,

    /// Time from the first attempt until the successful response, retries included.
    pub latency: Duration,

    /// Number of attempts needed; `1` when the first one succeeded.
    pub attempts: usize,
}

impl<T> Response<T> {
    /// Replaces the data, keeping status, headers and timing.
    ///
    /// # Examples
    ///
    /// ```
    /// # use gsclient::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let accepted = Response {
    ///     data: (),
    ///     raw_body: r#"{"object_uuid":"690de890-13c0-4e76-8a01-e10ba8786e53"}"#.to_string(),
    ///     status: StatusCode::ACCEPTED,
    ///     headers: HeaderMap::new(),
    ///     request_uuid: Some("b4e6f0a2".to_string()),
    ///     latency: Duration::from_millis(80),
    ///     attempts: 1,
    /// };
    ///
    /// let body: serde_json::Value = serde_json::from_str(&accepted.raw_body).unwrap();
    /// let decoded = accepted.map(|()| body);
    /// assert_eq!(decoded.data["object_uuid"], "690de890-13c0-4e76-8a01-e10ba8786e53");
    /// assert_eq!(decoded.request_uuid.as_deref(), Some("b4e6f0a2"));
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            request_uuid: self.request_uuid,
            latency: self.latency,
            attempts: self.attempts,
        }
    }

    /// Returns `true` if the request required retries.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Consumes the response, returning only the data.
    pub fn into_data(self) -> T {
        self.data
    }
}
