//! The request engine.
//!
//! [`Client::execute`] turns a [`Request`] into one or more HTTP attempts:
//! it assembles the URL and headers, sends the request, retries transport
//! failures and 5xx answers, and decodes the body of a success.

use crate::config::Config;
use crate::request::Request;
use crate::{Context, Error, Response, Result};
use http::header::{CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Response header carrying the server-assigned request UUID.
pub const REQUEST_UUID_HEADER: &str = "x-request-id";

const AUTH_USER_HEADER: &str = "x-auth-userid";
const AUTH_TOKEN_HEADER: &str = "x-auth-token";
const BODY_PREFIX_LEN: usize = 200;

/// A gridscale API client.
///
/// Cheap to clone; clones share the configuration and connection pool.
///
/// # Examples
///
/// ```no_run
/// use gsclient::{Client, Config, Context};
///
/// # async fn example() -> Result<(), gsclient::Error> {
/// let client = Client::new(Config::from_env()?.sync(true).build()?);
/// let ctx = Context::background();
///
/// for location in client.locations().list(&ctx).await? {
///     println!("{} ({})", location.name, location.iata);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<Config>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").field("config", &self.inner).finish()
    }
}

/// A response whose body has been read but not decoded.
struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
    request_uuid: Option<String>,
}

impl Client {
    /// Creates a client from a finished configuration.
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(config),
        }
    }

    /// Creates a client with default settings for the given credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are empty.
    pub fn from_credentials(
        user_uuid: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Result<Self> {
        Config::from_credentials(user_uuid, api_token).map(Self::new)
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &Config {
        &self.inner
    }

    /// Sends `request` and decodes a success body as `T`.
    ///
    /// Transport failures and 5xx answers are retried as the configuration
    /// allows; when every attempt fails the result is
    /// [`Error::MaxRetriesExceeded`]. 3xx and 4xx answers fail at once.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gsclient::{Client, Context, request::Request};
    ///
    /// # async fn example(client: Client) -> Result<(), gsclient::Error> {
    /// let ctx = Context::background();
    /// let body: serde_json::Value = client
    ///     .execute(&ctx, Request::get("/objects/servers"))
    ///     .await?
    ///     .into_data();
    /// println!("{body}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute<T>(&self, ctx: &Context, request: Request) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.url_for(&request)?;
        let response = self.execute_discard(ctx, request).await?;

        match serde_json::from_str::<T>(&response.raw_body) {
            Ok(data) => Ok(response.map(|()| data)),
            Err(e) => {
                log_event!(
                    self.config(),
                    ERROR,
                    error = %e,
                    url = %url,
                    "failed to decode response"
                );
                Err(Error::Decode {
                    url: url.to_string(),
                    status: response.status,
                    serde_error: e.to_string(),
                    body_prefix: response.raw_body.chars().take(BODY_PREFIX_LEN).collect(),
                    request_uuid: response.request_uuid,
                })
            }
        }
    }

    /// Sends `request` like [`execute`](Self::execute) but ignores the body.
    pub async fn execute_discard(&self, ctx: &Context, request: Request) -> Result<Response<()>> {
        let start = Instant::now();
        let (raw, attempts) = self.send_with_retry(ctx, &request).await?;
        Ok(Response {
            data: (),
            raw_body: raw.body,
            status: raw.status,
            headers: raw.headers,
            request_uuid: raw.request_uuid,
            latency: start.elapsed(),
            attempts,
        })
    }

    async fn send_with_retry(&self, ctx: &Context, request: &Request) -> Result<(RawResponse, usize)> {
        let config = self.config();
        let url = self.url_for(request)?;
        let body = match &request.body {
            Some(value) => {
                Some(serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))?)
            }
            None => None,
        };

        let mut attempt = 0;
        loop {
            attempt += 1;

            let error = match self.send_once(ctx, request, &url, body.clone(), attempt).await {
                Ok(raw) => return Ok((raw, attempt)),
                Err(e @ (Error::Cancelled | Error::Timeout(_))) => return Err(e),
                Err(e) => e,
            };

            log_event!(
                config,
                WARN,
                error = %error,
                attempt,
                method = %request.method,
                uri = %request.uri,
                "request failed"
            );

            if !config.retry_predicate().should_retry(&error, attempt) {
                return Err(error);
            }

            let delay = self.retry_delay(&error, attempt);
            match delay {
                Some(delay) => {
                    log_event!(
                        config,
                        INFO,
                        delay_ms = delay.as_millis() as u64,
                        attempt,
                        "retrying request after delay"
                    );
                    ctx.sleep(delay).await?;
                }
                None => {
                    return Err(Error::MaxRetriesExceeded {
                        attempts: attempt,
                        last_error: Box::new(error),
                    })
                }
            }
        }
    }

    /// Rate-limit headers win over the strategy when handling is enabled,
    /// but the strategy still bounds the number of attempts.
    fn retry_delay(&self, error: &Error, attempt: usize) -> Option<Duration> {
        let config = self.config();
        let planned = config.retry_strategy().delay_for_attempt(attempt)?;
        let rate_limit = config.rate_limit();
        if !rate_limit.enabled {
            return Some(planned);
        }
        Some(error.rate_limit_delay(rate_limit.max_wait).unwrap_or(planned))
    }

    async fn send_once(
        &self,
        ctx: &Context,
        request: &Request,
        url: &Url,
        body: Option<Vec<u8>>,
        attempt: usize,
    ) -> Result<RawResponse> {
        let config = self.config();
        log_event!(
            config,
            DEBUG,
            method = %request.method,
            url = %url,
            attempt,
            "sending request"
        );

        let mut builder = config
            .http_client()
            .request(request.method.clone(), url.clone())
            .headers(self.request_headers()?);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let sent_at = Instant::now();
        let response = ctx.run(builder.send()).await?.map_err(Error::Transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        // The body is always drained so the connection can be reused.
        let bytes = ctx.run(response.bytes()).await?.map_err(Error::Transport)?;
        let body = String::from_utf8_lossy(&bytes).into_owned();
        let request_uuid = headers
            .get(REQUEST_UUID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        log_event!(
            config,
            DEBUG,
            status = status.as_u16(),
            latency_ms = sent_at.elapsed().as_millis() as u64,
            request_uuid = request_uuid.as_deref().unwrap_or("-"),
            "received response"
        );

        if status.is_success() {
            return Ok(RawResponse {
                status,
                headers,
                body,
                request_uuid,
            });
        }

        let rate_limit_info = if status == StatusCode::TOO_MANY_REQUESTS {
            config.rate_limit().inspect(&headers)
        } else {
            None
        };

        if status.is_client_error() {
            log_event!(config, ERROR, status = status.as_u16(), response = %body, "client error");
        } else if status.is_server_error() {
            log_event!(config, WARN, status = status.as_u16(), response = %body, "server error");
        }

        Err(Error::http(status, body, headers, request_uuid, rate_limit_info))
    }

    fn url_for(&self, request: &Request) -> Result<Url> {
        let base = self.config().api_url().as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}{}", request.uri))
            .map_err(|e| Error::Validation(format!("invalid request URI {:?}: {e}", request.uri)))?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Defaults first, then the caller's extra headers, then the
    /// credentials, so each authentication header appears exactly once.
    fn request_headers(&self) -> Result<HeaderMap> {
        let config = self.config();
        let invalid = |e: http::header::InvalidHeaderValue| {
            Error::Configuration(format!("invalid header value: {e}"))
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(config.user_agent()).map_err(invalid)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(config.extra_headers());

        headers.insert(
            HeaderName::from_static(AUTH_USER_HEADER),
            HeaderValue::from_str(config.user_uuid()).map_err(invalid)?,
        );
        let mut token = HeaderValue::from_str(config.api_token()).map_err(invalid)?;
        token.set_sensitive(true);
        headers.insert(HeaderName::from_static(AUTH_TOKEN_HEADER), token);
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        let config = Config::builder("user-1", "token-1")
            .api_url("http://localhost:8080/")
            .unwrap()
            .build()
            .unwrap();
        Client::new(config)
    }

    #[test]
    fn test_url_keeps_single_slash_and_query_order() {
        let request = Request::get("/objects/servers")
            .with_query_param("b", "2")
            .with_query_param("a", "1");
        let url = client().url_for(&request).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/objects/servers?b=2&a=1");
    }

    #[test]
    fn test_extra_headers_cannot_override_credentials() {
        let client = client();
        client.config().set_extra_header("X-Auth-Token", "forged").unwrap();
        client.config().set_extra_header("User-Agent", "custom/1.0").unwrap();
        client.config().set_extra_header("X-Trace", "t-1").unwrap();

        let headers = client.request_headers().unwrap();
        assert_eq!(headers.get_all(AUTH_TOKEN_HEADER).iter().count(), 1);
        assert_eq!(headers.get(AUTH_TOKEN_HEADER).unwrap(), "token-1");
        assert_eq!(headers.get_all(AUTH_USER_HEADER).iter().count(), 1);
        assert_eq!(headers.get(USER_AGENT).unwrap(), "custom/1.0");
        assert_eq!(headers.get("x-trace").unwrap(), "t-1");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_rate_limit_delay_is_ignored_when_disabled() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("30"));
        let info = crate::rate_limit::RateLimitInfo::from_headers(&headers);
        let error = Error::http(StatusCode::TOO_MANY_REQUESTS, String::new(), headers, None, Some(info));

        let delay = client().retry_delay(&error, 1);
        assert_eq!(delay, Some(Duration::from_secs(1)));
    }
}
