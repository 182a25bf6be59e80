//! Client configuration.
//!
//! A [`Config`] is immutable once built, except for the map of extra
//! headers, which callers may change at any time to affect all subsequent
//! requests.

use crate::rate_limit::RateLimitConfig;
use crate::retry::{RetryOnRetryable, RetryPredicate, RetryStrategy};
use crate::{Error, Result};
use http::{HeaderMap, HeaderName, HeaderValue};
use parking_lot::Mutex;
use std::fmt;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use url::Url;

/// Public API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.gridscale.io";
/// Retries after the first failed attempt.
pub const DEFAULT_MAX_NUMBER_OF_RETRIES: usize = 5;
/// Delay between retries and between polls.
pub const DEFAULT_DELAY_INTERVAL: Duration = Duration::from_secs(1);
/// Hard deadline for completion waits in sync mode.
pub const DEFAULT_REQUEST_CHECK_TIMEOUT: Duration = Duration::from_secs(600);

const ENV_USER_UUID: &str = "GRIDSCALE_UUID";
const ENV_API_TOKEN: &str = "GRIDSCALE_TOKEN";
const ENV_API_URL: &str = "GRIDSCALE_URL";

static DEFAULT_USER_AGENT: &str = concat!("gsclient-rs/", env!("CARGO_PKG_VERSION"));

/// Everything a [`Client`](crate::Client) needs to talk to the API.
///
/// # Examples
///
/// ```
/// use gsclient::Config;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), gsclient::Error> {
/// let config = Config::builder("user-uuid", "api-token")
///     .api_url("https://api.gridscale.io")?
///     .sync(true)
///     .delay_interval(Duration::from_millis(500))
///     .max_number_of_retries(3)
///     .build()?;
///
/// config.set_extra_header("X-Trace", "checkout-42")?;
/// assert!(config.sync());
/// # Ok(())
/// # }
/// ```
pub struct Config {
    api_url: Url,
    user_uuid: String,
    api_token: String,
    user_agent: String,
    sync: bool,
    http_client: reqwest::Client,
    max_number_of_retries: usize,
    delay_interval: Duration,
    request_check_timeout: Duration,
    retry_strategy: RetryStrategy,
    retry_predicate: Box<dyn RetryPredicate>,
    rate_limit: RateLimitConfig,
    log_level: LevelFilter,
    extra_headers: Mutex<HeaderMap>,
}

impl Config {
    /// Starts a builder with explicit credentials and default settings.
    pub fn builder(user_uuid: impl Into<String>, api_token: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(user_uuid.into(), api_token.into())
    }

    /// Returns a configuration with default settings for the given credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be initialised.
    pub fn from_credentials(
        user_uuid: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Result<Self> {
        Self::builder(user_uuid, api_token).build()
    }

    /// Reads credentials from `GRIDSCALE_UUID` and `GRIDSCALE_TOKEN`, and the
    /// API URL from `GRIDSCALE_URL` when set.
    ///
    /// The returned builder can be refined further before calling `build`.
    pub fn from_env() -> Result<ConfigBuilder> {
        let var = |name: &str| {
            std::env::var(name)
                .map_err(|_| Error::Configuration(format!("environment variable {name} is not set")))
        };
        let builder = Self::builder(var(ENV_USER_UUID)?, var(ENV_API_TOKEN)?);
        match std::env::var(ENV_API_URL) {
            Ok(url) if !url.is_empty() => builder.api_url(url),
            _ => Ok(builder),
        }
    }

    /// Base URL every request path is appended to.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Sent as `X-Auth-UserID`.
    pub fn user_uuid(&self) -> &str {
        &self.user_uuid
    }

    /// Sent as `X-Auth-Token`.
    pub(crate) fn api_token(&self) -> &str {
        &self.api_token
    }

    /// Sent as `User-Agent` unless an extra header overrides it.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Whether mutating calls wait until their effect is visible.
    pub fn sync(&self) -> bool {
        self.sync
    }

    /// Retries allowed after the first failed attempt of a request.
    pub fn max_number_of_retries(&self) -> usize {
        self.max_number_of_retries
    }

    /// Delay between retries and between completion polls.
    pub fn delay_interval(&self) -> Duration {
        self.delay_interval
    }

    /// Deadline for a completion wait.
    pub fn request_check_timeout(&self) -> Duration {
        self.request_check_timeout
    }

    /// Verbosity of the client's own log events.
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub(crate) fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    pub(crate) fn retry_strategy(&self) -> &RetryStrategy {
        &self.retry_strategy
    }

    pub(crate) fn retry_predicate(&self) -> &dyn RetryPredicate {
        self.retry_predicate.as_ref()
    }

    pub(crate) fn rate_limit(&self) -> &RateLimitConfig {
        &self.rate_limit
    }

    /// Adds or replaces a header sent with every subsequent request.
    ///
    /// Extra headers may override `User-Agent` and `Content-Type`, but never
    /// the authentication headers.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn set_extra_header(&self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<()> {
        let (name, value) = parse_header(name.as_ref(), value.as_ref())?;
        self.extra_headers.lock().insert(name, value);
        Ok(())
    }

    /// Removes a previously set extra header.
    pub fn remove_extra_header(&self, name: impl AsRef<str>) {
        if let Ok(name) = HeaderName::try_from(name.as_ref()) {
            self.extra_headers.lock().remove(name);
        }
    }

    /// Replaces all extra headers.
    pub fn replace_extra_headers(&self, headers: HeaderMap) {
        *self.extra_headers.lock() = headers;
    }

    /// Returns a snapshot of the extra headers.
    pub fn extra_headers(&self) -> HeaderMap {
        self.extra_headers.lock().clone()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url.as_str())
            .field("user_uuid", &self.user_uuid)
            .field("api_token", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("sync", &self.sync)
            .field("max_number_of_retries", &self.max_number_of_retries)
            .field("delay_interval", &self.delay_interval)
            .field("request_check_timeout", &self.request_check_timeout)
            .field("retry_strategy", &self.retry_strategy)
            .field("rate_limit", &self.rate_limit)
            .field("log_level", &self.log_level)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Config`].
pub struct ConfigBuilder {
    api_url: Option<Url>,
    user_uuid: String,
    api_token: String,
    user_agent: String,
    sync: bool,
    http_client: Option<reqwest::Client>,
    max_number_of_retries: usize,
    delay_interval: Duration,
    request_check_timeout: Duration,
    backoff: Option<(Duration, bool)>,
    retry_strategy: Option<RetryStrategy>,
    retry_predicate: Option<Box<dyn RetryPredicate>>,
    rate_limit: RateLimitConfig,
    log_level: LevelFilter,
    extra_headers: HeaderMap,
}

impl ConfigBuilder {
    fn new(user_uuid: String, api_token: String) -> Self {
        Self {
            api_url: None,
            user_uuid,
            api_token,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            sync: false,
            http_client: None,
            max_number_of_retries: DEFAULT_MAX_NUMBER_OF_RETRIES,
            delay_interval: DEFAULT_DELAY_INTERVAL,
            request_check_timeout: DEFAULT_REQUEST_CHECK_TIMEOUT,
            backoff: None,
            retry_strategy: None,
            retry_predicate: None,
            rate_limit: RateLimitConfig::default(),
            log_level: LevelFilter::ERROR,
            extra_headers: HeaderMap::new(),
        }
    }

    /// Sets the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or not absolute.
    pub fn api_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        let url = Url::parse(url.as_ref().trim_end_matches('/'))
            .map_err(|e| Error::Configuration(format!("invalid API URL: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "API URL {url} cannot be used as a base"
            )));
        }
        self.api_url = Some(url);
        Ok(self)
    }

    /// Sets the `User-Agent` header value.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Makes mutating calls block until their effect is visible.
    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Uses the given transport instead of a default one, e.g. to set
    /// timeouts or a proxy.
    ///
    /// The default transport does not follow redirects; a 3xx answer is
    /// reported as an error. A custom transport keeps its own policy.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets how many times a failed request is retried.
    pub fn max_number_of_retries(mut self, retries: usize) -> Self {
        self.max_number_of_retries = retries;
        self
    }

    /// Sets the delay between retries and between completion polls.
    pub fn delay_interval(mut self, delay: Duration) -> Self {
        self.delay_interval = delay;
        self
    }

    /// Sets the deadline for completion waits.
    pub fn request_check_timeout(mut self, timeout: Duration) -> Self {
        self.request_check_timeout = timeout;
        self
    }

    /// Doubles the retry delay after each failure, starting at the delay
    /// interval and capped at `max_delay`.
    pub fn exponential_backoff(mut self, max_delay: Duration, jitter: bool) -> Self {
        self.backoff = Some((max_delay, jitter));
        self
    }

    /// Replaces the retry spacing entirely. Overrides
    /// [`exponential_backoff`](Self::exponential_backoff), the delay interval
    /// and the retry count for request retries; completion polls still use
    /// the delay interval.
    pub fn retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.retry_strategy = Some(strategy);
        self
    }

    /// Sets which failures are retried.
    ///
    /// By default, requests are retried based on [`Error::is_retryable`].
    pub fn retry_predicate(mut self, predicate: Box<dyn RetryPredicate>) -> Self {
        self.retry_predicate = Some(predicate);
        self
    }

    /// Sets the rate limit configuration. Disabled by default.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    /// Sets the verbosity of the client's log events. Defaults to `ERROR`.
    pub fn log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }

    /// Adds a header sent with every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn extra_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let (name, value) = parse_header(name.as_ref(), value.as_ref())?;
        self.extra_headers.insert(name, value);
        Ok(self)
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are empty or the default HTTP
    /// transport cannot be created.
    pub fn build(self) -> Result<Config> {
        if self.user_uuid.is_empty() || self.api_token.is_empty() {
            return Err(Error::Configuration(
                "user UUID and API token are required".to_string(),
            ));
        }

        HeaderValue::try_from(self.user_agent.as_str())
            .map_err(|e| Error::Configuration(format!("invalid user agent: {e}")))?;
        parse_header("X-Auth-UserID", &self.user_uuid)?;
        parse_header("X-Auth-Token", &self.api_token)?;

        let api_url = match self.api_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_API_URL)
                .map_err(|e| Error::Configuration(format!("invalid API URL: {e}")))?,
        };

        let http_client = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?,
        };

        let retry_strategy = match (self.retry_strategy, self.backoff) {
            (Some(strategy), _) => strategy,
            (None, Some((max_delay, jitter))) => RetryStrategy::ExponentialBackoff {
                initial_delay: self.delay_interval,
                max_delay,
                max_retries: self.max_number_of_retries,
                jitter,
            },
            (None, None) => RetryStrategy::Fixed {
                delay: self.delay_interval,
                max_retries: self.max_number_of_retries,
            },
        };

        Ok(Config {
            api_url,
            user_uuid: self.user_uuid,
            api_token: self.api_token,
            user_agent: self.user_agent,
            sync: self.sync,
            http_client,
            max_number_of_retries: self.max_number_of_retries,
            delay_interval: self.delay_interval,
            request_check_timeout: self.request_check_timeout,
            retry_strategy,
            retry_predicate: self
                .retry_predicate
                .unwrap_or_else(|| Box::new(RetryOnRetryable)),
            rate_limit: self.rate_limit,
            log_level: self.log_level,
            extra_headers: Mutex::new(self.extra_headers),
        })
    }
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let name = HeaderName::try_from(name)
        .map_err(|e| Error::Configuration(format!("invalid header name: {e}")))?;
    let value = HeaderValue::try_from(value)
        .map_err(|e| Error::Configuration(format!("invalid header value: {e}")))?;
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_credentials("user", "token").unwrap();
        assert_eq!(config.api_url().as_str(), "https://api.gridscale.io/");
        assert_eq!(config.api_url().scheme(), "https");
        assert_eq!(config.max_number_of_retries(), 5);
        assert_eq!(config.delay_interval(), Duration::from_secs(1));
        assert_eq!(config.request_check_timeout(), Duration::from_secs(600));
        assert_eq!(config.log_level(), LevelFilter::ERROR);
        assert!(!config.sync());
        assert!(!config.rate_limit().enabled);
        assert!(config.user_agent().starts_with("gsclient-rs/"));
    }

    #[test]
    fn test_missing_credentials_are_rejected() {
        assert!(matches!(
            Config::from_credentials("", "token"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        assert!(Config::builder("u", "t").api_url("not a url").is_err());
        assert!(Config::builder("u", "t").api_url("mailto:ops@example.com").is_err());
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = Config::builder("u", "t")
            .api_url("https://api.example.com/v1/")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.api_url().path(), "/v1");
    }

    #[test]
    fn test_backoff_selects_strategy() {
        let config = Config::builder("u", "t")
            .delay_interval(Duration::from_millis(10))
            .max_number_of_retries(2)
            .exponential_backoff(Duration::from_millis(30), false)
            .build()
            .unwrap();
        let strategy = config.retry_strategy();
        assert_eq!(strategy.delay_for_attempt(1), Some(Duration::from_millis(10)));
        assert_eq!(strategy.delay_for_attempt(2), Some(Duration::from_millis(20)));
        assert_eq!(strategy.delay_for_attempt(3), None);
    }

    #[test]
    fn test_explicit_strategy_wins() {
        let config = Config::builder("u", "t")
            .exponential_backoff(Duration::from_secs(5), true)
            .retry_strategy(RetryStrategy::None)
            .build()
            .unwrap();
        assert_eq!(config.retry_strategy().delay_for_attempt(1), None);
        assert_eq!(config.delay_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_extra_headers_can_change_after_build() {
        let config = Config::builder("u", "t")
            .extra_header("X-Team", "infra")
            .unwrap()
            .build()
            .unwrap();
        config.set_extra_header("X-Trace", "abc").unwrap();
        config.remove_extra_header("X-Team");

        let snapshot = config.extra_headers();
        assert_eq!(snapshot.get("x-trace").unwrap(), "abc");
        assert!(snapshot.get("x-team").is_none());
        assert!(config.set_extra_header("bad header", "x").is_err());

        config.replace_extra_headers(HeaderMap::new());
        assert!(config.extra_headers().is_empty());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = Config::from_credentials("user", "very-secret").unwrap();
        assert!(!format!("{config:?}").contains("very-secret"));
    }
}
