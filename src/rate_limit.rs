//! Optional handling of `429 Too Many Requests`.
//!
//! Off by default: a 429 is a 4xx like any other and fails immediately.
//! When enabled, the engine reads the rate-limit headers of a 429 and
//! retries after the delay they indicate.

use http::HeaderMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Information extracted from rate limit headers.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// When the rate limit resets (`X-RateLimit-Reset` / `RateLimit-Reset`).
    pub reset_at: Option<SystemTime>,

    /// How long to wait before retrying (`Retry-After`).
    pub retry_after: Option<Duration>,

    /// Number of requests remaining in the current window.
    pub remaining: Option<u64>,
}

impl RateLimitInfo {
    /// Extracts rate limit information from response headers.
    ///
    /// Understands `Retry-After` (seconds or HTTP date), `X-RateLimit-Reset`
    /// and `RateLimit-Reset` (Unix seconds), and `X-RateLimit-Remaining`.
    ///
    /// # Examples
    ///
    /// ```
    /// use gsclient::rate_limit::RateLimitInfo;
    /// use http::HeaderMap;
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("retry-after", "3".parse().unwrap());
    ///
    /// let info = RateLimitInfo::from_headers(&headers);
    /// assert!(info.is_rate_limited());
    /// ```
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            reset_at: parse_rate_limit_reset(headers),
            retry_after: parse_retry_after(headers),
            remaining: parse_rate_limit_remaining(headers),
        }
    }

    /// Returns the recommended delay before retrying, capped by `max_wait`.
    ///
    /// `retry_after` wins over `reset_at`. Returns `None` when neither is known.
    pub fn delay(&self, max_wait: Duration) -> Option<Duration> {
        if let Some(retry_after) = self.retry_after {
            return Some(retry_after.min(max_wait));
        }

        let reset_at = self.reset_at?;
        let until_reset = reset_at
            .duration_since(SystemTime::now())
            .unwrap_or(Duration::ZERO);
        Some(until_reset.min(max_wait))
    }

    /// Returns `true` if the headers describe an active limit.
    pub fn is_rate_limited(&self) -> bool {
        self.retry_after.is_some() || self.reset_at.is_some() || self.remaining == Some(0)
    }
}

/// Configuration for rate limit handling.
///
/// # Examples
///
/// ```
/// use gsclient::rate_limit::RateLimitConfig;
/// use std::time::Duration;
///
/// let config = RateLimitConfig::enabled_with_max_wait(Duration::from_secs(60));
/// assert!(config.enabled);
/// assert!(!RateLimitConfig::default().enabled);
/// ```
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Whether a 429 with rate limit headers is retried.
    pub enabled: bool,

    /// Upper bound for a single rate limit wait.
    pub max_wait: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_wait: Duration::from_secs(300),
        }
    }
}

impl RateLimitConfig {
    /// Enables rate limit handling with the given cap on each wait.
    pub fn enabled_with_max_wait(max_wait: Duration) -> Self {
        Self {
            enabled: true,
            max_wait,
        }
    }

    /// Parses the headers of a 429 when handling is enabled.
    pub(crate) fn inspect(&self, headers: &HeaderMap) -> Option<RateLimitInfo> {
        if !self.enabled {
            return None;
        }
        let info = RateLimitInfo::from_headers(headers);
        info.is_rate_limited().then_some(info)
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = headers.get("retry-after")?.to_str().ok()?;

    if let Ok(seconds) = header.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date_time = httpdate::parse_http_date(header).ok()?;
    Some(
        date_time
            .duration_since(SystemTime::now())
            .unwrap_or(Duration::ZERO),
    )
}

fn parse_rate_limit_reset(headers: &HeaderMap) -> Option<SystemTime> {
    ["x-ratelimit-reset", "ratelimit-reset"]
        .iter()
        .filter_map(|name| headers.get(*name)?.to_str().ok()?.parse::<u64>().ok())
        .map(|timestamp| UNIX_EPOCH + Duration::from_secs(timestamp))
        .next()
}

fn parse_rate_limit_remaining(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("x-ratelimit-remaining")?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_parse_retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("60"));

        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_parse_retry_after_http_date() {
        let mut headers = HeaderMap::new();
        let at = SystemTime::now() + Duration::from_secs(120);
        headers.insert(
            "retry-after",
            HeaderValue::from_str(&httpdate::fmt_http_date(at)).unwrap(),
        );

        let delay = parse_retry_after(&headers).unwrap();
        assert!(delay > Duration::from_secs(100) && delay <= Duration::from_secs(120));
    }

    #[test]
    fn test_reset_header_fallback() {
        let mut headers = HeaderMap::new();
        let future_timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 120;
        headers.insert(
            "ratelimit-reset",
            HeaderValue::from_str(&future_timestamp.to_string()).unwrap(),
        );

        let info = RateLimitInfo::from_headers(&headers);
        assert!(info.reset_at.is_some());
        let delay = info.delay(Duration::from_secs(30)).unwrap();
        assert_eq!(delay, Duration::from_secs(30));
    }

    #[test]
    fn test_remaining_zero_is_rate_limited() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));

        let info = RateLimitInfo::from_headers(&headers);
        assert_eq!(info.remaining, Some(0));
        assert!(info.is_rate_limited());
        assert_eq!(info.delay(Duration::from_secs(5)), None);
    }

    #[test]
    fn test_disabled_config_ignores_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("1"));

        assert!(RateLimitConfig::default().inspect(&headers).is_none());
        assert!(RateLimitConfig::enabled_with_max_wait(Duration::from_secs(2))
            .inspect(&headers)
            .is_some());
    }
}
