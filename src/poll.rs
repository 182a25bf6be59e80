//! Polling primitives used by the completion waiters.
//!
//! Both primitives sleep one interval before every probe, including the
//! first, and stop early when the [`Context`] is cancelled or its deadline
//! passes.

use crate::{Context, Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// What a single probe observed.
#[derive(Debug)]
pub enum Probe<T> {
    /// The condition holds; polling stops with this value.
    Ready(T),
    /// Not there yet; poll again.
    Pending,
    /// The probe failed in a way worth retrying. The error is reported if
    /// the wait times out before a later probe succeeds.
    Retry(Error),
}

/// Polls `probe` every `interval` until it is ready or `timeout` elapses.
///
/// A probe returning `Err` aborts the wait with that error. On timeout the
/// last [`Probe::Retry`] error is returned, or [`Error::Timeout`] naming
/// `condition` when there was none. A `timeout` too large to represent
/// means no time limit; the [`Context`] can still end the wait.
///
/// # Examples
///
/// ```
/// use gsclient::poll::{retry_with_timeout, Probe};
/// use gsclient::Context;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), gsclient::Error> {
/// let mut polls = 0;
/// let value = retry_with_timeout(
///     &Context::background(),
///     Duration::from_secs(1),
///     Duration::from_millis(1),
///     "counter to reach 3",
///     || {
///         polls += 1;
///         let probe = if polls == 3 { Probe::Ready(polls) } else { Probe::Pending };
///         async move { Ok(probe) }
///     },
/// )
/// .await?;
/// assert_eq!(value, 3);
/// # Ok(())
/// # }
/// ```
pub async fn retry_with_timeout<T, F, Fut>(
    ctx: &Context,
    timeout: Duration,
    interval: Duration,
    condition: &str,
    mut probe: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Probe<T>>>,
{
    let deadline = Instant::now().checked_add(timeout);
    let mut last_error = None;

    loop {
        let step = async {
            ctx.sleep(interval).await?;
            probe().await
        };

        let outcome = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, step).await,
            None => Ok(step.await),
        };

        match outcome {
            Err(_elapsed) => {
                return Err(last_error.unwrap_or_else(|| {
                    Error::Timeout(format!("gave up after {timeout:?} waiting for {condition}"))
                }))
            }
            Ok(Err(e)) => return Err(e),
            Ok(Ok(Probe::Ready(value))) => return Ok(value),
            Ok(Ok(Probe::Pending)) => {}
            Ok(Ok(Probe::Retry(e))) => last_error = Some(e),
        }
    }
}

/// Polls `probe` every `interval`, at most `max_retries + 1` times.
///
/// Same outcomes as [`retry_with_timeout`], except that the bound is the
/// number of probes rather than elapsed time.
pub async fn retry_with_limited_retries<T, F, Fut>(
    ctx: &Context,
    max_retries: usize,
    interval: Duration,
    condition: &str,
    mut probe: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Probe<T>>>,
{
    let mut last_error = None;

    for _ in 0..=max_retries {
        ctx.sleep(interval).await?;
        match probe().await? {
            Probe::Ready(value) => return Ok(value),
            Probe::Pending => {}
            Probe::Retry(e) => last_error = Some(e),
        }
    }

    Err(last_error.unwrap_or_else(|| {
        Error::Timeout(format!(
            "{condition} not reached after {} attempts",
            max_retries + 1
        ))
    }))
}
