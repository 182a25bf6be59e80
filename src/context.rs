//! Cancellation and deadlines for API calls.
//!
//! Every client operation takes a [`Context`]. Cancelling it, or letting its
//! deadline pass, interrupts the operation wherever it is suspended: while
//! sending, while reading the body, or while sleeping between retries and
//! polls.

use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Carries cancellation and an optional deadline across an operation.
///
/// Contexts are cheap to clone; clones share the same cancellation state.
/// Derived contexts ([`Context::child`], [`Context::with_timeout`]) are
/// cancelled when their parent is, but cancelling them leaves the parent
/// untouched.
///
/// # Examples
///
/// ```no_run
/// use gsclient::{Client, Context};
/// use std::time::Duration;
///
/// # async fn example(client: Client) -> Result<(), gsclient::Error> {
/// let ctx = Context::background().with_timeout(Duration::from_secs(30));
/// let servers = client.servers().list(&ctx).await?;
/// println!("{} servers", servers.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// Returns a context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derives a context that can be cancelled independently of this one.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Derives a context whose deadline is `timeout` from now, or this
    /// context's deadline if that is earlier.
    ///
    /// A timeout too large to represent adds no deadline.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.child(),
        }
    }

    /// Derives a context with the given deadline, or this context's deadline
    /// if that is earlier.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Cancels this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns the deadline, if one is set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` once the context is cancelled or past its deadline.
    pub fn is_done(&self) -> bool {
        self.check().is_err()
    }

    /// Returns the error describing why the context is done, if it is.
    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(deadline_exceeded()),
            _ => Ok(()),
        }
    }

    /// Resolves when the context is cancelled or its deadline passes.
    pub async fn done(&self) -> Error {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => Error::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => deadline_exceeded(),
                }
            }
            None => {
                self.token.cancelled().await;
                Error::Cancelled
            }
        }
    }

    /// Drives `fut` to completion unless the context finishes first.
    ///
    /// When the context wins, `fut` is dropped, which aborts any in-flight
    /// I/O it owns.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output>
    where
        F: Future,
    {
        self.check()?;
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            out = fut => Ok(out),
        }
    }

    /// Sleeps for `duration`, returning early with an error if the context finishes.
    pub async fn sleep(&self, duration: Duration) -> Result<()> {
        self.run(tokio::time::sleep(duration)).await
    }
}

fn deadline_exceeded() -> Error {
    Error::Timeout("context deadline exceeded".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCategory;

    #[tokio::test]
    async fn test_background_never_finishes() {
        let ctx = Context::background();
        assert!(!ctx.is_done());
        assert!(ctx.run(async { 7 }).await.is_ok());
    }

    #[tokio::test]
    async fn test_cancel_interrupts_sleep() {
        let ctx = Context::background().child();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let start = std::time::Instant::now();
        let result = ctx.sleep(Duration::from_secs(10)).await;
        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_deadline_yields_timeout() {
        let ctx = Context::background().with_timeout(Duration::from_millis(20));
        let err = ctx.sleep(Duration::from_secs(10)).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Timeout);
        assert!(ctx.is_done());
    }

    #[test]
    fn test_child_cancellation_does_not_reach_parent() {
        let parent = Context::background();
        let child = parent.child();
        child.cancel();
        assert!(child.is_done());
        assert!(!parent.is_done());

        let grandchild = parent.child();
        parent.cancel();
        assert!(grandchild.is_done());
    }

    #[tokio::test]
    async fn test_earlier_deadline_wins() {
        let outer = Context::background().with_timeout(Duration::from_millis(10));
        let inner = outer.with_timeout(Duration::from_secs(60));
        assert_eq!(inner.deadline(), outer.deadline());
    }

    #[tokio::test]
    async fn test_unbounded_timeout_adds_no_deadline() {
        let ctx = Context::background().with_timeout(Duration::MAX);
        assert_eq!(ctx.deadline(), None);
        assert!(!ctx.is_done());

        let outer = Context::background().with_timeout(Duration::from_secs(5));
        let inner = outer.with_timeout(Duration::MAX);
        assert_eq!(inner.deadline(), outer.deadline());
    }
}
