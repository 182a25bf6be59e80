//! Completion waiters.
//!
//! In sync mode every mutation is followed by one of these waits, chosen
//! from the resource table when the call is dispatched.

use crate::client::Client;
use crate::codec::Timestamp;
use crate::poll::{self, Probe};
use crate::request::Request;
use crate::{Context, Error, Response, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

const STATUS_DONE: &str = "done";
const STATUS_FAILED: &str = "failed";
const STATUS_ACTIVE: &str = "active";

/// How a mutation is confirmed in sync mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waiter {
    /// Return as soon as the server accepted the request.
    None,
    /// Poll `/requests/{uuid}` until it reports `done`.
    Request,
    /// Poll the resource until its `status` is `active`.
    Active,
    /// Poll the resource until it answers 404.
    Absent,
    /// Wait for the request, then for the new resource to become active.
    RequestThenActive,
}

impl Waiter {
    /// The same waiter without its request-status phase, for requests
    /// marked with [`Request::skip_checking_request`].
    pub fn skipping_request_check(self) -> Self {
        match self {
            Waiter::Request => Waiter::None,
            Waiter::RequestThenActive => Waiter::Active,
            other => other,
        }
    }
}

/// Progress of an asynchronous request, from `GET /requests/{uuid}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RequestStatus {
    /// `pending`, `done` or `failed`.
    pub status: String,
    /// Human readable detail, usually empty until the request ends.
    pub message: String,
    /// When the server accepted the request.
    pub create_time: Timestamp,
}

/// The object a waiter observes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Target<'a> {
    pub path: &'a str,
    pub item_key: &'a str,
}

impl Client {
    /// Fetches the status of an asynchronous request.
    pub async fn get_request(&self, ctx: &Context, request_uuid: &str) -> Result<RequestStatus> {
        let path = format!("/requests/{request_uuid}");
        let mut response = self
            .execute::<HashMap<String, RequestStatus>>(ctx, Request::get(path.as_str()))
            .await?;
        match response.data.remove(request_uuid) {
            Some(status) => Ok(status),
            None => Err(missing_key(&response, &path, request_uuid)),
        }
    }

    /// Polls the request-status endpoint until the request is `done`.
    ///
    /// A `failed` request ends the wait with [`Error::RequestFailed`]. A
    /// request still `pending` when the request-check timeout elapses ends
    /// it with [`Error::Timeout`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gsclient::{Client, Context};
    /// use std::time::Duration;
    ///
    /// # async fn example(client: Client, request_uuid: &str) -> Result<(), gsclient::Error> {
    /// let ctx = Context::background().with_timeout(Duration::from_secs(120));
    /// client.wait_for_request_completed(&ctx, request_uuid).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn wait_for_request_completed(&self, ctx: &Context, request_uuid: &str) -> Result<()> {
        let config = self.config();
        let condition = format!("request {request_uuid} to complete");
        poll::retry_with_timeout(
            ctx,
            config.request_check_timeout(),
            config.delay_interval(),
            &condition,
            || async move {
                match self.get_request(ctx, request_uuid).await {
                    Ok(request) => {
                        log_event!(
                            config,
                            DEBUG,
                            request_uuid,
                            status = %request.status,
                            "polled request status"
                        );
                        match request.status.as_str() {
                            STATUS_DONE => Ok(Probe::Ready(())),
                            STATUS_FAILED => Err(Error::RequestFailed {
                                request_uuid: request_uuid.to_string(),
                                status: request.status,
                            }),
                            _ => Ok(Probe::Pending),
                        }
                    }
                    Err(e) => retry_unless_fatal(e),
                }
            },
        )
        .await
    }

    /// Polls `path` until the object under `item_key` reports `status: active`.
    ///
    /// A 404 counts as not active yet; any other 4xx or a body that cannot
    /// be decoded ends the wait.
    pub async fn wait_for_resource_active(&self, ctx: &Context, path: &str, item_key: &str) -> Result<()> {
        self.wait_for_property(ctx, path, item_key, "status", STATUS_ACTIVE)
            .await
    }

    /// Polls `path` until the object under `item_key` has `property` set to
    /// `expected`.
    pub async fn wait_for_property(
        &self,
        ctx: &Context,
        path: &str,
        item_key: &str,
        property: &str,
        expected: impl Into<Value>,
    ) -> Result<()> {
        let config = self.config();
        let expected = &expected.into();
        let condition = format!("{path} to have {property} = {expected}");
        poll::retry_with_timeout(
            ctx,
            config.request_check_timeout(),
            config.delay_interval(),
            &condition,
            || async move {
                let response = match self
                    .execute::<Map<String, Value>>(ctx, Request::get(path))
                    .await
                {
                    Ok(response) => response,
                    Err(e) if e.is_not_found() => return Ok(Probe::Pending),
                    Err(e) => return retry_unless_fatal(e),
                };
                let Some(properties) = response.data.get(item_key) else {
                    return Err(missing_key(&response, path, item_key));
                };
                let current = properties.get(property).unwrap_or(&Value::Null);
                log_event!(config, DEBUG, path, property, current = %current, "polled resource");
                Ok(if current == expected {
                    Probe::Ready(())
                } else {
                    Probe::Pending
                })
            },
        )
        .await
    }

    /// Polls `path` until the server answers 404.
    ///
    /// Every other answer, errors included, keeps the wait going until the
    /// request-check timeout; the last error is reported then.
    pub async fn wait_for_resource_deleted(&self, ctx: &Context, path: &str) -> Result<()> {
        let config = self.config();
        let condition = format!("{path} to be deleted");
        poll::retry_with_timeout(
            ctx,
            config.request_check_timeout(),
            config.delay_interval(),
            &condition,
            || async move {
                match self.execute_discard(ctx, Request::get(path)).await {
                    Ok(_) => {
                        log_event!(config, DEBUG, path, "resource still present");
                        Ok(Probe::Pending)
                    }
                    Err(e) if e.is_not_found() => Ok(Probe::Ready(())),
                    Err(e @ (Error::Cancelled | Error::Timeout(_))) => Err(e),
                    Err(e) => Ok(Probe::Retry(e)),
                }
            },
        )
        .await
    }

    /// Runs `waiter` for a mutation that produced `response`, when sync mode
    /// is on.
    ///
    /// The request UUID comes from the response header, or from
    /// `body_request_uuid` when the header is absent. The active phase is
    /// skipped when there is no `target` to observe.
    pub(crate) async fn complete<T>(
        &self,
        ctx: &Context,
        waiter: Waiter,
        response: &Response<T>,
        body_request_uuid: Option<&str>,
        target: Option<Target<'_>>,
    ) -> Result<()> {
        if !self.config().sync() || waiter == Waiter::None {
            return Ok(());
        }

        let request_uuid = response
            .request_uuid
            .as_deref()
            .or(body_request_uuid.filter(|uuid| !uuid.is_empty()));
        let path = target.map(|t| t.path).unwrap_or("-");
        log_event!(self.config(), DEBUG, ?waiter, path, "waiting for completion");

        if matches!(waiter, Waiter::Request | Waiter::RequestThenActive) {
            let Some(request_uuid) = request_uuid else {
                return Err(Error::Decode {
                    url: path.to_string(),
                    status: response.status,
                    serde_error: format!("response carries no {} header", crate::REQUEST_UUID_HEADER),
                    body_prefix: response.raw_body.chars().take(200).collect(),
                    request_uuid: None,
                });
            };
            self.wait_for_request_completed(ctx, request_uuid).await?;
        }

        match (waiter, target) {
            (Waiter::Active | Waiter::RequestThenActive, Some(target)) => {
                self.wait_for_resource_active(ctx, target.path, target.item_key)
                    .await
            }
            (Waiter::Absent, Some(target)) => self.wait_for_resource_deleted(ctx, target.path).await,
            _ => Ok(()),
        }
    }
}

/// Cancellation, client errors and undecodable bodies end a wait; transient
/// failures are remembered and polled again.
fn retry_unless_fatal<T>(error: Error) -> Result<Probe<T>> {
    match &error {
        Error::Cancelled | Error::Timeout(_) | Error::Decode { .. } => Err(error),
        Error::Http { status, .. } if status.is_client_error() => Err(error),
        _ => Ok(Probe::Retry(error)),
    }
}

fn missing_key<T>(response: &Response<T>, path: &str, key: &str) -> Error {
    Error::Decode {
        url: path.to_string(),
        status: response.status,
        serde_error: format!("missing envelope key {key:?}"),
        body_prefix: response.raw_body.chars().take(200).collect(),
        request_uuid: response.request_uuid.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, StatusCode};

    #[test]
    fn test_skipping_request_check() {
        assert_eq!(Waiter::Request.skipping_request_check(), Waiter::None);
        assert_eq!(Waiter::RequestThenActive.skipping_request_check(), Waiter::Active);
        assert_eq!(Waiter::Absent.skipping_request_check(), Waiter::Absent);
    }

    #[test]
    fn test_fatal_errors_abort_waits() {
        let not_found = Error::http(StatusCode::NOT_FOUND, String::new(), HeaderMap::new(), None, None);
        assert!(retry_unless_fatal::<()>(not_found).is_err());
        assert!(retry_unless_fatal::<()>(Error::Cancelled).is_err());

        let unavailable = Error::http(StatusCode::SERVICE_UNAVAILABLE, String::new(), HeaderMap::new(), None, None);
        assert!(matches!(retry_unless_fatal::<()>(unavailable), Ok(Probe::Retry(_))));
    }

    #[test]
    fn test_request_status_decodes_partial_body() {
        let status: RequestStatus = serde_json::from_str(r#"{"status":"pending"}"#).unwrap();
        assert_eq!(status.status, "pending");
        assert!(status.create_time.is_zero());
    }
}
