//! The request descriptor consumed by the engine.

use crate::{Error, Result};
use http::Method;
use serde::Serialize;

/// Everything needed to issue one API request.
///
/// # Examples
///
/// ```
/// use gsclient::request::Request;
/// use serde_json::json;
///
/// # fn example() -> Result<(), gsclient::Error> {
/// let request = Request::post("/objects/sshkeys", &json!({"name": "ops", "sshkey": "ssh-ed25519 AAAA"}))?
///     .with_query_param("dry_run", "false");
/// assert_eq!(request.uri, "/objects/sshkeys");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method.
    pub method: Method,

    /// Path relative to the configured API URL, starting with `/`.
    pub uri: String,

    /// JSON body, already encoded to a value.
    pub body: Option<serde_json::Value>,

    /// Query parameters, in order.
    pub query: Vec<(String, String)>,

    /// When set, sync mode does not poll the request-status endpoint after
    /// this request; the caller waits on some other condition instead.
    pub skip_checking_request: bool,
}

impl Request {
    /// Creates a request without body.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            body: None,
            query: Vec::new(),
            skip_checking_request: false,
        }
    }

    /// A `GET` request.
    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::GET, uri)
    }

    /// A `DELETE` request.
    pub fn delete(uri: impl Into<String>) -> Self {
        Self::new(Method::DELETE, uri)
    }

    /// A `POST` request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be encoded as JSON.
    pub fn post<B: Serialize + ?Sized>(uri: impl Into<String>, body: &B) -> Result<Self> {
        Self::new(Method::POST, uri).with_body(body)
    }

    /// A `PATCH` request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be encoded as JSON.
    pub fn patch<B: Serialize + ?Sized>(uri: impl Into<String>, body: &B) -> Result<Self> {
        Self::new(Method::PATCH, uri).with_body(body)
    }

    /// Sets the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be encoded as JSON.
    pub fn with_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| Error::Serialization(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Adds a query parameter.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Adds multiple query parameters.
    pub fn with_query_params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    /// Marks the request so sync mode does not poll its request status.
    pub fn skip_checking_request(mut self) -> Self {
        self.skip_checking_request = true;
        self
    }
}
