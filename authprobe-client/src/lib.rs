//! # Authprobe Client
//!
//! `authprobe-client` owns the HTTP seam of the toolkit: the [`Transport`]
//! trait that flow logic is written against, the reqwest implementation,
//! the endpoint catalog covering every probe the console offers, and the
//! browser-navigable authorization URL builder.
//!
//! Non-2xx responses are ordinary data here. A [`TransportError`] is only
//! produced when no usable response exists at all (network failure, DNS,
//! malformed body with no recovery).

#![warn(missing_docs)]

use async_trait::async_trait;
use http::Method;
use serde_json::Value;
use std::sync::Arc;

/// Authorization URL construction.
pub mod authorize;
/// Endpoint catalog and request builders.
pub mod endpoints;
/// Reqwest-backed transport.
pub mod http_transport;

pub use authorize::{authorize_url, AuthorizeRequest};
pub use endpoints::{EndpointDescriptor, ENDPOINTS};
pub use http_transport::HttpTransport;

/// Description of one HTTP call to make; constructed per probe, not stored.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the transport's base origin, e.g. `/oauth/consent`.
    pub path: String,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// Optional JSON body.
    pub body: Option<Value>,
}

impl RequestSpec {
    /// A bodiless GET for `path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// A POST for `path` carrying a JSON body.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    /// A bodiless DELETE for `path`.
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Append a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// A response that reached us, whatever its status.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded JSON body; non-JSON bodies are carried as a JSON string.
    pub body: Value,
}

/// Failure to obtain any usable response.
#[derive(Debug, Clone)]
pub struct TransportError {
    /// Human-readable cause.
    pub message: String,
    /// Status carried by the error, when the failure happened after a
    /// response line was received (e.g. body decode failure).
    pub status: Option<u16>,
    /// Structured payload carried by the error, if any.
    pub body: Option<Value>,
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TransportError {}

impl TransportError {
    /// An error with only a message, no carried response.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            body: None,
        }
    }
}

/// The injectable HTTP seam the flow crates are written against.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute the described request.
    ///
    /// Implementations must return `Ok` for any response that was actually
    /// received, including 4xx/5xx.
    async fn execute(&self, spec: &RequestSpec) -> Result<RawResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, spec: &RequestSpec) -> Result<RawResponse, TransportError> {
        (**self).execute(spec).await
    }
}
