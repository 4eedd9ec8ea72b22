//! Request and response model for the interception boundary.
//!
//! Only the parts of a request/response the routing policy inspects are
//! modeled: method, URL, response status, and the fetch response type.
//! Bodies are opaque [`Bytes`].

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// HTTP method of an intercepted request. Only `GET` is ever cacheable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Other(String),
}

impl Method {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "HEAD" => Self::Head,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "PATCH" => Self::Patch,
            "OPTIONS" => Self::Options,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
            Self::Other(name) => name.as_str(),
        }
    }

    pub fn is_get(&self) -> bool {
        matches!(self, Self::Get)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outgoing request as seen by the interceptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: Url,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum RequestError {
    #[error("{method} requests have no cache identity")]
    NotCacheable { method: String },
}

/// Normalized cache identity of a request: method plus URL with the
/// fragment stripped (query preserved). GET-only by construction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey(String);

impl RequestKey {
    pub fn for_request(request: &RequestDescriptor) -> Result<Self, RequestError> {
        if !request.method.is_get() {
            return Err(RequestError::NotCacheable {
                method: request.method.as_str().to_string(),
            });
        }
        Ok(Self::for_get(&request.url))
    }

    /// Key for a GET of `url`. Infallible: fragments never reach the server,
    /// so they are dropped from the identity.
    pub fn for_get(url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self(format!("GET {url}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fetch response type, mirroring the browser's classification. Only
/// `Basic` (same-origin, unredirected) responses are cache candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseKind {
    Basic,
    Cors,
    Opaque,
    OpaqueRedirect,
    Error,
}

/// A stored or freshly-fetched response: status, type, headers, body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    pub status: u16,
    pub kind: ResponseKind,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl ResponseSnapshot {
    pub fn new(status: u16, kind: ResponseKind) -> Self {
        Self {
            status,
            kind,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Cache-population rule: a fully successful basic response and nothing
    /// else. Opaque, redirected, and non-200 responses pass through uncached.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }
}

/// Failure of a single network attempt. The interceptor tries once and
/// surfaces this to the caller; retry policy belongs to an outer layer.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum FetchError {
    #[error("network unreachable: {reason}")]
    Unreachable { reason: String },

    #[error("request timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("transport error: {reason}")]
    Transport { reason: String },
}

/// The network boundary. Shells implement this over the platform fetch.
#[async_trait::async_trait]
pub trait NetworkFetcher: Send + Sync {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<ResponseSnapshot, FetchError>;
}
