//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `HostnineClient` builds
//! `HttpRequest` values and parses `HttpResponse` values without touching
//! the network; a `Transport` (see `gateway`) performs the round-trip.
//!
//! The upstream API only ever answers GET requests with every parameter in
//! the query string, so a request carries no method and no body.

/// An outbound GET request described as plain data.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Remote module selected by this request, kept apart from `url` so it
    /// can be logged without leaking the API key.
    pub module: String,
    /// Full GET target including the encoded query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequest")
            .field("module", &self.module)
            .field("url", &"<redacted>")
            .field("headers", &self.headers)
            .finish()
    }
}

/// An HTTP response described as plain data.
///
/// An empty `body` means no body was received.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// A 200 response with the given body and no headers.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}
