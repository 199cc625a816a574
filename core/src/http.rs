//! HTTP exchange types shared by the request builder and the transport.
//!
//! # Design
//! Requests and responses are plain data. `CharacterClient` builds an
//! `HttpRequest` and parses an `HttpResponse` without touching the network;
//! a `Transport` implementation sits between the two and performs the actual
//! round-trip. Swapping the transport (a scripted double in tests, `ureq` in
//! production) never changes how payloads are built or decoded.

/// HTTP method for a request. The character API is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// An HTTP response described as plain data.
///
/// Transports return one of these for every status code; interpreting the
/// status is left to `CharacterClient::parse_list_characters`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// A response with no headers, mostly useful for transport doubles.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}
