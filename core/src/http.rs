//! HTTP request and response values exchanged with a transport.
//!
//! # Design
//! Requests and responses are plain data. `build_request` produces an
//! `HttpRequest` without touching the network, a `Transport` turns it into an
//! `HttpResponse`, and the resolver classifies that response. A host that
//! wants to run the round trip itself can do so between the two pure steps.

use std::fmt;

use serde::Serialize;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether a request body may be attached to this method.
    pub fn allows_body(self) -> bool {
        !matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-level caching directive carried by every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    /// Never answer from a cache; every call goes to the network. Sent as
    /// `Cache-Control: no-store`, replacing any caller `Cache-Control`
    /// header.
    #[default]
    NoStore,
}

impl CacheMode {
    /// The `Cache-Control` value a transport should send for this mode.
    pub fn header_value(self) -> &'static str {
        match self {
            CacheMode::NoStore => "no-store",
        }
    }
}

/// A transport-ready HTTP request.
///
/// Produced by `build_request`; every field is already encoded, so executing
/// the same value twice sends byte-identical requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub cache: CacheMode,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response as captured by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase for `status`. `UreqTransport` reports the canonical
    /// phrase (`Not Found` for 404, empty for unregistered codes), not the
    /// text the server sent.
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_get_and_delete_forbid_bodies() {
        assert!(!HttpMethod::Get.allows_body());
        assert!(!HttpMethod::Delete.allows_body());
        assert!(HttpMethod::Post.allows_body());
        assert!(HttpMethod::Put.allows_body());
        assert!(HttpMethod::Patch.allows_body());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: String::new(),
        };
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("accept"), None);
    }
}
