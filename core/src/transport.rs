//! Network dispatch.
//!
//! A `Transport` performs exactly one HTTP round trip for an `HttpRequest`.
//! Status codes are never treated as errors here; classification is left to
//! the resolver. `UreqTransport` is the default implementation.

use tracing::{instrument, Span};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Capability to execute one HTTP request.
///
/// Implementations must be shareable across threads; the client issues
/// concurrent calls through a shared reference.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

/// Blocking transport backed by a pooled `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // 4xx/5xx are returned as data so the resolver can build a failure.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Uses a caller-configured agent. It should have
    /// `http_status_as_error(false)` set.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

pub const CACHE_CONTROL: &str = "Cache-Control";

/// Headers as they go on the wire. The cache directive owns
/// `Cache-Control`, so a caller header of that name is dropped rather than
/// sent twice.
fn wire_headers(request: &HttpRequest) -> Vec<(&str, &str)> {
    request
        .headers
        .iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case(CACHE_CONTROL))
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .chain([(CACHE_CONTROL, request.cache.header_value())])
        .collect()
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    request: &HttpRequest,
) -> ureq::RequestBuilder<B> {
    for (name, value) in wire_headers(request) {
        builder = builder.header(name, value);
    }
    builder
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let body = request.body.as_deref();

        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(url), request).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(url), request).call(),
            HttpMethod::Post => {
                let builder = with_headers(self.agent.post(url), request);
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Put => {
                let builder = with_headers(self.agent.put(url), request);
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Patch => {
                let builder = with_headers(self.agent.patch(url), request);
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| TransportError::new(url, e))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::new(url, e))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

/// Executes `request` once through `transport`.
#[instrument(
    name = "vendus_request",
    skip_all,
    fields(
        http.method = %request.method,
        http.url = %request.url,
        http.status_code = tracing::field::Empty,
    )
)]
pub fn dispatch<T: Transport + ?Sized>(
    transport: &T,
    request: &HttpRequest,
) -> Result<HttpResponse, TransportError> {
    match transport.send(request) {
        Ok(response) => {
            Span::current().record("http.status_code", response.status);
            tracing::debug!(status = response.status, "response received");
            Ok(response)
        }
        Err(err) => {
            tracing::warn!(error = %err, "transport failed");
            Err(err)
        }
    }
}
