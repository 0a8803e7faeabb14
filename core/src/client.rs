//! The Vendus API client.
//!
//! # Design
//! `VendusClient` holds an immutable `ClientConfig` (shared through an `Arc`)
//! and a `Transport`, and carries no other state between calls. Every
//! operation is three steps: `build_request` (pure), `dispatch` (one network
//! round trip), and `parse_response` (pure). Hosts that want to perform the
//! I/O themselves can call the pure steps directly.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::clients::ClientsApi;
use crate::config::ClientConfig;
use crate::documents::DocumentsApi;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::request::{build_request, RequestSpec};
use crate::response::{classify, Outcome};
use crate::transport::{dispatch, Transport, UreqTransport};

/// Client for the Vendus REST API.
///
/// Cheap to clone; clones share the configuration. All operations take
/// `&self`, so one instance can serve concurrent calls from many threads.
#[derive(Debug, Clone)]
pub struct VendusClient<T: Transport = UreqTransport> {
    config: Arc<ClientConfig>,
    transport: T,
}

impl VendusClient<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> VendusClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_request(&self, spec: &RequestSpec) -> HttpRequest {
        build_request(&self.config, spec)
    }

    pub fn dispatch(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        Ok(dispatch(&self.transport, request)?)
    }

    /// Classifies a response without deserializing the success body.
    pub fn classify(&self, request: &HttpRequest, response: HttpResponse) -> Result<Outcome, ApiError> {
        classify(request, response)
    }

    pub fn parse_response<R: DeserializeOwned>(
        &self,
        request: &HttpRequest,
        response: HttpResponse,
    ) -> Result<R, ApiError> {
        self.classify(request, response)?.into_result()
    }

    /// Builds, sends and resolves one request.
    pub fn request<R: DeserializeOwned>(&self, spec: RequestSpec) -> Result<R, ApiError> {
        let request = self.build_request(&spec);
        let response = self.dispatch(&request)?;
        self.parse_response(&request, response)
    }

    /// Like [`request`](Self::request), but returns the classified outcome so
    /// API failures arrive as data instead of as `Err`.
    pub fn execute(&self, spec: RequestSpec) -> Result<Outcome, ApiError> {
        let request = self.build_request(&spec);
        let response = self.dispatch(&request)?;
        self.classify(&request, response)
    }

    pub fn clients(&self) -> ClientsApi<'_, T> {
        ClientsApi::new(self)
    }

    pub fn documents(&self) -> DocumentsApi<'_, T> {
        DocumentsApi::new(self)
    }
}
