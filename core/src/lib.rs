//! Typed client for the Vendus invoicing API.
//!
//! # Overview
//! Resource modules (`clients`, `documents`) describe request and response
//! shapes and delegate to one shared request layer. That layer turns a
//! `RequestSpec` into an encoded `HttpRequest`, sends it through a
//! `Transport`, and resolves the response into a typed value or an
//! `ApiError`.
//!
//! # Design
//! - `ClientConfig` is immutable and shared read-only by every call.
//! - Request building and response resolution are pure; only `Transport`
//!   touches the network, once per call.
//! - Failures are values: `ApiError::Api` carries the status, body and an
//!   echo of the request; transport and deserialization errors stay distinct.
//!
//! ```no_run
//! use vendus_core::{ClientConfig, VendusClient};
//! use vendus_core::clients::ClientQuery;
//!
//! let client = VendusClient::new(ClientConfig::from_env()?);
//! let active = client.clients().list(&ClientQuery::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod auth;
pub mod client;
pub mod clients;
pub mod config;
pub mod documents;
pub mod error;
pub mod http;
pub mod query;
pub mod request;
pub mod response;
pub mod transport;

pub use auth::BasicAuth;
pub use client::VendusClient;
pub use config::{ClientConfig, ConfigError, DEFAULT_BASE_URL};
pub use error::{ApiError, ApiFailure, RequestEcho, RequestError, TransportError};
pub use http::{CacheMode, HttpMethod, HttpRequest, HttpResponse};
pub use query::{encode_query, QueryParams, QueryScalar, QueryValue};
pub use request::{build_request, ContentPolicy, RequestBody, RequestSpec};
pub use response::{classify, resolve, Outcome};
pub use transport::{Transport, UreqTransport};
