//! Error types for the Vendus client.
//!
//! # Design
//! Callers need to tell three situations apart: the service rejected the
//! request (`Api`, carrying the status, body and an echo of what was sent),
//! the request never completed (`Transport`), and the service answered with
//! something that is not the expected JSON (`Deserialization`).
//! `InvalidRequest` covers requests rejected before anything is sent.

use std::error::Error as StdError;

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::auth::AUTHORIZATION;
use crate::http::{HttpMethod, HttpRequest};

/// Errors returned by every client operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be completed at the network level.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The service answered with a status code of 300 or above.
    #[error("{}", .0)]
    Api(Box<ApiFailure>),

    /// The response body was not the JSON the caller expected.
    #[error("failed to deserialize response (HTTP {status}): {source}")]
    Deserialization {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// The request was rejected before it was sent.
    #[error(transparent)]
    InvalidRequest(#[from] RequestError),
}

impl ApiError {
    pub fn is_api_failure(&self) -> bool {
        matches!(self, ApiError::Api(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    pub fn is_deserialization(&self) -> bool {
        matches!(self, ApiError::Deserialization { .. })
    }

    /// The structured failure, when the service rejected the request.
    pub fn failure(&self) -> Option<&ApiFailure> {
        match self {
            ApiError::Api(failure) => Some(&**failure),
            _ => None,
        }
    }

    /// HTTP status of the response, if one was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Api(failure) => Some(failure.status_code),
            ApiError::Deserialization { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ApiFailure> for ApiError {
    fn from(failure: ApiFailure) -> Self {
        ApiError::Api(Box::new(failure))
    }
}

/// A response the service reported as a failure.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("request failed with status {status_code}: {status_text}")]
pub struct ApiFailure {
    pub status_code: u16,
    /// Copied from `HttpResponse::status_text`; with the default transport
    /// this is the canonical reason phrase.
    pub status_text: String,
    /// Parsed response body.
    pub body: Value,
    pub request: RequestEcho,
}

impl ApiFailure {
    /// Messages from a Vendus `{"errors":[{"message":…}]}` body, if present.
    pub fn messages(&self) -> Vec<&str> {
        self.body
            .get("errors")
            .and_then(Value::as_array)
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| e.get("message").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Diagnostic copy of the request that produced a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEcho {
    pub url: String,
    /// Pretty-printed JSON of the method, headers, body and cache mode. The
    /// `Authorization` value is redacted.
    pub options: String,
}

impl RequestEcho {
    pub fn from_request(request: &HttpRequest) -> Self {
        let headers: Map<String, Value> = request
            .headers
            .iter()
            .map(|(name, value)| {
                let value = if name.eq_ignore_ascii_case(AUTHORIZATION) {
                    "<redacted>".to_string()
                } else {
                    value.clone()
                };
                (name.clone(), Value::String(value))
            })
            .collect();
        let options = json!({
            "method": request.method,
            "headers": headers,
            "body": request.body,
            "cache": request.cache,
        });
        Self {
            url: request.url.clone(),
            options: serde_json::to_string_pretty(&options).unwrap_or_default(),
        }
    }
}

/// A `RequestSpec` that violates a construction rule.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{method} requests cannot carry a body")]
    BodyNotAllowed { method: HttpMethod },

    #[error("form bodies must be JSON objects")]
    FormBodyNotObject,

    #[error("form field `{key}` must be a scalar, arrays and objects are not supported")]
    UnsupportedFormValue { key: String },

    #[error("failed to serialize request body: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A network-level failure reported by a `Transport`.
#[derive(Debug, Error)]
#[error("transport error for {url}: {source}")]
pub struct TransportError {
    pub url: String,
    #[source]
    pub source: Box<dyn StdError + Send + Sync>,
}

impl TransportError {
    pub fn new(url: impl Into<String>, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
        }
    }
}
