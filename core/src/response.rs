//! Classification of responses into success payloads or structured failures.
//!
//! The body is parsed as JSON before the status is inspected, so a response
//! that is not JSON surfaces as `ApiError::Deserialization` whatever its
//! status. Statuses below 300 are successes; everything else is a failure.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::error::{ApiError, ApiFailure, RequestEcho};
use crate::http::{HttpRequest, HttpResponse};

/// First status code treated as a failure.
pub const FAILURE_THRESHOLD: u16 = 300;

/// Terminal classification of one call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success { status_code: u16, body: Value },
    Failure(ApiFailure),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Outcome::Success { status_code, .. } => *status_code,
            Outcome::Failure(failure) => failure.status_code,
        }
    }

    /// Deserializes a success body into `T`, or turns a failure into
    /// `ApiError::Api`.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            Outcome::Success { status_code, body } => serde_json::from_value(body)
                .map_err(|source| ApiError::Deserialization {
                    status: status_code,
                    source,
                }),
            Outcome::Failure(failure) => Err(failure.into()),
        }
    }
}

/// Classifies `response` to `request`.
pub fn classify(request: &HttpRequest, response: HttpResponse) -> Result<Outcome, ApiError> {
    let body: Value =
        serde_json::from_str(&response.body).map_err(|source| ApiError::Deserialization {
            status: response.status,
            source,
        })?;

    if response.status < FAILURE_THRESHOLD {
        return Ok(Outcome::Success {
            status_code: response.status,
            body,
        });
    }

    warn!(
        status = response.status,
        status_text = %response.status_text,
        url = %request.url,
        "request rejected by service"
    );
    Ok(Outcome::Failure(ApiFailure {
        status_code: response.status,
        status_text: response.status_text,
        body,
        request: RequestEcho::from_request(request),
    }))
}

/// `classify` followed by `Outcome::into_result`.
pub fn resolve<T: DeserializeOwned>(
    request: &HttpRequest,
    response: HttpResponse,
) -> Result<T, ApiError> {
    classify(request, response)?.into_result()
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::http::{CacheMode, HttpMethod};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Record {
        id: u64,
    }

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost/clients/7".to_string(),
            headers: vec![("Authorization".to_string(), "Basic c2VjcmV0Og==".to_string())],
            body: None,
            cache: CacheMode::NoStore,
        }
    }

    fn response(status: u16, status_text: &str, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            status_text: status_text.to_string(),
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn ok_resolves_to_typed_value() {
        let record: Record = resolve(&request(), response(200, "OK", r#"{"id": 7}"#)).unwrap();
        assert_eq!(record, Record { id: 7 });
    }

    #[test]
    fn ok_resolves_to_raw_json() {
        let value: Value = resolve(&request(), response(201, "Created", r#"{"id": 7}"#)).unwrap();
        assert_eq!(value, json!({"id": 7}));
    }

    #[test]
    fn not_found_is_structured_failure() {
        let outcome = classify(
            &request(),
            response(404, "Not Found", r#"{"message":"not found"}"#),
        )
        .unwrap();
        let Outcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.status_code, 404);
        assert_eq!(failure.status_text, "Not Found");
        assert_eq!(failure.body, json!({"message": "not found"}));
        assert_eq!(failure.request.url, "http://localhost/clients/7");
        assert!(!failure.request.options.contains("c2VjcmV0Og=="));
    }

    #[test]
    fn redirect_status_is_failure() {
        let err = resolve::<Value>(&request(), response(302, "Found", "{}")).unwrap_err();
        assert_eq!(err.status_code(), Some(302));
        assert!(err.is_api_failure());
    }

    #[test]
    fn boundary_299_is_success() {
        let outcome = classify(&request(), response(299, "", "null")).unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.status_code(), 299);
    }

    #[test]
    fn invalid_json_on_success_is_deserialization_error() {
        let err = resolve::<Value>(&request(), response(200, "OK", "not json")).unwrap_err();
        assert!(err.is_deserialization());
        assert_eq!(err.status_code(), Some(200));
    }

    #[test]
    fn invalid_json_on_failure_is_deserialization_error() {
        let err = classify(&request(), response(500, "Internal Server Error", "<html>")).unwrap_err();
        assert!(err.is_deserialization());
        assert_eq!(err.status_code(), Some(500));
    }

    #[test]
    fn shape_mismatch_is_deserialization_error() {
        let err = resolve::<Record>(&request(), response(200, "OK", r#"{"name":"x"}"#)).unwrap_err();
        assert!(err.is_deserialization());
    }

    #[test]
    #[tracing_test::traced_test]
    fn failures_are_logged_without_credentials() {
        let _ = classify(&request(), response(401, "Unauthorized", "{}"));
        assert!(logs_contain("request rejected by service"));
        assert!(!logs_contain("c2VjcmV0Og=="));
    }
}
