//! Logical request descriptions and their encoding into `HttpRequest`s.
//!
//! # Design
//! A `RequestSpec` is validated as it is built: bodies cannot be attached to
//! GET or DELETE, and form bodies are flattened to string pairs up front.
//! `build_request` is therefore pure and infallible, and produces identical
//! output for identical inputs.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::RequestError;
use crate::http::{CacheMode, HttpMethod, HttpRequest};
use crate::query::{encode_pairs, encode_query, QueryParams, QueryScalar, QueryValue};

pub const ACCEPT: &str = "Accept";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const USER_AGENT: &str = "User-Agent";

pub const APPLICATION_JSON: &str = "application/json";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Identifies this library to the service.
pub const CLIENT_USER_AGENT: &str = concat!("vendus-rust/", env!("CARGO_PKG_VERSION"));

/// How a request body is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentPolicy {
    None,
    Json,
    Form,
}

impl ContentPolicy {
    pub fn content_type(self) -> Option<&'static str> {
        match self {
            ContentPolicy::None => None,
            ContentPolicy::Json => Some(APPLICATION_JSON),
            ContentPolicy::Form => Some(FORM_URLENCODED),
        }
    }
}

/// A validated request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// Flattened `(key, value)` pairs in field order.
    Form(Vec<(String, String)>),
}

impl RequestBody {
    pub fn policy(&self) -> ContentPolicy {
        match self {
            RequestBody::Json(_) => ContentPolicy::Json,
            RequestBody::Form(_) => ContentPolicy::Form,
        }
    }

    fn encode(&self) -> String {
        match self {
            RequestBody::Json(value) => value.to_string(),
            RequestBody::Form(pairs) => encode_pairs(pairs),
        }
    }
}

/// One outbound operation before transport encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    method: HttpMethod,
    endpoint: String,
    query: QueryParams,
    headers: Vec<(String, String)>,
    body: Option<RequestBody>,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            query: QueryParams::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, endpoint)
    }

    pub fn patch(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, endpoint)
    }

    /// Adds or replaces a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.insert(key, value);
        self
    }

    /// Replaces all query parameters.
    pub fn query_params(mut self, params: QueryParams) -> Self {
        self.query = params;
        self
    }

    /// Adds a caller header. Caller headers are merged last and win over
    /// defaults with the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        merge_header(&mut self.headers, name.into(), value.into());
        self
    }

    /// Attaches a JSON body.
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, RequestError> {
        let value = serde_json::to_value(body)?;
        self.with_body(RequestBody::Json(value))
    }

    /// Attaches a form body. `body` must serialize to a flat object; `null`
    /// fields encode as empty values and numbers are stringified as in query
    /// strings.
    pub fn form<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, RequestError> {
        let Value::Object(fields) = serde_json::to_value(body)? else {
            return Err(RequestError::FormBodyNotObject);
        };
        let mut pairs = Vec::with_capacity(fields.len());
        for (key, value) in fields {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => QueryScalar::from_number(&n).to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(RequestError::UnsupportedFormValue { key });
                }
            };
            pairs.push((key, value));
        }
        self.with_body(RequestBody::Form(pairs))
    }

    fn with_body(mut self, body: RequestBody) -> Result<Self, RequestError> {
        if !self.method.allows_body() {
            return Err(RequestError::BodyNotAllowed {
                method: self.method,
            });
        }
        self.body = Some(body);
        Ok(self)
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn params(&self) -> &QueryParams {
        &self.query
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    pub fn content_policy(&self) -> ContentPolicy {
        self.body
            .as_ref()
            .map_or(ContentPolicy::None, RequestBody::policy)
    }
}

/// Sets `name`, replacing an existing header of the same name (ignoring case)
/// in place.
fn merge_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    match headers
        .iter_mut()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
    {
        Some(slot) => *slot = (name, value),
        None => headers.push((name, value)),
    }
}

/// Encodes `spec` against `config`.
///
/// Headers are merged in order: defaults, authentication, `Content-Type` for
/// the body, then caller headers. Each step replaces earlier headers of the
/// same name.
pub fn build_request(config: &ClientConfig, spec: &RequestSpec) -> HttpRequest {
    let mut url = format!(
        "{}/{}",
        config.base_url(),
        spec.endpoint.trim_start_matches('/')
    );
    let query = encode_query(&spec.query);
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }

    let mut headers = Vec::new();
    merge_header(&mut headers, ACCEPT.to_string(), APPLICATION_JSON.to_string());
    merge_header(&mut headers, USER_AGENT.to_string(), CLIENT_USER_AGENT.to_string());
    let (auth_name, auth_value) = config.auth().header();
    merge_header(&mut headers, auth_name, auth_value);
    if let Some(content_type) = spec.content_policy().content_type() {
        merge_header(&mut headers, CONTENT_TYPE.to_string(), content_type.to_string());
    }
    for (name, value) in &spec.headers {
        merge_header(&mut headers, name.clone(), value.clone());
    }

    let body = spec.body.as_ref().map(RequestBody::encode);

    debug!(
        method = %spec.method,
        url = %url,
        content_policy = ?spec.content_policy(),
        "built request"
    );

    HttpRequest {
        method: spec.method,
        url,
        headers,
        body,
        cache: CacheMode::NoStore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> ClientConfig {
        ClientConfig::new("abc123").with_base_url("http://localhost:3000")
    }

    #[test]
    fn get_without_query_has_no_question_mark() {
        let req = build_request(&config(), &RequestSpec::get("clients"));
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/clients");
        assert!(req.body.is_none());
        assert!(req.header(CONTENT_TYPE).is_none());
    }

    #[test]
    fn query_is_appended_in_order() {
        let spec = RequestSpec::get("clients")
            .query("status", "active")
            .query("id", vec!["1", "2"]);
        let req = build_request(&config(), &spec);
        assert_eq!(req.url, "http://localhost:3000/clients?status=active&id=1&id=2");
    }

    #[test]
    fn leading_slash_on_endpoint_is_ignored() {
        let req = build_request(&config(), &RequestSpec::get("/clients/7"));
        assert_eq!(req.url, "http://localhost:3000/clients/7");
    }

    #[test]
    fn default_headers_and_auth_are_present() {
        let req = build_request(&config(), &RequestSpec::get("clients"));
        assert_eq!(
            req.headers,
            vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("User-Agent".to_string(), CLIENT_USER_AGENT.to_string()),
                ("Authorization".to_string(), "Basic YWJjMTIzOg==".to_string()),
            ]
        );
        assert_eq!(req.cache, CacheMode::NoStore);
    }

    #[test]
    fn json_body_sets_content_type() {
        let spec = RequestSpec::post("clients").json(&json!({"name": "Acme"})).unwrap();
        assert_eq!(spec.content_policy(), ContentPolicy::Json);
        let req = build_request(&config(), &spec);
        assert_eq!(req.body.as_deref(), Some(r#"{"name":"Acme"}"#));
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn form_body_is_urlencoded() {
        let spec = RequestSpec::put("clients/1")
            .form(&json!({"name": "Acme & Co", "qty": 2, "active": true, "notes": null}))
            .unwrap();
        let req = build_request(&config(), &spec);
        assert_eq!(
            req.body.as_deref(),
            Some("name=Acme%20%26%20Co&qty=2&active=true&notes=")
        );
        assert_eq!(req.header(CONTENT_TYPE), Some(FORM_URLENCODED));

        let spec = RequestSpec::post("x")
            .form(&json!({"price": 3.0, "rate": 0.5}))
            .unwrap()
            .query("price", 3.0);
        let req = build_request(&config(), &spec);
        assert_eq!(req.body.as_deref(), Some("price=3&rate=0.5"));
        assert!(req.url.ends_with("?price=3"));
    }

    #[test]
    fn form_rejects_nested_values() {
        let err = RequestSpec::post("documents")
            .form(&json!({"items": [1, 2]}))
            .unwrap_err();
        assert!(matches!(err, RequestError::UnsupportedFormValue { key } if key == "items"));

        let err = RequestSpec::post("documents").form(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, RequestError::FormBodyNotObject));
    }

    #[test]
    fn get_and_delete_reject_bodies() {
        for spec in [RequestSpec::get("clients"), RequestSpec::delete("clients/1")] {
            let method = spec.method();
            let err = spec.json(&json!({"a": 1})).unwrap_err();
            assert!(matches!(err, RequestError::BodyNotAllowed { method: m } if m == method));
        }
        let err = RequestSpec::get("clients").form(&json!({"a": 1})).unwrap_err();
        assert!(matches!(err, RequestError::BodyNotAllowed { .. }));
    }

    #[test]
    fn caller_headers_override_defaults_ignoring_case() {
        let spec = RequestSpec::get("clients")
            .header("accept", "text/plain")
            .header("X-Trace", "1");
        let req = build_request(&config(), &spec);
        assert_eq!(req.headers[0], ("accept".to_string(), "text/plain".to_string()));
        assert_eq!(req.header("X-Trace"), Some("1"));
        assert_eq!(req.headers.len(), 4);
    }

    #[test]
    fn unrelated_caller_headers_keep_content_type() {
        let spec = RequestSpec::post("clients")
            .header("X-Request-Id", "abc")
            .json(&json!({}))
            .unwrap();
        let req = build_request(&config(), &spec);
        assert_eq!(req.header(CONTENT_TYPE), Some(APPLICATION_JSON));
    }

    #[test]
    fn explicit_content_type_from_caller_wins() {
        let spec = RequestSpec::post("clients")
            .header("Content-Type", "application/vnd.vendus+json")
            .json(&json!({}))
            .unwrap();
        let req = build_request(&config(), &spec);
        assert_eq!(req.header(CONTENT_TYPE), Some("application/vnd.vendus+json"));
        assert_eq!(
            req.headers
                .iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case(CONTENT_TYPE))
                .count(),
            1
        );
    }

    #[test]
    fn caller_may_replace_authorization() {
        let spec = RequestSpec::get("clients").header("Authorization", "Bearer t");
        let req = build_request(&config(), &spec);
        assert_eq!(req.header("authorization"), Some("Bearer t"));
    }

    #[test]
    fn building_twice_is_identical() {
        let spec = RequestSpec::patch("clients/3")
            .query("x", vec![1, 2])
            .header("X-A", "b")
            .json(&json!({"name": "Acme", "email": "a@b.c"}))
            .unwrap();
        assert_eq!(build_request(&config(), &spec), build_request(&config(), &spec));
    }
}
