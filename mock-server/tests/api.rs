use axum::http::{self, Request, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::{json, Value};
use tower::ServiceExt;

const API_KEY: &str = "test-key";

fn auth() -> String {
    format!("Basic {}", STANDARD.encode(format!("{API_KEY}:")))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, auth())
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, auth())
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_credentials_return_401() {
    let resp = app(API_KEY)
        .oneshot(Request::builder().uri("/clients").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["code"], "A001");
}

#[tokio::test]
async fn wrong_key_returns_401() {
    let resp = app("other-key").oneshot(get("/clients")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- clients ---

#[tokio::test]
async fn list_clients_empty() {
    let resp = app(API_KEY).oneshot(get("/clients")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!([]));
}

#[tokio::test]
async fn create_client_returns_201() {
    let resp = app(API_KEY)
        .oneshot(json_request(
            "POST",
            "/clients",
            r#"{"name":"Acme","fiscal_id":"999999990","price_group_id":2}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let client = body_json(resp).await;
    assert_eq!(client["id"], 1);
    assert_eq!(client["name"], "Acme");
    assert_eq!(client["status"], "active");
    assert_eq!(client["price_group"]["id"], 2);
    assert_eq!(client["balance"]["total"], "0.00");
}

#[tokio::test]
async fn create_client_without_name_returns_422() {
    let resp = app(API_KEY)
        .oneshot(json_request("POST", "/clients", r#"{"email":"a@b.pt"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["message"], "name is required");
}

#[tokio::test]
async fn get_client_not_found() {
    let resp = app(API_KEY).oneshot(get("/clients/42")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["code"], "N001");
}

#[tokio::test]
async fn get_client_bad_id_returns_400() {
    let resp = app(API_KEY).oneshot(get("/clients/abc")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_client_not_found() {
    let resp = app(API_KEY)
        .oneshot(json_request("PATCH", "/clients/42", r#"{"name":"Nope"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- documents ---

#[tokio::test]
async fn create_document_totals_items() {
    let resp = app(API_KEY)
        .oneshot(json_request(
            "POST",
            "/documents",
            r#"{"type":"FT","items":[{"qty":"2","gross_price":"1.25"},{"qty":"1","gross_price":"10"}]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let doc = body_json(resp).await;
    assert_eq!(doc["type"], "FT");
    assert_eq!(doc["number"], "FT 01P2024/1");
    assert_eq!(doc["amount_gross"], "12.50");
}

#[tokio::test]
async fn create_document_without_items_returns_422() {
    let resp = app(API_KEY)
        .oneshot(json_request("POST", "/documents", r#"{"type":"FT","items":[]}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- echo ---

#[tokio::test]
async fn echo_reflects_repeated_query_and_body() {
    let req = Request::builder()
        .method("PUT")
        .uri("/echo?id=1&id=2&name=a%20b")
        .header(http::header::AUTHORIZATION, auth())
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("x-tag", "a")
        .header("x-tag", "b")
        .body("name=Acme".to_string())
        .unwrap();
    let resp = app(API_KEY).oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo = body_json(resp).await;
    assert_eq!(echo["method"], "PUT");
    assert_eq!(echo["query"], json!([["id", "1"], ["id", "2"], ["name", "a b"]]));
    assert_eq!(echo["headers"]["content-type"], "application/x-www-form-urlencoded");
    assert_eq!(echo["headers"]["x-tag"], "a, b");
    assert_eq!(echo["body"], "name=Acme");
}

// --- full lifecycle ---

#[tokio::test]
async fn client_lifecycle() {
    use tower::Service;

    let mut app = app(API_KEY).into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/clients", r#"{"name":"Walk Co","email":"w@co.pt"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    let id = created["id"].as_u64().unwrap();

    // list omits balance
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/clients?status=active"))
        .await
        .unwrap();
    let listed = body_json(resp).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert!(listed[0].get("balance").is_none());

    // patch
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PATCH",
            &format!("/clients/{id}"),
            r#"{"email":"new@co.pt"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await;
    assert_eq!(updated["email"], "new@co.pt");
    assert_eq!(updated["name"], "Walk Co"); // unchanged

    // get keeps balance
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/clients/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched = body_json(resp).await;
    assert_eq!(fetched["email"], "new@co.pt");
    assert_eq!(fetched["balance"]["overdue"], "0.00");

    // filter that excludes it
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/clients?status=inactive"))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await, json!([]));
}
