use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Fixed timestamp stamped on created records so responses are reproducible.
pub const FIXTURE_DATE: &str = "2024-01-15";

pub type Record = Map<String, Value>;

#[derive(Default)]
pub struct Db {
    next_client_id: u64,
    next_document_id: u64,
    clients: BTreeMap<u64, Record>,
}

#[derive(Clone)]
pub struct AppState {
    expected_auth: Arc<str>,
    db: Arc<RwLock<Db>>,
}

type ApiResult = Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)>;

fn api_error(status: StatusCode, code: &str, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({ "errors": [{ "code": code, "message": message }] })),
    )
}

/// Router accepting Basic credentials for `api_key` with an empty password.
pub fn app(api_key: &str) -> Router {
    let state = AppState {
        expected_auth: format!("Basic {}", STANDARD.encode(format!("{api_key}:"))).into(),
        db: Arc::new(RwLock::new(Db::default())),
    };
    Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route("/clients/{id}", get(get_client).patch(update_client))
        .route("/documents", post(create_document))
        .route("/echo", any(echo))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == &*state.expected_auth);
    if !authorized {
        tracing::warn!(path = %request.uri().path(), "rejected request with bad credentials");
        return api_error(StatusCode::UNAUTHORIZED, "A001", "Invalid API key").into_response();
    }
    next.run(request).await
}

fn matches_filters(record: &Record, filters: &[(String, String)]) -> bool {
    let ids: Vec<&str> = filters
        .iter()
        .filter(|(k, _)| k == "id")
        .map(|(_, v)| v.as_str())
        .collect();
    if !ids.is_empty() {
        let id = record.get("id").map(Value::to_string).unwrap_or_default();
        if !ids.contains(&id.as_str()) {
            return false;
        }
    }
    filters.iter().all(|(key, wanted)| match key.as_str() {
        "status" | "name" | "email" | "fiscal_id" | "external_reference" => {
            record.get(key).and_then(Value::as_str) == Some(wanted.as_str())
        }
        "q" => record
            .get("name")
            .and_then(Value::as_str)
            .is_some_and(|name| name.to_lowercase().contains(&wanted.to_lowercase())),
        _ => true,
    })
}

async fn list_clients(
    State(state): State<AppState>,
    Query(filters): Query<Vec<(String, String)>>,
) -> Json<Vec<Value>> {
    let db = state.db.read().await;
    let clients = db
        .clients
        .values()
        .filter(|record| matches_filters(record, &filters))
        .map(|record| {
            let mut listed = record.clone();
            listed.remove("balance");
            Value::Object(listed)
        })
        .collect();
    Json(clients)
}

async fn create_client(State(state): State<AppState>, Json(input): Json<Record>) -> ApiResult {
    let has_name = input
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.trim().is_empty());
    if !has_name {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "V001",
            "name is required",
        ));
    }

    let mut db = state.db.write().await;
    db.next_client_id += 1;
    let id = db.next_client_id;

    let mut record = Record::new();
    record.insert("id".to_string(), json!(id));
    record.insert("status".to_string(), json!("active"));
    record.insert("date".to_string(), json!(FIXTURE_DATE));
    apply_fields(&mut record, input);
    record.insert(
        "balance".to_string(),
        json!({ "total": "0.00", "on_time": "0.00", "overdue": "0.00" }),
    );
    db.clients.insert(id, record.clone());
    tracing::info!(id, "created client");
    Ok((StatusCode::CREATED, Json(Value::Object(record))))
}

/// Copies writable fields, mapping `price_group_id` onto a price group object.
fn apply_fields(record: &mut Record, input: Record) {
    for (key, value) in input {
        match key.as_str() {
            "id" | "balance" | "date" | "status" => {}
            "price_group_id" => {
                record.insert(
                    "price_group".to_string(),
                    json!({ "id": value, "title": "Default", "is_default": "yes" }),
                );
            }
            _ => {
                record.insert(key, value);
            }
        }
    }
}

async fn get_client(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult {
    let db = state.db.read().await;
    db.clients
        .get(&id)
        .map(|record| (StatusCode::OK, Json(Value::Object(record.clone()))))
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "N001", "Client not found"))
}

async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<Record>,
) -> ApiResult {
    let mut db = state.db.write().await;
    let record = db
        .clients
        .get_mut(&id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "N001", "Client not found"))?;
    apply_fields(record, input);
    Ok((StatusCode::OK, Json(Value::Object(record.clone()))))
}

fn amount(value: Option<&Value>) -> f64 {
    value
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
}

async fn create_document(State(state): State<AppState>, Json(input): Json<Value>) -> ApiResult {
    let Some(kind) = input.get("type").and_then(Value::as_str) else {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "V002",
            "type is required",
        ));
    };
    let items = input
        .get("items")
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
        .ok_or_else(|| {
            api_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "V003",
                "at least one item is required",
            )
        })?;

    let gross: f64 = items
        .iter()
        .map(|item| amount(item.get("qty")) * amount(item.get("gross_price")))
        .sum();

    let mut db = state.db.write().await;
    db.next_document_id += 1;
    let id = db.next_document_id;
    tracing::info!(id, kind, "issued document");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": id,
            "type": kind,
            "number": format!("{kind} 01P2024/{id}"),
            "date": FIXTURE_DATE,
            "amount_gross": format!("{gross:.2}"),
        })),
    ))
}

/// Reflects the request back so tests can assert on the exact wire encoding.
/// Repeated headers are joined with `, `.
async fn echo(
    method: Method,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    let headers: Map<String, Value> = headers
        .keys()
        .map(|name| {
            let values: Vec<&str> = headers
                .get_all(name)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .collect();
            (name.as_str().to_string(), json!(values.join(", ")))
        })
        .collect();
    Json(json!({
        "method": method.as_str(),
        "query": query,
        "headers": headers,
        "body": body,
    }))
}
