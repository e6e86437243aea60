//! HTTP/JSON transport
//!
//! # API Endpoints
//!
//! ## POST /kv
//!
//! Create a record. Fails with 409 if the key exists.
//!
//! ```json
//! {"key": "user:123", "value": {"name": "ada"}}
//! ```
//!
//! Responds 201 with `{"message": "OK", "key": ..., "value": ...}`.
//!
//! ## PUT /kv/{key}
//!
//! Replace the value of an existing record. Body: `{"value": ...}`.
//!
//! ## GET /kv/{key}
//!
//! Responds `{"message": "OK", "value": ...}`.
//!
//! ## DELETE /kv/{key}
//!
//! Responds `{"message": "OK"}`.
//!
//! ## GET /kv
//!
//! Every record sorted by key, as `{"message": "OK", "data": [...]}`.
//! Only routed when bulk listing is enabled.
//!
//! ## Errors
//!
//! Failures respond `{"message": "<reason>"}` with status 400, 409, 404 or 429.
//! A body or path key that cannot be extracted is a 400, decided after the
//! admission check like any other request.
//!
//! ## GET /health
//!
//! Health check endpoint. Returns "OK" with 200 status.
//!
//! ## GET /metrics
//!
//! Prometheus text format.

use super::Transport;
use crate::metrics::{Metrics, Operation};
use crate::types::{ErrorResponse, OkResponse};
use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
};
use kvgate::{KvError, KvService};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

const MALFORMED_BODY: &str = "malformed JSON body";
const MISSING_CONTENT_TYPE: &str = "expected Content-Type: application/json";
const INVALID_PATH_KEY: &str = "invalid key in path";

/// HTTP transport implementation
pub struct HttpTransport {
    addr: SocketAddr,
    enable_list: bool,
}

impl HttpTransport {
    pub fn new(host: &str, port: u16, enable_list: bool) -> Result<Self> {
        let addr = format!("{host}:{port}")
            .parse()
            .with_context(|| format!("Invalid HTTP address {host}:{port}"))?;
        Ok(Self { addr, enable_list })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn start(self, service: Arc<KvService>, metrics: Arc<Metrics>) -> Result<()> {
        let app = router(service, metrics, self.enable_list);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("Failed to bind HTTP listener on {}", self.addr))?;
        tracing::info!("HTTP server listening on {}", self.addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}

struct AppState {
    service: Arc<KvService>,
    metrics: Arc<Metrics>,
}

/// Build the HTTP routes over a shared service
pub fn router(service: Arc<KvService>, metrics: Arc<Metrics>, enable_list: bool) -> Router {
    let app_state = Arc::new(AppState { service, metrics });

    let collection = if enable_list {
        post(create_record).get(list_records)
    } else {
        post(create_record)
    };

    Router::new()
        .route("/kv", collection.fallback(not_found))
        .route(
            "/kv/{key}",
            put(update_record)
                .get(get_record)
                .delete(delete_record)
                .fallback(not_found),
        )
        .route("/health", get(|| async { "OK" }))
        .route("/metrics", get(export_metrics))
        .fallback(not_found)
        .with_state(app_state)
}

/// [`KvError`] as an HTTP response
struct ApiError(KvError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            KvError::BadRequest(_) => StatusCode::BAD_REQUEST,
            KvError::Conflict => StatusCode::CONFLICT,
            KvError::NotFound => StatusCode::NOT_FOUND,
            KvError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        };
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

/// One in-flight client request, for logging and metrics
struct Call {
    operation: Operation,
    method: Method,
    uri: Uri,
    started: Instant,
}

impl Call {
    fn new(operation: Operation, method: Method, uri: Uri) -> Self {
        Self {
            operation,
            method,
            uri,
            started: Instant::now(),
        }
    }

    fn finish(
        self,
        state: &AppState,
        result: Result<(StatusCode, OkResponse), KvError>,
    ) -> Response {
        let latency_us = self.started.elapsed().as_micros() as u64;
        state
            .metrics
            .record_request(self.operation, latency_us, result.as_ref().map(|_| ()));

        match result {
            Ok((status, body)) => (status, Json(body)).into_response(),
            Err(err) => {
                tracing::warn!(
                    method = %self.method,
                    path = %self.uri.path(),
                    kind = err.kind(),
                    reason = %err,
                    "request failed"
                );
                ApiError(err).into_response()
            }
        }
    }
}

/// Client-facing reason for a body that could not be extracted
fn body_rejection_reason(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => MISSING_CONTENT_TYPE,
        _ => MALFORMED_BODY,
    }
}

/// Split a request body into its `key` and `value` fields
///
/// A body that is valid JSON but not an object has neither field.
fn fields(body: Value) -> (Option<Value>, Option<Value>) {
    match body {
        Value::Object(mut map) => (map.remove("key"), map.remove("value")),
        _ => (None, None),
    }
}

async fn create_record(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let call = Call::new(Operation::Create, method, uri);

    let result = match body {
        Ok(Json(body)) => {
            let (key, value) = fields(body);
            state
                .service
                .create(key.as_ref(), value)
                .map(|record| (StatusCode::CREATED, OkResponse::record(record)))
        }
        Err(rejection) => Err(state
            .service
            .refuse_malformed(body_rejection_reason(&rejection))),
    };

    call.finish(&state, result)
}

async fn update_record(
    State(state): State<Arc<AppState>>,
    key: Result<Path<String>, PathRejection>,
    method: Method,
    uri: Uri,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let call = Call::new(Operation::Update, method, uri);

    let result = match (key, body) {
        (Err(_), _) => Err(state.service.refuse_malformed(INVALID_PATH_KEY)),
        (Ok(_), Err(rejection)) => Err(state
            .service
            .refuse_malformed(body_rejection_reason(&rejection))),
        (Ok(Path(key)), Ok(Json(body))) => {
            let (_, value) = fields(body);
            state
                .service
                .update(&key, value)
                .map(|record| (StatusCode::OK, OkResponse::record(record)))
        }
    };

    call.finish(&state, result)
}

async fn get_record(
    State(state): State<Arc<AppState>>,
    key: Result<Path<String>, PathRejection>,
    method: Method,
    uri: Uri,
) -> Response {
    let call = Call::new(Operation::Get, method, uri);
    let result = match key {
        Ok(Path(key)) => state
            .service
            .get(&key)
            .map(|value| (StatusCode::OK, OkResponse::value(value))),
        Err(_) => Err(state.service.refuse_malformed(INVALID_PATH_KEY)),
    };
    call.finish(&state, result)
}

async fn delete_record(
    State(state): State<Arc<AppState>>,
    key: Result<Path<String>, PathRejection>,
    method: Method,
    uri: Uri,
) -> Response {
    let call = Call::new(Operation::Delete, method, uri);
    let result = match key {
        Ok(Path(key)) => state
            .service
            .delete(&key)
            .map(|()| (StatusCode::OK, OkResponse::ok())),
        Err(_) => Err(state.service.refuse_malformed(INVALID_PATH_KEY)),
    };
    call.finish(&state, result)
}

async fn list_records(State(state): State<Arc<AppState>>, method: Method, uri: Uri) -> Response {
    let call = Call::new(Operation::List, method, uri);
    let result = state
        .service
        .list()
        .map(|records| (StatusCode::OK, OkResponse::data(records)));
    call.finish(&state, result)
}

async fn export_metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics.update_stored_keys(state.service.len());
    state.metrics.export_prometheus()
}

async fn not_found(method: Method, uri: Uri) -> Response {
    let err = KvError::NotFound;
    tracing::warn!(method = %method, path = %uri.path(), reason = %err, "no route");
    ApiError(err).into_response()
}
