// SPDX-License-Identifier: Apache-2.0

use crate::AppState;
use axum::extract::multipart::Multipart;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::time::Instant;
use taskreel_api::{map_error, ApiError};
use taskreel_model::FieldError;

pub(crate) mod tasks;
pub(crate) mod users;
pub(crate) mod videos;

pub(crate) fn api_error_response(err: &ApiError) -> Response {
    let status = StatusCode::from_u16(map_error(err).status_code)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": err }))).into_response()
}

pub(crate) fn ok_response<T: Serialize>(data: T, message: &str) -> Response {
    Json(json!({ "data": data, "message": message })).into_response()
}

fn make_request_id(state: &AppState) -> String {
    let id = state.request_id_seed.fetch_add(1, Ordering::Relaxed);
    format!("req-{id:016x}")
}

fn propagated_request_id(headers: &HeaderMap, state: &AppState) -> String {
    if let Some(raw) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    make_request_id(state)
}

fn with_request_id(mut response: Response, request_id: &str) -> Response {
    if let Ok(v) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert("x-request-id", v);
    }
    response
}

async fn finish(
    state: &AppState,
    route: &str,
    started: Instant,
    request_id: &str,
    resp: Response,
) -> Response {
    state
        .metrics
        .observe_request(route, resp.status(), started.elapsed())
        .await;
    with_request_id(resp, request_id)
}

/// Pulls the first file part out of a multipart body. `field` only names
/// the part in the error message; any part carrying a filename is taken.
async fn read_upload(multipart: &mut Multipart, field: &str) -> Result<(String, Vec<u8>), ApiError> {
    let invalid =
        |message: String| ApiError::validation_failed(vec![FieldError::new("file", message)]);
    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| invalid(format!("malformed multipart body: {e}")))?
    {
        let file_name = part.file_name().map(ToString::to_string);
        if let Some(file_name) = file_name {
            let bytes = part
                .bytes()
                .await
                .map_err(|e| invalid(format!("upload read failed: {e}")))?;
            return Ok((file_name, bytes.to_vec()));
        }
    }
    Err(ApiError::validation_failed(vec![FieldError::new(
        field,
        format!("{field} not received"),
    )]))
}

pub(crate) async fn healthz_handler(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = make_request_id(&state);
    let resp = (StatusCode::OK, "ok").into_response();
    finish(&state, "/healthz", started, &request_id, resp).await
}

pub(crate) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = make_request_id(&state);
    let body = state.metrics.render().await;
    let resp = (StatusCode::OK, body).into_response();
    finish(&state, "/metrics", started, &request_id, resp).await
}

pub(crate) async fn version_handler(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = make_request_id(&state);
    let payload = json!({
        "server": {
            "crate": crate::CRATE_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "config_schema_version": crate::config::CONFIG_SCHEMA_VERSION,
        }
    });
    let resp = Json(payload).into_response();
    finish(&state, "/v1/version", started, &request_id, resp).await
}
