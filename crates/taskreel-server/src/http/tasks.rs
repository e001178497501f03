// SPDX-License-Identifier: Apache-2.0

use super::{api_error_response, finish, ok_response, propagated_request_id};
use crate::auth::AuthContext;
use crate::{service, AppState};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::{Extension, Json};
use serde_json::json;
use std::collections::HashMap;
use std::time::Instant;
use taskreel_api::{ApiError, CreateTaskRequest, UpdateTaskRequest};
use taskreel_model::FieldError;

fn require_id(params: &HashMap<String, String>) -> Result<&str, ApiError> {
    params
        .get("id")
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            ApiError::validation_failed(vec![FieldError::new("id", "id is required")])
        })
}

pub(crate) async fn create_task_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
    Json(req): Json<CreateTaskRequest>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match service::tasks::create_task(&state, &ctx, req).await {
        Ok(task) => ok_response(task, "Task created successfully"),
        Err(e) => api_error_response(&e),
    };
    finish(&state, "/todo/create", started, &request_id, resp).await
}

pub(crate) async fn get_tasks_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let status = params.get("status").map(String::as_str);
    let resp = match service::tasks::get_tasks(&state, &ctx, status).await {
        Ok(tasks) => ok_response(tasks, "Tasks fetched successfully"),
        Err(e) => api_error_response(&e),
    };
    finish(&state, "/todo/get", started, &request_id, resp).await
}

/// Same listing as `/todo/get`; kept as its own route for client
/// compatibility.
pub(crate) async fn filter_tasks_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let status = params.get("status").map(String::as_str);
    let resp = match service::tasks::get_tasks(&state, &ctx, status).await {
        Ok(tasks) => ok_response(tasks, "Tasks fetched successfully"),
        Err(e) => api_error_response(&e),
    };
    finish(&state, "/todo/filter", started, &request_id, resp).await
}

pub(crate) async fn get_task_by_id_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match require_id(&params) {
        Ok(id) => match service::tasks::get_task_by_id(&state, &ctx, id).await {
            Ok(task) => ok_response(task, "Task fetched successfully"),
            Err(e) => api_error_response(&e),
        },
        Err(e) => api_error_response(&e),
    };
    finish(&state, "/todo/get-by-id", started, &request_id, resp).await
}

pub(crate) async fn update_task_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    Json(req): Json<UpdateTaskRequest>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match require_id(&params) {
        Ok(id) => match service::tasks::update_task(&state, &ctx, id, req).await {
            Ok(task) => ok_response(task, "Task updated successfully"),
            Err(e) => api_error_response(&e),
        },
        Err(e) => api_error_response(&e),
    };
    finish(&state, "/todo/update", started, &request_id, resp).await
}

pub(crate) async fn delete_task_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match require_id(&params) {
        Ok(id) => match service::tasks::delete_task(&state, &ctx, id).await {
            Ok(()) => ok_response(json!(null), "Task deleted successfully"),
            Err(e) => api_error_response(&e),
        },
        Err(e) => api_error_response(&e),
    };
    finish(&state, "/todo/delete", started, &request_id, resp).await
}
