// SPDX-License-Identifier: Apache-2.0

use super::{api_error_response, finish, ok_response, propagated_request_id, read_upload};
use crate::auth::AuthContext;
use crate::{service, AppState};
use axum::extract::multipart::Multipart;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::{Extension, Json};
use serde_json::json;
use std::time::Instant;
use taskreel_api::{
    user_public, LoginRequest, RegisterRequest, UpdateUserRequest, VerifyEmailRequest,
};
use tracing::info;

pub(crate) async fn register_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RegisterRequest>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/user/register", "request start");
    let resp = match service::users::register(&state, req).await {
        Ok(user) => ok_response(user_public(&user), "User added successfully"),
        Err(e) => api_error_response(&e),
    };
    finish(&state, "/user/register", started, &request_id, resp).await
}

pub(crate) async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match service::users::login(&state, &req.email, &req.password).await {
        Ok(login) => ok_response(login, "User logged in successfully"),
        Err(e) => api_error_response(&e),
    };
    finish(&state, "/user/login", started, &request_id, resp).await
}

pub(crate) async fn verify_email_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<VerifyEmailRequest>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match service::users::verify_email(&state, &req.token).await {
        Ok(()) => ok_response(json!(null), "Email verified successfully"),
        Err(e) => api_error_response(&e),
    };
    finish(&state, "/user/verify-email", started, &request_id, resp).await
}

pub(crate) async fn get_user_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match service::users::get_user(&state, &ctx).await {
        Ok(user) => ok_response(user_public(&user), "User fetched successfully"),
        Err(e) => api_error_response(&e),
    };
    finish(&state, "/user/get-user", started, &request_id, resp).await
}

pub(crate) async fn update_user_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
    Json(req): Json<UpdateUserRequest>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match service::users::update_user(&state, &ctx, req).await {
        Ok(user) => ok_response(user_public(&user), "User updated successfully"),
        Err(e) => api_error_response(&e),
    };
    finish(&state, "/user/update", started, &request_id, resp).await
}

pub(crate) async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match service::users::delete_user(&state, &ctx).await {
        Ok(()) => ok_response(json!(null), "User deleted successfully"),
        Err(e) => api_error_response(&e),
    };
    finish(&state, "/user/delete", started, &request_id, resp).await
}

pub(crate) async fn upload_profile_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match read_upload(&mut multipart, "profilePicture").await {
        Ok((file_name, bytes)) => {
            match service::users::set_profile_picture(&state, &ctx, &file_name, &bytes).await {
                Ok(user) => ok_response(
                    json!({ "profilePicture": user.profile_picture }),
                    "Profile picture uploaded successfully",
                ),
                Err(e) => api_error_response(&e),
            }
        }
        Err(e) => api_error_response(&e),
    };
    finish(&state, "/user/upload-profile", started, &request_id, resp).await
}
