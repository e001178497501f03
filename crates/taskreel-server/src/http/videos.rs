// SPDX-License-Identifier: Apache-2.0

use super::{api_error_response, finish, ok_response, propagated_request_id, read_upload};
use crate::auth::AuthContext;
use crate::{service, AppState};
use axum::body::Body;
use axum::extract::multipart::Multipart;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use serde_json::json;
use std::collections::HashMap;
use std::time::Instant;
use taskreel_api::{video_dto, ApiError};
use taskreel_model::{FieldError, Video};
use tokio_util::io::ReaderStream;

fn require_video_id(params: &HashMap<String, String>) -> Result<&str, ApiError> {
    params
        .get("videoId")
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            ApiError::validation_failed(vec![FieldError::new("videoId", "videoId is required")])
        })
}

pub(crate) async fn upload_video_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match read_upload(&mut multipart, "videos").await {
        Ok((file_name, bytes)) => {
            match service::videos::upload_video(&state, &ctx, &file_name, &bytes).await {
                Ok(video) => ok_response(video_dto(&video), "Video uploaded successfully"),
                Err(e) => api_error_response(&e),
            }
        }
        Err(e) => api_error_response(&e),
    };
    finish(&state, "/user/upload-video", started, &request_id, resp).await
}

pub(crate) async fn list_videos_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match service::videos::list_videos(&state, &ctx).await {
        Ok(videos) => ok_response(
            videos.iter().map(video_dto).collect::<Vec<_>>(),
            "Videos fetched successfully",
        ),
        Err(e) => api_error_response(&e),
    };
    finish(&state, "/user/videos", started, &request_id, resp).await
}

pub(crate) async fn delete_video_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match require_video_id(&params) {
        Ok(id) => match service::videos::delete_video(&state, &ctx, id).await {
            Ok(()) => ok_response(json!(null), "Video deleted successfully"),
            Err(e) => api_error_response(&e),
        },
        Err(e) => api_error_response(&e),
    };
    finish(&state, "/user/delete-video", started, &request_id, resp).await
}

fn attachment_response(video: &Video, file: tokio::fs::File) -> Response {
    let stream = ReaderStream::new(file);
    let mut resp = Body::from_stream(stream).into_response();
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("video/mp4"),
    );
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", video.url)) {
        resp.headers_mut().insert(header::CONTENT_DISPOSITION, value);
    }
    resp
}

pub(crate) async fn download_video_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match require_video_id(&params) {
        Ok(id) => match service::videos::download_video(&state, &ctx, id).await {
            Ok((video, path)) => match tokio::fs::File::open(&path).await {
                Ok(file) => attachment_response(&video, file),
                Err(e) => {
                    api_error_response(&ApiError::internal(format!("media open failed: {e}")))
                }
            },
            Err(e) => api_error_response(&e),
        },
        Err(e) => api_error_response(&e),
    };
    finish(&state, "/user/download-video", started, &request_id, resp).await
}
