// SPDX-License-Identifier: Apache-2.0

use crate::auth::AuthContext;
use crate::service::store_err;
use crate::AppState;
use chrono::Utc;
use std::path::PathBuf;
use taskreel_api::ApiError;
use taskreel_model::{FieldError, Video, VideoId};
use tracing::{info, warn};

/// Writes the clip under the media root, extracts the midpoint thumbnail,
/// records the video, and appends it to the owner's library. A failed
/// thumbnail aborts the upload and removes the written file.
pub async fn upload_video(
    state: &AppState,
    ctx: &AuthContext,
    original_filename: &str,
    bytes: &[u8],
) -> Result<Video, ApiError> {
    if bytes.is_empty() {
        return Err(ApiError::validation_failed(vec![FieldError::new(
            "videos",
            "Video not received",
        )]));
    }
    let stored = state.media.save(original_filename, bytes).await?;
    let thumbnail = match state.media.extract_thumbnail(&stored).await {
        Ok(thumbnail) => thumbnail,
        Err(e) => {
            state.media.remove(&stored.relative);
            return Err(e);
        }
    };

    let video = Video::new(
        ctx.user_id.clone(),
        stored.relative.clone(),
        stored.relative.clone(),
        thumbnail,
    );
    if let Err(e) = state.store.insert_video(&video) {
        state.media.remove(&video.url);
        state.media.remove(&video.thumbnail);
        return Err(store_err(e));
    }

    let mut user = state
        .store
        .find_user(&ctx.user_id)
        .map_err(store_err)?
        .ok_or_else(|| ApiError::not_found("User"))?;
    user.videos.push(video.id.clone());
    user.updated_at = Utc::now();
    if !state.store.update_user(&user).map_err(store_err)? {
        warn!(video_id = %video.id.as_str(), "owner row vanished while linking upload");
    }
    info!(video_id = %video.id.as_str(), url = %video.url, "video uploaded");
    Ok(video)
}

pub async fn list_videos(state: &AppState, ctx: &AuthContext) -> Result<Vec<Video>, ApiError> {
    state
        .store
        .videos_for_user(&ctx.user_id)
        .map_err(store_err)
}

fn load_owned_video(state: &AppState, ctx: &AuthContext, raw_id: &str) -> Result<Video, ApiError> {
    let id = VideoId::parse(raw_id).map_err(|_| ApiError::invalid_video_id(raw_id))?;
    let video = state
        .store
        .find_video(&id)
        .map_err(store_err)?
        .ok_or_else(|| ApiError::not_found("Video"))?;
    if video.user_id != ctx.user_id {
        return Err(ApiError::forbidden("Not allowed to access this video"));
    }
    Ok(video)
}

/// Cascading delete: media files, the record itself, references held by
/// tasks, and the entry in the owner's library all go.
pub async fn delete_video(state: &AppState, ctx: &AuthContext, raw_id: &str) -> Result<(), ApiError> {
    let video = load_owned_video(state, ctx, raw_id)?;
    if !state.store.delete_video(&video.id).map_err(store_err)? {
        return Err(ApiError::not_found("Video"));
    }
    let detached = state
        .store
        .detach_video_from_tasks(&video.id)
        .map_err(store_err)?;
    if let Some(mut user) = state.store.find_user(&ctx.user_id).map_err(store_err)? {
        user.videos.retain(|v| v != &video.id);
        user.updated_at = Utc::now();
        if !state.store.update_user(&user).map_err(store_err)? {
            warn!(video_id = %video.id.as_str(), "owner row vanished while unlinking video");
        }
    }
    state.media.remove(&video.url);
    state.media.remove(&video.thumbnail);
    info!(video_id = %video.id.as_str(), detached_tasks = detached, "video deleted");
    Ok(())
}

/// Resolves the clip to its on-disk path for streaming. The record may
/// outlive the file (or the reverse); a missing file maps to not-found.
pub async fn download_video(
    state: &AppState,
    ctx: &AuthContext,
    raw_id: &str,
) -> Result<(Video, PathBuf), ApiError> {
    let video = load_owned_video(state, ctx, raw_id)?;
    let path = state.media.resolve(&video.url);
    if !path.is_file() {
        return Err(ApiError::not_found("Video file"));
    }
    Ok((video, path))
}
