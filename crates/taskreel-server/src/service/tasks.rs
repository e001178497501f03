// SPDX-License-Identifier: Apache-2.0

use crate::auth::AuthContext;
use crate::notify::completion_email;
use crate::service::store_err;
use crate::AppState;
use chrono::Utc;
use taskreel_api::{
    task_response, ApiError, CreateTaskRequest, TaskResponse, UpdateTaskRequest,
};
use taskreel_model::{FieldError, Task, TaskId, TaskStatus, VideoId};
use tracing::{info, warn};

/// Resolves raw video id strings against the caller's library. Any id
/// that does not parse, does not exist, or belongs to another user is
/// rejected the same way, so existence of foreign clips never leaks.
fn resolve_video_refs(
    state: &AppState,
    ctx: &AuthContext,
    ids: &[String],
) -> Result<Vec<VideoId>, ApiError> {
    let mut refs = Vec::with_capacity(ids.len());
    for raw in ids {
        let id = VideoId::parse(raw).map_err(|_| ApiError::invalid_video_id(raw))?;
        match state.store.find_video(&id).map_err(store_err)? {
            Some(video) if video.user_id == ctx.user_id => refs.push(id),
            _ => return Err(ApiError::invalid_video_id(raw)),
        }
    }
    Ok(refs)
}

fn load_owned_task(state: &AppState, ctx: &AuthContext, raw_id: &str) -> Result<Task, ApiError> {
    let id = TaskId::parse(raw_id)
        .map_err(|e| ApiError::validation_failed(vec![FieldError::new("id", e.to_string())]))?;
    let task = state
        .store
        .find_task(&id)
        .map_err(store_err)?
        .ok_or_else(|| ApiError::not_found("Task"))?;
    if task.user_id != ctx.user_id {
        return Err(ApiError::forbidden("Not allowed to access this task"));
    }
    Ok(task)
}

fn join_videos(state: &AppState, ctx: &AuthContext, task: &Task) -> Result<TaskResponse, ApiError> {
    let videos = state
        .store
        .videos_for_user(&ctx.user_id)
        .map_err(store_err)?;
    Ok(task_response(task, &videos))
}

pub async fn create_task(
    state: &AppState,
    ctx: &AuthContext,
    req: CreateTaskRequest,
) -> Result<TaskResponse, ApiError> {
    let videos = resolve_video_refs(state, ctx, &req.video_id)?;
    let task = Task::new(ctx.user_id.clone(), req.title, videos);
    task.validate().map_err(ApiError::validation_failed)?;
    state.store.insert_task(&task).map_err(store_err)?;
    join_videos(state, ctx, &task)
}

pub async fn get_tasks(
    state: &AppState,
    ctx: &AuthContext,
    status: Option<&str>,
) -> Result<Vec<TaskResponse>, ApiError> {
    let status = status
        .map(TaskStatus::parse)
        .transpose()
        .map_err(|e| ApiError::validation_failed(vec![FieldError::new("status", e.to_string())]))?;
    let tasks = state
        .store
        .tasks_for_user(&ctx.user_id, status)
        .map_err(store_err)?;
    let videos = state
        .store
        .videos_for_user(&ctx.user_id)
        .map_err(store_err)?;
    Ok(tasks.iter().map(|t| task_response(t, &videos)).collect())
}

pub async fn get_task_by_id(
    state: &AppState,
    ctx: &AuthContext,
    raw_id: &str,
) -> Result<TaskResponse, ApiError> {
    let task = load_owned_task(state, ctx, raw_id)?;
    join_videos(state, ctx, &task)
}

/// Overwrites title and status; video references are replaced when the
/// request carries a list and kept as stored otherwise. The completion
/// notification fires only on the ToDo -> Completed edge; re-saving an
/// already completed task stays silent, and a task reopened and completed
/// again notifies again.
pub async fn update_task(
    state: &AppState,
    ctx: &AuthContext,
    raw_id: &str,
    req: UpdateTaskRequest,
) -> Result<TaskResponse, ApiError> {
    let mut task = load_owned_task(state, ctx, raw_id)?;
    let status = TaskStatus::parse(&req.status)
        .map_err(|e| ApiError::validation_failed(vec![FieldError::new("status", e.to_string())]))?;
    let videos = match &req.video_id {
        Some(ids) => resolve_video_refs(state, ctx, ids)?,
        None => task.videos.clone(),
    };

    let previous_status = task.status;
    task.title = req.title;
    task.status = status;
    task.videos = videos;
    task.validate().map_err(ApiError::validation_failed)?;
    task.updated_at = Utc::now();
    if !state.store.update_task(&task).map_err(store_err)? {
        return Err(ApiError::not_found("Task"));
    }

    if previous_status != TaskStatus::Completed && task.status == TaskStatus::Completed {
        notify_completion(state, ctx, &task).await;
    }
    join_videos(state, ctx, &task)
}

/// Dispatch is advisory: a failed or skipped notification never fails the
/// update that triggered it.
async fn notify_completion(state: &AppState, ctx: &AuthContext, task: &Task) {
    let email = match state.store.find_user(&task.user_id) {
        Ok(Some(owner)) => owner.email,
        Ok(None) => {
            warn!(task_id = %task.id.as_str(), "task owner vanished; skipping notification");
            return;
        }
        Err(e) => {
            warn!(task_id = %task.id.as_str(), "owner lookup failed ({e}); notifying token email");
            ctx.email.clone()
        }
    };
    let (subject, body) = completion_email(&task.title);
    if state.sink.send(&email, &subject, &body).await {
        info!(task_id = %task.id.as_str(), "completion notification dispatched");
    } else {
        warn!(task_id = %task.id.as_str(), "completion notification dispatch failed");
    }
}

pub async fn delete_task(state: &AppState, ctx: &AuthContext, raw_id: &str) -> Result<(), ApiError> {
    let task = load_owned_task(state, ctx, raw_id)?;
    if !state.store.delete_task(&task.id).map_err(store_err)? {
        return Err(ApiError::not_found("Task"));
    }
    Ok(())
}
