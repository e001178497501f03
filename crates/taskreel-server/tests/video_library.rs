// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use taskreel_api::{ApiErrorCode, CreateTaskRequest, RegisterRequest, UpdateTaskRequest};
use taskreel_model::Video;
use taskreel_server::auth::AuthContext;
use taskreel_server::notify::{MemorySink, NotificationSink};
use taskreel_server::service;
use taskreel_server::{ApiConfig, AppState};
use taskreel_store::Store;

fn test_state(dir: &tempfile::TempDir) -> AppState {
    let sink = Arc::new(MemorySink::new());
    let config = ApiConfig {
        media_dir: dir.path().join("media"),
        ..ApiConfig::default()
    };
    let store = Store::open_in_memory().expect("in-memory store");
    AppState::new(config, store, sink as Arc<dyn NotificationSink>).expect("app state")
}

async fn verified_user(state: &AppState, email: &str) -> AuthContext {
    let user = service::users::register(
        state,
        RegisterRequest {
            user_name: email.split('@').next().unwrap_or("user").to_string(),
            email: email.to_string(),
            password: "Str0ng!Pass".to_string(),
        },
    )
    .await
    .expect("register");
    service::users::verify_email(state, &user.verification_token)
        .await
        .expect("verify");
    AuthContext {
        user_id: user.id,
        email: user.email,
    }
}

/// Seeds a clip the way a finished upload would have left it: file under
/// the media root, record in the store, id in the owner's library.
async fn seed_video(state: &AppState, ctx: &AuthContext, name: &str) -> Video {
    let stored = state
        .media
        .save(name, b"not really a video")
        .await
        .expect("save clip");
    let video = Video::new(
        ctx.user_id.clone(),
        stored.relative.clone(),
        stored.relative.clone(),
        String::new(),
    );
    state.store.insert_video(&video).expect("insert video");
    let mut user = state
        .store
        .find_user(&ctx.user_id)
        .expect("find user")
        .expect("user exists");
    user.videos.push(video.id.clone());
    assert!(state.store.update_user(&user).expect("link video"));
    video
}

#[tokio::test]
async fn upload_rejects_an_empty_body() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = test_state(&dir);
    let ctx = verified_user(&state, "alice@example.com").await;

    let err = service::videos::upload_video(&state, &ctx, "clip.mp4", &[])
        .await
        .expect_err("empty upload");
    assert_eq!(err.code, ApiErrorCode::ValidationFailed);
}

#[tokio::test]
async fn delete_video_cascades_everywhere() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = test_state(&dir);
    let ctx = verified_user(&state, "alice@example.com").await;
    let video = seed_video(&state, &ctx, "clip.mp4").await;

    let task = service::tasks::create_task(
        &state,
        &ctx,
        CreateTaskRequest {
            title: "Watch the clip".to_string(),
            video_id: vec![video.id.as_str().to_string()],
        },
    )
    .await
    .expect("create task");
    assert_eq!(task.videos.len(), 1);

    service::videos::delete_video(&state, &ctx, video.id.as_str())
        .await
        .expect("delete video");

    // Record, task reference, library entry, and file are all gone.
    assert!(service::videos::list_videos(&state, &ctx)
        .await
        .expect("list")
        .is_empty());
    let task = service::tasks::get_task_by_id(&state, &ctx, &task.id)
        .await
        .expect("fetch task");
    assert!(task.videos.is_empty());
    let user = service::users::get_user(&state, &ctx).await.expect("user");
    assert!(user.videos.is_empty());
    assert!(!state.media.resolve(&video.url).exists());

    let err = service::videos::delete_video(&state, &ctx, video.id.as_str())
        .await
        .expect_err("second delete");
    assert_eq!(err.code, ApiErrorCode::NotFound);
}

#[tokio::test]
async fn update_without_a_video_list_keeps_the_references() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = test_state(&dir);
    let ctx = verified_user(&state, "alice@example.com").await;
    let video = seed_video(&state, &ctx, "clip.mp4").await;

    let task = service::tasks::create_task(
        &state,
        &ctx,
        CreateTaskRequest {
            title: "Watch the clip".to_string(),
            video_id: vec![video.id.as_str().to_string()],
        },
    )
    .await
    .expect("create task");

    // Absent list keeps what is stored.
    let updated = service::tasks::update_task(
        &state,
        &ctx,
        &task.id,
        UpdateTaskRequest {
            title: "Watch the clip twice".to_string(),
            status: "ToDo".to_string(),
            video_id: None,
        },
    )
    .await
    .expect("update without list");
    assert_eq!(updated.videos.len(), 1);
    assert_eq!(updated.videos[0].id, video.id.as_str());

    // An explicit empty list clears the references.
    let cleared = service::tasks::update_task(
        &state,
        &ctx,
        &task.id,
        UpdateTaskRequest {
            title: "Watch the clip twice".to_string(),
            status: "ToDo".to_string(),
            video_id: Some(Vec::new()),
        },
    )
    .await
    .expect("update with empty list");
    assert!(cleared.videos.is_empty());
}

#[tokio::test]
async fn foreign_clips_are_invisible_and_untouchable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = test_state(&dir);
    let alice = verified_user(&state, "alice@example.com").await;
    let bob = verified_user(&state, "bob@example.com").await;
    let video = seed_video(&state, &alice, "clip.mp4").await;

    // Referencing someone else's clip reads the same as a missing one.
    let err = service::tasks::create_task(
        &state,
        &bob,
        CreateTaskRequest {
            title: "Steal the clip".to_string(),
            video_id: vec![video.id.as_str().to_string()],
        },
    )
    .await
    .expect_err("foreign reference");
    assert_eq!(err.code, ApiErrorCode::ValidationFailed);
    assert_eq!(
        err.message,
        format!("Invalid video ID: {}", video.id.as_str())
    );

    let err = service::videos::delete_video(&state, &bob, video.id.as_str())
        .await
        .expect_err("foreign delete");
    assert_eq!(err.code, ApiErrorCode::Forbidden);

    let err = service::videos::download_video(&state, &bob, video.id.as_str())
        .await
        .expect_err("foreign download");
    assert_eq!(err.code, ApiErrorCode::Forbidden);

    assert!(service::videos::list_videos(&state, &bob)
        .await
        .expect("bob list")
        .is_empty());
}

#[tokio::test]
async fn download_resolves_the_stored_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = test_state(&dir);
    let ctx = verified_user(&state, "alice@example.com").await;
    let video = seed_video(&state, &ctx, "clip.mp4").await;

    let (found, path) = service::videos::download_video(&state, &ctx, video.id.as_str())
        .await
        .expect("download");
    assert_eq!(found.id, video.id);
    assert_eq!(
        std::fs::read(path).expect("read clip"),
        b"not really a video"
    );
}

#[tokio::test]
async fn download_of_a_vanished_file_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = test_state(&dir);
    let ctx = verified_user(&state, "alice@example.com").await;
    let video = seed_video(&state, &ctx, "clip.mp4").await;
    state.media.remove(&video.url);

    let err = service::videos::download_video(&state, &ctx, video.id.as_str())
        .await
        .expect_err("vanished file");
    assert_eq!(err.code, ApiErrorCode::NotFound);
}

#[tokio::test]
async fn account_deletion_takes_the_library_with_it() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = test_state(&dir);
    let ctx = verified_user(&state, "alice@example.com").await;
    let video = seed_video(&state, &ctx, "clip.mp4").await;

    service::users::delete_user(&state, &ctx)
        .await
        .expect("delete account");

    assert!(!state.media.resolve(&video.url).exists());
    assert!(state
        .store
        .find_video(&video.id)
        .expect("lookup")
        .is_none());
    let err = service::users::get_user(&state, &ctx)
        .await
        .expect_err("account gone");
    assert_eq!(err.code, ApiErrorCode::NotFound);
}
