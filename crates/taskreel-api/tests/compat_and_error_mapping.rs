use taskreel_api::{map_error, task_response, user_public, ApiError, ApiErrorCode};
use taskreel_model::{FieldError, Task, User, UserId, Video};

#[test]
fn status_codes_follow_the_taxonomy() {
    let cases = [
        (ApiError::validation_failed(vec![]), 400),
        (ApiError::authentication("credentials not correct"), 401),
        (ApiError::forbidden("email not verified"), 403),
        (ApiError::not_found("task"), 404),
        (ApiError::conflict("User already exists"), 409),
        (ApiError::processing("thumbnail extraction failed"), 500),
        (ApiError::internal("boom"), 500),
    ];
    for (error, expected) in cases {
        assert_eq!(map_error(&error).status_code, expected, "{error}");
    }
}

#[test]
fn validation_error_carries_field_errors_in_details() {
    let error = ApiError::validation_failed(vec![
        FieldError::new("title", "title is mandatory"),
        FieldError::new("status", "kindly provide correct status"),
    ]);
    assert_eq!(error.code, ApiErrorCode::ValidationFailed);
    let field_errors = error.details["field_errors"]
        .as_array()
        .expect("field_errors array");
    assert_eq!(field_errors.len(), 2);
    assert_eq!(field_errors[0]["field"], "title");
}

#[test]
fn invalid_video_id_message_names_the_offending_id() {
    let error = ApiError::invalid_video_id("nonexistent-id");
    assert!(error.message.contains("Invalid video ID: nonexistent-id"));
    assert_eq!(map_error(&error).status_code, 400);
}

#[test]
fn error_envelope_serde_roundtrip() {
    let error = ApiError::conflict("User already exists");
    let json = serde_json::to_string(&error).expect("serialize");
    assert!(json.contains("\"conflict\""));
    let back: ApiError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, error);
}

#[test]
fn user_public_never_contains_the_password_hash() {
    let user = User::new(
        "alice".into(),
        "alice@example.com".into(),
        "$argon2id$secret-material".into(),
        "tok".into(),
    );
    let dto = user_public(&user);
    let json = serde_json::to_string(&dto).expect("serialize");
    assert!(!json.contains("argon2"));
    assert!(!json.contains("password"));
    assert_eq!(dto.email, "alice@example.com");
}

#[test]
fn task_response_joins_only_referenced_videos_in_order() {
    let owner = UserId::generate();
    let a = Video::new(owner.clone(), "a.mp4".into(), "media/a.mp4".into(), "t/a.png".into());
    let b = Video::new(owner.clone(), "b.mp4".into(), "media/b.mp4".into(), "t/b.png".into());
    let task = Task::new(
        owner,
        "Edit clips".into(),
        vec![b.id.clone(), a.id.clone()],
    );
    let resp = task_response(&task, &[a.clone(), b.clone()]);
    assert_eq!(resp.videos.len(), 2);
    assert_eq!(resp.videos[0].id, b.id.as_str());
    assert_eq!(resp.videos[1].id, a.id.as_str());
}
