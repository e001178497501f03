// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

pub const CRATE_NAME: &str = "taskreel-api";

mod convert;
mod dto;
mod errors;
mod error_mapping;

pub use convert::{task_response, user_public, video_dto};
pub use dto::{
    AcademicDto, CreateTaskRequest, LoginRequest, LoginResponse, RegisterRequest, TaskResponse,
    UpdateTaskRequest, UpdateUserRequest, UserPublic, VerifyEmailRequest, VideoDto,
    VideoSummaryDto,
};
pub use error_mapping::{map_error, ApiErrorMapping};
pub use errors::{ApiError, ApiErrorCode};
