// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

pub const CRATE_NAME: &str = "taskreel-model";

mod ids;
mod password;
mod task;
mod user;
mod validate;
mod video;

pub use ids::{ParseError, TaskId, UserId, VideoId, ID_MAX_LEN};
pub use password::{evaluate_password_strength, PasswordStrength};
pub use task::{Task, TaskStatus, TITLE_MAX_LEN};
pub use user::{validate_email, Academic, User};
pub use validate::FieldError;
pub use video::Video;
