// SPDX-License-Identifier: Apache-2.0

use crate::ids::{ParseError, TaskId, UserId, VideoId};
use crate::validate::FieldError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const TITLE_MAX_LEN: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    ToDo,
    Completed,
}

impl TaskStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "ToDo",
            Self::Completed => "Completed",
        }
    }

    pub fn parse(input: &str) -> Result<Self, ParseError> {
        match input {
            "ToDo" => Ok(Self::ToDo),
            "Completed" => Ok(Self::Completed),
            _ => Err(ParseError::InvalidFormat(
                "status must be one of ToDo, Completed",
            )),
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A to-do item. Owned by exactly one user; `videos` holds references to
/// clips owned by the same user. Status is overwritten on update, so
/// `Completed` is not a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    pub title: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub videos: Vec<VideoId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    #[must_use]
    pub fn new(user_id: UserId, title: String, videos: Vec<VideoId>) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::generate(),
            user_id,
            title,
            status: TaskStatus::ToDo,
            videos,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        validate_title(&self.title)
    }
}

pub(crate) fn validate_title(title: &str) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if title.trim().is_empty() {
        errors.push(FieldError::new("title", "title is mandatory"));
    }
    if title.len() > TITLE_MAX_LEN {
        errors.push(FieldError::new(
            "title",
            format!("title exceeds max length {TITLE_MAX_LEN}"),
        ));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_roundtrip() {
        assert_eq!(TaskStatus::parse("ToDo").expect("todo"), TaskStatus::ToDo);
        assert_eq!(
            TaskStatus::parse("Completed").expect("completed"),
            TaskStatus::Completed
        );
        assert!(TaskStatus::parse("Done").is_err());
        assert!(TaskStatus::parse("todo").is_err());
    }

    #[test]
    fn new_task_starts_in_todo() {
        let task = Task::new(UserId::generate(), "Buy milk".to_string(), Vec::new());
        assert_eq!(task.status, TaskStatus::ToDo);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn blank_title_is_rejected() {
        let task = Task::new(UserId::generate(), "   ".to_string(), Vec::new());
        let errors = task.validate().expect_err("blank title");
        assert_eq!(errors[0].field, "title");
    }
}
