// SPDX-License-Identifier: Apache-2.0

use crate::dto::{AcademicDto, TaskResponse, UserPublic, VideoDto, VideoSummaryDto};
use taskreel_model::{Task, User, Video};

#[must_use]
pub fn user_public(user: &User) -> UserPublic {
    UserPublic {
        id: user.id.as_str().to_string(),
        user_name: user.user_name.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: user.email.clone(),
        phone: user.phone.clone(),
        profile_picture: user.profile_picture.clone(),
        academics: user
            .academics
            .iter()
            .map(|a| AcademicDto {
                title: a.title.clone(),
                year: a.year,
            })
            .collect(),
        videos: user.videos.iter().map(|v| v.as_str().to_string()).collect(),
        verified: user.verified,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

/// Joins a task with the subset of `videos` it references, preserving the
/// task's reference order. References to vanished videos are skipped.
#[must_use]
pub fn task_response(task: &Task, videos: &[Video]) -> TaskResponse {
    let summaries = task
        .videos
        .iter()
        .filter_map(|id| videos.iter().find(|v| &v.id == id))
        .map(|v| VideoSummaryDto {
            id: v.id.as_str().to_string(),
            title: v.title.clone(),
            url: v.url.clone(),
            thumbnail: v.thumbnail.clone(),
        })
        .collect();
    TaskResponse {
        id: task.id.as_str().to_string(),
        user_id: task.user_id.as_str().to_string(),
        title: task.title.clone(),
        status: task.status,
        videos: summaries,
        created_at: task.created_at,
        updated_at: task.updated_at,
    }
}

#[must_use]
pub fn video_dto(video: &Video) -> VideoDto {
    VideoDto {
        id: video.id.as_str().to_string(),
        user_id: video.user_id.as_str().to_string(),
        title: video.title.clone(),
        url: video.url.clone(),
        thumbnail: video.thumbnail.clone(),
        created_at: video.created_at,
    }
}
