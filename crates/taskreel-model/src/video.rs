// SPDX-License-Identifier: Apache-2.0

use crate::ids::{UserId, VideoId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded clip. The owner is fixed at upload time; `url` and
/// `thumbnail` are paths relative to the media root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: VideoId,
    pub user_id: UserId,
    pub title: String,
    pub url: String,
    pub thumbnail: String,
    pub created_at: DateTime<Utc>,
}

impl Video {
    #[must_use]
    pub fn new(user_id: UserId, title: String, url: String, thumbnail: String) -> Self {
        Self {
            id: VideoId::generate(),
            user_id,
            title,
            url,
            thumbnail,
            created_at: Utc::now(),
        }
    }
}
