// SPDX-License-Identifier: Apache-2.0

use crate::{parse_timestamp, Store, StoreError};
use rusqlite::{params, OptionalExtension, Row};
use taskreel_model::{UserId, Video, VideoId};

fn read_video(row: &Row<'_>) -> rusqlite::Result<(String, String, String, String, String, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn into_video(
    (id, user_id, title, url, thumbnail, created_at): (
        String,
        String,
        String,
        String,
        String,
        String,
    ),
) -> Result<Video, StoreError> {
    Ok(Video {
        id: VideoId::parse(&id).map_err(|e| StoreError(e.to_string()))?,
        user_id: UserId::parse(&user_id).map_err(|e| StoreError(e.to_string()))?,
        title,
        url,
        thumbnail,
        created_at: parse_timestamp(&created_at, "videos.created_at")?,
    })
}

impl Store {
    pub fn insert_video(&self, video: &Video) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO videos (id, user_id, title, url, thumbnail, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                video.id.as_str(),
                video.user_id.as_str(),
                video.title,
                video.url,
                video.thumbnail,
                video.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn find_video(&self, id: &VideoId) -> Result<Option<Video>, StoreError> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                "SELECT id, user_id, title, url, thumbnail, created_at FROM videos WHERE id = ?1",
                params![id.as_str()],
                read_video,
            )
            .optional()?;
        drop(conn);
        raw.map(into_video).transpose()
    }

    pub fn videos_for_user(&self, user_id: &UserId) -> Result<Vec<Video>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, url, thumbnail, created_at FROM videos \
             WHERE user_id = ?1 ORDER BY created_at",
        )?;
        let raws = stmt
            .query_map(params![user_id.as_str()], read_video)?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        drop(conn);
        raws.into_iter().map(into_video).collect()
    }

    pub fn delete_video(&self, id: &VideoId) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM videos WHERE id = ?1", params![id.as_str()])?;
        Ok(changed > 0)
    }

    /// Drops the reference from every task that carries it. Returns the
    /// number of tasks rewritten.
    pub fn detach_video_from_tasks(&self, id: &VideoId) -> Result<usize, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut stmt =
            tx.prepare("SELECT id, videos FROM tasks WHERE videos LIKE '%' || ?1 || '%'")?;
        let rows = stmt
            .query_map(params![id.as_str()], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<(String, String)>, _>>()?;
        drop(stmt);
        let mut rewritten = 0;
        for (task_id, videos_json) in rows {
            let mut refs: Vec<VideoId> = serde_json::from_str(&videos_json)?;
            let before = refs.len();
            refs.retain(|v| v != id);
            if refs.len() != before {
                tx.execute(
                    "UPDATE tasks SET videos = ?2 WHERE id = ?1",
                    params![task_id, serde_json::to_string(&refs)?],
                )?;
                rewritten += 1;
            }
        }
        tx.commit()?;
        Ok(rewritten)
    }
}
