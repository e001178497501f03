// SPDX-License-Identifier: Apache-2.0

use crate::{parse_timestamp, Store, StoreError};
use rusqlite::{params, OptionalExtension, Row};
use taskreel_model::{Task, TaskId, TaskStatus, UserId, VideoId};

type RawTask = (String, String, String, String, String, String, String);

const TASK_COLUMNS: &str = "id, user_id, title, status, videos, created_at, updated_at";

fn read_task(row: &Row<'_>) -> rusqlite::Result<RawTask> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn into_task(
    (id, user_id, title, status, videos, created_at, updated_at): RawTask,
) -> Result<Task, StoreError> {
    let videos: Vec<VideoId> = serde_json::from_str(&videos)?;
    Ok(Task {
        id: TaskId::parse(&id).map_err(|e| StoreError(e.to_string()))?,
        user_id: UserId::parse(&user_id).map_err(|e| StoreError(e.to_string()))?,
        title,
        status: TaskStatus::parse(&status).map_err(|e| StoreError(e.to_string()))?,
        videos,
        created_at: parse_timestamp(&created_at, "tasks.created_at")?,
        updated_at: parse_timestamp(&updated_at, "tasks.updated_at")?,
    })
}

impl Store {
    pub fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO tasks (id, user_id, title, status, videos, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                task.id.as_str(),
                task.user_id.as_str(),
                task.title,
                task.status.as_str(),
                serde_json::to_string(&task.videos)?,
                task.created_at.to_rfc3339(),
                task.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn find_task(&self, id: &TaskId) -> Result<Option<Task>, StoreError> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id.as_str()],
                read_task,
            )
            .optional()?;
        drop(conn);
        raw.map(into_task).transpose()
    }

    pub fn tasks_for_user(
        &self,
        user_id: &UserId,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, StoreError> {
        let conn = self.lock()?;
        let raws = match status {
            Some(status) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks \
                     WHERE user_id = ?1 AND status = ?2 ORDER BY created_at"
                ))?;
                let rows = stmt
                    .query_map(params![user_id.as_str(), status.as_str()], read_task)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 ORDER BY created_at"
                ))?;
                let rows = stmt
                    .query_map(params![user_id.as_str()], read_task)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        drop(conn);
        raws.into_iter().map(into_task).collect()
    }

    /// Full-row overwrite keyed by id; owner and created_at never change.
    pub fn update_task(&self, task: &Task) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE tasks SET title = ?2, status = ?3, videos = ?4, updated_at = ?5 \
             WHERE id = ?1",
            params![
                task.id.as_str(),
                task.title,
                task.status.as_str(),
                serde_json::to_string(&task.videos)?,
                task.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_task(&self, id: &TaskId) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id.as_str()])?;
        Ok(changed > 0)
    }
}
