// SPDX-License-Identifier: Apache-2.0

use crate::{parse_timestamp, Store, StoreError};
use rusqlite::{params, OptionalExtension, Row};
use taskreel_model::{Academic, User, UserId, VideoId};

struct RawUser {
    id: String,
    user_name: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    password_hash: String,
    profile_picture: String,
    academics: String,
    videos: String,
    verified: bool,
    verification_token: String,
    created_at: String,
    updated_at: String,
}

const USER_COLUMNS: &str = "id, user_name, first_name, last_name, email, phone, password_hash, \
     profile_picture, academics, videos, verified, verification_token, created_at, updated_at";

fn read_raw(row: &Row<'_>) -> rusqlite::Result<RawUser> {
    Ok(RawUser {
        id: row.get(0)?,
        user_name: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        email: row.get(4)?,
        phone: row.get(5)?,
        password_hash: row.get(6)?,
        profile_picture: row.get(7)?,
        academics: row.get(8)?,
        videos: row.get(9)?,
        verified: row.get(10)?,
        verification_token: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn into_user(raw: RawUser) -> Result<User, StoreError> {
    let academics: Vec<Academic> = serde_json::from_str(&raw.academics)?;
    let videos: Vec<VideoId> = serde_json::from_str(&raw.videos)?;
    Ok(User {
        id: UserId::parse(&raw.id).map_err(|e| StoreError(e.to_string()))?,
        user_name: raw.user_name,
        first_name: raw.first_name,
        last_name: raw.last_name,
        email: raw.email,
        phone: raw.phone,
        password_hash: raw.password_hash,
        profile_picture: raw.profile_picture,
        academics,
        videos,
        verified: raw.verified,
        verification_token: raw.verification_token,
        created_at: parse_timestamp(&raw.created_at, "users.created_at")?,
        updated_at: parse_timestamp(&raw.updated_at, "users.updated_at")?,
    })
}

impl Store {
    pub fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO users (id, user_name, first_name, last_name, email, phone, \
             password_hash, profile_picture, academics, videos, verified, verification_token, \
             created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                user.id.as_str(),
                user.user_name,
                user.first_name,
                user.last_name,
                user.email,
                user.phone,
                user.password_hash,
                user.profile_picture,
                serde_json::to_string(&user.academics)?,
                serde_json::to_string(&user.videos)?,
                user.verified,
                user.verification_token,
                user.created_at.to_rfc3339(),
                user.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn find_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        self.find_user_where("id = ?1", id.as_str())
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_user_where("email = ?1", email)
    }

    /// Token lookup is only meaningful for unredeemed tokens; redeemed rows
    /// hold the empty string, which callers must not pass.
    pub fn find_user_by_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        if token.is_empty() {
            return Ok(None);
        }
        self.find_user_where("verification_token = ?1", token)
    }

    fn find_user_where(&self, predicate: &str, value: &str) -> Result<Option<User>, StoreError> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE {predicate}"),
                params![value],
                read_raw,
            )
            .optional()?;
        drop(conn);
        raw.map(into_user).transpose()
    }

    /// Full-row overwrite keyed by id. Returns false when the row is gone.
    pub fn update_user(&self, user: &User) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE users SET user_name = ?2, first_name = ?3, last_name = ?4, email = ?5, \
             phone = ?6, password_hash = ?7, profile_picture = ?8, academics = ?9, videos = ?10, \
             verified = ?11, verification_token = ?12, updated_at = ?13 WHERE id = ?1",
            params![
                user.id.as_str(),
                user.user_name,
                user.first_name,
                user.last_name,
                user.email,
                user.phone,
                user.password_hash,
                user.profile_picture,
                serde_json::to_string(&user.academics)?,
                serde_json::to_string(&user.videos)?,
                user.verified,
                user.verification_token,
                user.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(changed > 0)
    }

    /// Removes the user together with their tasks and video records.
    /// Media files on disk are the caller's concern.
    pub fn delete_user(&self, id: &UserId) -> Result<bool, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM tasks WHERE user_id = ?1", params![id.as_str()])?;
        tx.execute("DELETE FROM videos WHERE user_id = ?1", params![id.as_str()])?;
        let changed = tx.execute("DELETE FROM users WHERE id = ?1", params![id.as_str()])?;
        tx.commit()?;
        Ok(changed > 0)
    }
}
