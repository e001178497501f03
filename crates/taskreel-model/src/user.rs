// SPDX-License-Identifier: Apache-2.0

use crate::ids::{UserId, VideoId};
use crate::validate::FieldError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Academic {
    pub title: String,
    pub year: i32,
}

/// A registered account. `verification_token` is non-empty exactly while
/// the account is unverified; redeeming the token clears it and flips
/// `verified`. `password_hash` never leaves the process in any DTO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub user_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub password_hash: String,
    #[serde(default)]
    pub profile_picture: String,
    #[serde(default)]
    pub academics: Vec<Academic>,
    #[serde(default)]
    pub videos: Vec<VideoId>,
    pub verified: bool,
    pub verification_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn new(user_name: String, email: String, password_hash: String, token: String) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::generate(),
            user_name,
            first_name: String::new(),
            last_name: String::new(),
            email,
            phone: String::new(),
            password_hash,
            profile_picture: String::new(),
            academics: Vec::new(),
            videos: Vec::new(),
            verified: false,
            verification_token: token,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.user_name.trim().is_empty() {
            errors.push(FieldError::new("userName", "userName is required"));
        }
        if let Err(e) = validate_email(&self.email) {
            errors.push(e);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Shape check only; deliverability is the mail sink's problem.
pub fn validate_email(email: &str) -> Result<(), FieldError> {
    let invalid = || FieldError::new("email", "email is invalid");
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.is_empty() || email.contains(char::is_whitespace) {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_check() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("a.b+c@sub.example.org").is_ok());
        assert!(validate_email("alice").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@").is_err());
        assert!(validate_email("alice@example").is_err());
        assert!(validate_email("al ice@example.com").is_err());
    }

    #[test]
    fn new_user_starts_unverified_with_token() {
        let user = User::new(
            "alice".into(),
            "alice@example.com".into(),
            "hash".into(),
            "tok".into(),
        );
        assert!(!user.verified);
        assert!(!user.verification_token.is_empty());
        assert!(user.validate().is_ok());
    }
}
