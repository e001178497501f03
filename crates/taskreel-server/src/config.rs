// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

pub const CONFIG_SCHEMA_VERSION: &str = "1";

/// SMTP credentials for the outbound mail sink. Absent in development,
/// where the server falls back to a log-only sink.
#[derive(Debug, Clone, Serialize)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub addr: String,
    pub db_path: PathBuf,
    pub media_dir: PathBuf,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub frontend_base_url: String,
    pub max_body_bytes: usize,
    pub thumbnail_timeout: Duration,
    pub smtp: Option<SmtpConfig>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
            db_path: PathBuf::from("taskreel.sqlite"),
            media_dir: PathBuf::from("media"),
            jwt_secret: "taskreel-dev-secret".to_string(),
            token_ttl: Duration::from_secs(10 * 24 * 60 * 60),
            frontend_base_url: "http://localhost:5173".to_string(),
            max_body_bytes: 256 * 1024 * 1024,
            thumbnail_timeout: Duration::from_secs(30),
            smtp: None,
        }
    }
}
