// SPDX-License-Identifier: Apache-2.0

use crate::config::SmtpConfig;
use async_trait::async_trait;
use lettre::message::Message;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};
use std::sync::Mutex;
use tracing::{error, info, warn};

/// Outbound mail boundary. `send` reports delivery as a plain success
/// flag; callers treat dispatch as advisory and never fail a request on
/// a false return.
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    async fn send(&self, to: &str, subject: &str, body: &str) -> bool;
}

pub struct SmtpSink {
    cfg: SmtpConfig,
}

impl SmtpSink {
    #[must_use]
    pub fn new(cfg: SmtpConfig) -> Self {
        Self { cfg }
    }
}

#[async_trait]
impl NotificationSink for SmtpSink {
    async fn send(&self, to: &str, subject: &str, body: &str) -> bool {
        let cfg = self.cfg.clone();
        let to = to.to_string();
        let subject = subject.to_string();
        let body = body.to_string();
        // lettre's SMTP transport is blocking; keep it off the runtime.
        let sent = tokio::task::spawn_blocking(move || -> Result<(), String> {
            let message = Message::builder()
                .from(cfg.from.parse().map_err(|e| format!("from: {e}"))?)
                .to(to.parse().map_err(|e| format!("to: {e}"))?)
                .subject(subject)
                .body(body)
                .map_err(|e| e.to_string())?;
            let transport = SmtpTransport::relay(&cfg.host)
                .map_err(|e| e.to_string())?
                .credentials(Credentials::new(cfg.username, cfg.password))
                .build();
            transport.send(&message).map(|_| ()).map_err(|e| e.to_string())
        })
        .await;
        match sent {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                error!("smtp send failed: {e}");
                false
            }
            Err(e) => {
                error!("smtp send task panicked: {e}");
                false
            }
        }
    }
}

/// Development fallback when no SMTP credentials are configured: logs the
/// mail and reports success.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> bool {
        info!(to = %to, subject = %subject, "mail sink disabled; dropping message");
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// In-memory sink recording every dispatch; the test double for asserting
/// notification side effects.
#[derive(Default)]
pub struct MemorySink {
    sent: Mutex<Vec<SentMail>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NotificationSink for MemorySink {
    async fn send(&self, to: &str, subject: &str, body: &str) -> bool {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentMail {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
            true
        } else {
            warn!("memory sink mutex poisoned");
            false
        }
    }
}

#[must_use]
pub fn verification_email(frontend_base_url: &str, token: &str) -> (String, String) {
    let link = format!("{frontend_base_url}/verify-email?token={token}");
    (
        "Verify Your Email".to_string(),
        format!("Hello, please click on the following link to verify your email: {link}"),
    )
}

#[must_use]
pub fn completion_email(task_title: &str) -> (String, String) {
    (
        "Task Completed".to_string(),
        format!("Your task \"{task_title}\" has been marked as completed."),
    )
}
