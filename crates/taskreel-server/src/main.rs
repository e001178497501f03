// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use taskreel_server::{build_router, notify, ApiConfig, AppState, SmtpConfig};
use taskreel_store::Store;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_str(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_duration_secs(name: &str, default_secs: u64) -> Duration {
    Duration::from_secs(env_u64(name, default_secs))
}

fn smtp_from_env() -> Option<SmtpConfig> {
    let host = env::var("TASKREEL_SMTP_HOST").ok()?;
    Some(SmtpConfig {
        host,
        username: env::var("TASKREEL_SMTP_USERNAME").unwrap_or_default(),
        password: env::var("TASKREEL_SMTP_PASSWORD").unwrap_or_default(),
        from: env_str("TASKREEL_SMTP_FROM", "no-reply@taskreel.local"),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let defaults = ApiConfig::default();
    let config = ApiConfig {
        addr: env_str("TASKREEL_BIND", &defaults.addr),
        db_path: PathBuf::from(env_str(
            "TASKREEL_DB_PATH",
            &defaults.db_path.to_string_lossy(),
        )),
        media_dir: PathBuf::from(env_str(
            "TASKREEL_MEDIA_DIR",
            &defaults.media_dir.to_string_lossy(),
        )),
        jwt_secret: env_str("TASKREEL_JWT_SECRET", &defaults.jwt_secret),
        token_ttl: env_duration_secs("TASKREEL_TOKEN_TTL_SECS", defaults.token_ttl.as_secs()),
        frontend_base_url: env_str("TASKREEL_FRONTEND_BASE_URL", &defaults.frontend_base_url),
        max_body_bytes: env_usize("TASKREEL_MAX_BODY_BYTES", defaults.max_body_bytes),
        thumbnail_timeout: env_duration_secs(
            "TASKREEL_THUMBNAIL_TIMEOUT_SECS",
            defaults.thumbnail_timeout.as_secs(),
        ),
        smtp: smtp_from_env(),
    };

    let store = Store::open(&config.db_path).map_err(|e| format!("store open failed: {e}"))?;
    let sink: Arc<dyn notify::NotificationSink> = match config.smtp.clone() {
        Some(smtp) => Arc::new(notify::SmtpSink::new(smtp)),
        None => {
            info!("no SMTP configuration; mail goes to the log sink");
            Arc::new(notify::LogSink)
        }
    };
    let bind_addr = config.addr.clone();
    let state = AppState::new(config, store, sink).map_err(|e| format!("startup failed: {e}"))?;
    let app = build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("bind {bind_addr} failed: {e}"))?;
    info!("taskreel-server listening on {bind_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| format!("server failed: {e}"))
}
