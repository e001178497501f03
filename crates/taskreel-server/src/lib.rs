// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{middleware, Router};
use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;
use taskreel_api::ApiError;
use taskreel_store::Store;
use tokio::sync::Mutex;
use tower_http::services::ServeDir;

pub mod auth;
pub mod config;
pub mod media;
pub mod notify;
pub mod service;

mod http;

pub use config::{ApiConfig, SmtpConfig};

pub const CRATE_NAME: &str = "taskreel-server";

#[derive(Default)]
pub(crate) struct RequestMetrics {
    counts: Mutex<HashMap<(String, u16), u64>>,
    latency_ns: Mutex<HashMap<String, Vec<u64>>>,
}

impl RequestMetrics {
    pub(crate) async fn observe_request(&self, route: &str, status: StatusCode, latency: Duration) {
        let mut counts = self.counts.lock().await;
        *counts
            .entry((route.to_string(), status.as_u16()))
            .or_insert(0) += 1;
        drop(counts);
        let mut latency_map = self.latency_ns.lock().await;
        latency_map
            .entry(route.to_string())
            .or_insert_with(Vec::new)
            .push(latency.as_nanos() as u64);
    }

    pub(crate) async fn render(&self) -> String {
        let counts = self.counts.lock().await;
        let mut keys: Vec<&(String, u16)> = counts.keys().collect();
        keys.sort();
        let mut out = String::new();
        for key in keys {
            let (route, status) = key;
            out.push_str(&format!(
                "taskreel_http_requests_total{{route=\"{}\",status=\"{}\"}} {}\n",
                route, status, counts[key]
            ));
        }
        drop(counts);
        let latency_map = self.latency_ns.lock().await;
        let mut routes: Vec<&String> = latency_map.keys().collect();
        routes.sort();
        for route in routes {
            let samples = &latency_map[route];
            let sum_ns: u64 = samples.iter().sum();
            out.push_str(&format!(
                "taskreel_http_request_latency_seconds_sum{{route=\"{}\"}} {:.9}\n\
                 taskreel_http_request_latency_seconds_count{{route=\"{}\"}} {}\n",
                route,
                sum_ns as f64 / 1e9,
                route,
                samples.len()
            ));
        }
        out
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub config: Arc<ApiConfig>,
    pub signer: Arc<auth::TokenSigner>,
    pub sink: Arc<dyn notify::NotificationSink>,
    pub media: Arc<media::MediaStore>,
    pub(crate) metrics: Arc<RequestMetrics>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(
        config: ApiConfig,
        store: Store,
        sink: Arc<dyn notify::NotificationSink>,
    ) -> Result<Self, ApiError> {
        let media = media::MediaStore::new(config.media_dir.clone(), config.thumbnail_timeout)?;
        let signer = auth::TokenSigner::new(config.jwt_secret.as_bytes(), config.token_ttl);
        Ok(Self {
            store: Arc::new(store),
            signer: Arc::new(signer),
            sink,
            media: Arc::new(media),
            metrics: Arc::new(RequestMetrics::default()),
            request_id_seed: Arc::new(AtomicU64::new(1)),
            config: Arc::new(config),
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    let user_protected = Router::new()
        .route("/get-user", get(http::users::get_user_handler))
        .route("/update", put(http::users::update_user_handler))
        .route("/delete", delete(http::users::delete_user_handler))
        .route(
            "/upload-profile",
            post(http::users::upload_profile_handler),
        )
        .route("/upload-video", post(http::videos::upload_video_handler))
        .route("/videos", get(http::videos::list_videos_handler))
        .route(
            "/delete-video",
            delete(http::videos::delete_video_handler),
        )
        .route(
            "/download-video",
            get(http::videos::download_video_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    let user_routes = Router::new()
        .route("/register", post(http::users::register_handler))
        .route("/login", post(http::users::login_handler))
        .route("/verify-email", post(http::users::verify_email_handler))
        .merge(user_protected);

    let todo_routes = Router::new()
        .route("/create", post(http::tasks::create_task_handler))
        .route("/get", get(http::tasks::get_tasks_handler))
        .route("/filter", get(http::tasks::filter_tasks_handler))
        .route("/get-by-id", get(http::tasks::get_task_by_id_handler))
        .route("/update", put(http::tasks::update_task_handler))
        .route("/delete", delete(http::tasks::delete_task_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/healthz", get(http::healthz_handler))
        .route("/metrics", get(http::metrics_handler))
        .route("/v1/version", get(http::version_handler))
        .nest("/user", user_routes)
        .nest("/todo", todo_routes)
        .nest_service("/media", ServeDir::new(&state.config.media_dir))
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .with_state(state)
}
