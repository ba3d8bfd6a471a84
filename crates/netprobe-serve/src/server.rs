//! Axum HTTP server: chat relay plus speed-test probe endpoints.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tokio_stream::StreamExt;
use tower_http::cors::CorsLayer;

use netprobe_core::error::NetProbeError;

use crate::api::{ChatReply, ChatRequest, PingReply, UploadReport};
use crate::metrics;
use crate::relay::RelayClient;
use crate::stream::{self, RandomChunks};

/// Fixed reply for requests that fail validation.
const VALIDATION_REPLY: &str = "Please enter a message.";

/// Fixed reply whenever the upstream completion service cannot be used.
/// Internal detail never reaches the client.
const DEGRADED_REPLY: &str =
    "The assistant is temporarily unavailable. Please try again in a moment.";

/// Shared application state, built once at startup and immutable afterwards.
pub struct AppState {
    pub relay: RelayClient,
}

/// Build the Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/metrics", get(prometheus_metrics))
        .route("/chat", post(chat))
        .route("/api/speedtest/download", get(download))
        .route(
            "/api/speedtest/upload",
            // The advisory size hint is never enforced, so the default body
            // limit must not cut uploads short either.
            post(upload).layer(DefaultBodyLimit::disable()),
        )
        .route("/api/speedtest/ping", get(ping))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn liveness() -> &'static str {
    "netprobe backend is running"
}

async fn prometheus_metrics() -> impl IntoResponse {
    metrics::render_metrics()
}

async fn chat(State(state): State<Arc<AppState>>, Json(req): Json<ChatRequest>) -> Response {
    let _active_guard = metrics::ActiveRequestGuard::new();
    let _timer = metrics::LatencyTimer::new();
    metrics::CHAT_REQUESTS.inc();

    if req.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ChatReply {
                reply: VALIDATION_REPLY.to_string(),
            }),
        )
            .into_response();
    }

    match state.relay.complete(&req.message).await {
        Ok(reply) => Json(ChatReply { reply }).into_response(),
        Err(err) => {
            metrics::CHAT_ERRORS.inc();
            match &err {
                NetProbeError::MissingCredential { var } => {
                    tracing::error!("Chat relay misconfigured: {var} is not set");
                }
                NetProbeError::UpstreamStatus { status, body } => {
                    tracing::error!("Upstream completion failed with status {status}: {body}");
                }
                other => {
                    tracing::error!("Upstream completion failed: {other}");
                }
            }
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatReply {
                    reply: DEGRADED_REPLY.to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct SizeQuery {
    size: Option<i64>,
}

/// Download probe: stream exactly `size` MiB of random bytes.
async fn download(Query(query): Query<SizeQuery>) -> Response {
    let size_mb = stream::clamp_download_mb(query.size);
    let total_bytes = size_mb * stream::MIB;
    tracing::debug!("Download probe: {size_mb} MB ({total_bytes} bytes)");
    metrics::DOWNLOAD_BYTES.inc_by(total_bytes as f64);

    let chunks = RandomChunks::new(total_bytes as usize).map(Ok::<_, Infallible>);
    let body = Body::from_stream(tokio_stream::iter(chunks));

    (
        [
            (header::CONTENT_TYPE, "application/octet-stream"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    )
        .into_response()
}

/// Upload probe: drain the body, counting bytes. Content is discarded, so
/// only a running length is kept, never the payload itself.
async fn upload(Query(query): Query<SizeQuery>, body: Body) -> Response {
    let hint_mb = stream::clamp_upload_hint_mb(query.size);
    tracing::debug!("Upload probe started (advisory hint: {hint_mb} MB)");

    let mut received: u64 = 0;
    let mut data = body.into_data_stream();
    while let Some(chunk) = data.next().await {
        match chunk {
            Ok(bytes) => received += bytes.len() as u64,
            Err(err) => {
                tracing::warn!("Upload stream aborted after {received} bytes: {err}");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "status": "error" })),
                )
                    .into_response();
            }
        }
    }

    metrics::UPLOAD_BYTES.inc_by(received as f64);
    Json(UploadReport::ok(received)).into_response()
}

/// Latency probe: sleep a uniform random delay and report it.
async fn ping() -> Json<PingReply> {
    let delay_ms: f64 = {
        use rand::Rng;
        rand::thread_rng().gen_range(10.0..60.0)
    };
    tokio::time::sleep(Duration::from_secs_f64(delay_ms / 1000.0)).await;
    Json(PingReply::pong(delay_ms))
}
