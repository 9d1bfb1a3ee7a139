//! HTTP surface of the stream server.
//!
//! `GET /stream` opens a Server-Sent Events response and runs one fresh
//! session into it. `GET /health` is a liveness probe.

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use flowprobe_core_rs::{EventScheduler, SimulatorConfig};
use futures::stream;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};
use uuid::Uuid;

/// Frames buffered between a session and its HTTP body before the session
/// is suspended.
pub const STREAM_BUFFER: usize = 256;

/// State shared by every request.
#[derive(Clone)]
pub struct AppState {
    config: Arc<SimulatorConfig>,
    /// Number of sessions accepted so far
    sessions: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            config: Arc::new(config),
            sessions: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Seed for the next session: `seed + n` when a base seed is configured,
    /// fresh entropy otherwise.
    fn next_seed(&self) -> u64 {
        let ordinal = self.sessions.fetch_add(1, Ordering::SeqCst);
        match self.config.seed {
            Some(base) => base.wrapping_add(ordinal),
            None => Uuid::new_v4().as_u64_pair().0,
        }
    }
}

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/stream", get(stream_handler))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Handler for `GET /health`.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Handler for `GET /stream`.
///
/// The session runs on its own task and writes into a bounded channel; the
/// response body drains it. When the client goes away the body, and with it
/// the receiver, is dropped, and the session's next write fails.
///
/// A config the scheduler rejects answers 500 without starting a session.
pub async fn stream_handler(State(state): State<AppState>) -> Response {
    let scheduler = match EventScheduler::new(Arc::clone(&state.config), state.next_seed()) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            error!(error = %e, "Refusing stream: invalid configuration");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };
    debug!(
        session_id = %scheduler.session().session_id(),
        seed = scheduler.seed(),
        "Accepted stream connection"
    );

    let (mut tx, rx) = mpsc::channel::<Bytes>(STREAM_BUFFER);
    tokio::spawn(async move {
        scheduler.run(&mut tx).await;
    });

    let frames = stream::unfold(rx, |mut rx| async move {
        rx.recv()
            .await
            .map(|frame| (Ok::<_, Infallible>(frame), rx))
    });

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
        Body::from_stream(frames),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use flowprobe_core_rs::{parse_frame, Envelope, TimingConfig, TrafficPhase};
    use tower::ServiceExt;

    fn short_config() -> SimulatorConfig {
        SimulatorConfig {
            seed: Some(100),
            phases: vec![TrafficPhase::new("quick", 4.0, 2, "quick phase")],
            ..SimulatorConfig::default()
        }
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(AppState::new(short_config()));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok"}));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_headers_and_body() {
        let app = create_router(AppState::new(short_config()));

        let response = app
            .oneshot(Request::builder().uri("/stream").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
        assert_eq!(headers[header::CONNECTION], "keep-alive");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = std::str::from_utf8(&body).unwrap();
        assert!(text.ends_with("\n\n"));

        let envelopes: Vec<Envelope> = text
            .split_inclusive("\n\n")
            .map(|chunk| parse_frame(chunk.as_bytes()).expect("well-formed frame"))
            .collect();

        assert!(matches!(envelopes.first(), Some(Envelope::Start { .. })));
        assert!(matches!(envelopes.last(), Some(Envelope::End { .. })));
        assert!(envelopes
            .iter()
            .any(|e| matches!(e, Envelope::Info { message } if message == "quick phase")));
        assert!(envelopes.iter().any(|e| matches!(e, Envelope::Spawn { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_request_gets_its_own_session() {
        let app = create_router(AppState::new(short_config()));

        let mut session_ids = Vec::new();
        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(Request::builder().uri("/stream").body(Body::empty()).unwrap())
                .await
                .unwrap();
            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let text = std::str::from_utf8(&body).unwrap();
            let first = text.split_inclusive("\n\n").next().unwrap();
            match parse_frame(first.as_bytes()) {
                Some(Envelope::Start { uuid, .. }) => session_ids.push(uuid),
                other => panic!("expected start, got {:?}", other),
            }
        }

        assert_ne!(session_ids[0], session_ids[1]);
    }

    #[tokio::test]
    async fn test_rejected_config_answers_500() {
        let config = SimulatorConfig {
            timing: TimingConfig {
                spawn_pause_every: 0,
                ..TimingConfig::default()
            },
            ..short_config()
        };
        let app = create_router(AppState::new(config));

        let response = app
            .oneshot(Request::builder().uri("/stream").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = std::str::from_utf8(&body).unwrap();
        assert!(text.contains("timing.spawn_pause_every"), "{}", text);
    }

    #[test]
    fn test_seeds_follow_configured_base() {
        let state = AppState::new(short_config());
        assert_eq!(state.next_seed(), 100);
        assert_eq!(state.next_seed(), 101);

        let unseeded = AppState::new(SimulatorConfig::default());
        assert_ne!(unseeded.next_seed(), unseeded.next_seed());
    }
}
