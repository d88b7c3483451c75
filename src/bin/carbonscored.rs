//! carbonscored: HTTP transport for the carbonscore assistant.
//!
//! - `GET  /health`: server status
//! - `POST /sessions/{user}`: (re)start the questionnaire, returns `{reply}`
//! - `GET  /sessions/{user}`: session snapshot (answers, state, footprint)
//! - `POST /messages`: body `{user_id, text}`, returns `{reply}`
//!
//! Environment: `CARBONSCORE_BIND` (default `0.0.0.0`), `CARBONSCORE_PORT`
//! (default `8300`), `CARBONSCORE_CONFIG` (configuration file).
//!
//! Build and run: `cargo run --features server --bin carbonscored`

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use carbonscore::assistant::Assistant;
use carbonscore::config::BotConfig;
use carbonscore::session::SessionSnapshot;

const EVICTION_PERIOD: Duration = Duration::from_secs(60);

struct ServerState {
    assistant: Assistant,
}

type SharedState = Arc<ServerState>;

// ── Request / response types ─────────────────────────────────────────────

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    sessions: usize,
    faq_entries: usize,
}

#[derive(Deserialize)]
struct MessageRequest {
    user_id: String,
    text: String,
}

#[derive(Serialize)]
struct ReplyResponse {
    reply: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────

async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: state.assistant.session_count(),
        faq_entries: state.assistant.matcher().len(),
    })
}

async fn start_session(
    State(state): State<SharedState>,
    Path(user): Path<String>,
) -> Result<Json<ReplyResponse>, (StatusCode, String)> {
    let reply = tokio::task::spawn_blocking(move || state.assistant.start_session(&user))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{e}")))?;
    Ok(Json(ReplyResponse { reply }))
}

async fn post_message(
    State(state): State<SharedState>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<ReplyResponse>, (StatusCode, String)> {
    if req.user_id.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "user_id must not be empty".into()));
    }
    let reply = tokio::task::spawn_blocking(move || {
        state.assistant.handle_message(&req.user_id, &req.text)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{e}")))?;
    Ok(Json(ReplyResponse { reply }))
}

async fn get_session(
    State(state): State<SharedState>,
    Path(user): Path<String>,
) -> Result<Json<SessionSnapshot>, (StatusCode, String)> {
    let lookup = user.clone();
    let snapshot = tokio::task::spawn_blocking(move || state.assistant.session_snapshot(&lookup))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{e}")))?;
    snapshot
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("no session for \"{user}\"")))
}

// ── Main ─────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let bind = std::env::var("CARBONSCORE_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("CARBONSCORE_PORT").unwrap_or_else(|_| "8300".to_string());
    let port: u16 = port.parse().into_diagnostic()?;
    let config_path = std::env::var("CARBONSCORE_CONFIG").ok().map(PathBuf::from);

    let config = BotConfig::discover(config_path.as_deref())?;
    let assistant = tokio::task::spawn_blocking(move || Assistant::from_config(&config))
        .await
        .into_diagnostic()??;
    let state = Arc::new(ServerState { assistant });

    let evictor = Arc::clone(&state);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(EVICTION_PERIOD);
        loop {
            ticker.tick().await;
            evictor.assistant.evict_idle();
        }
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/sessions/{user}", get(get_session).post(start_session))
        .route("/messages", post(post_message))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{bind}:{port}");
    tracing::info!("carbonscored listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await.into_diagnostic()?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("carbonscored shutting down");
        })
        .await
        .into_diagnostic()?;
    Ok(())
}
