//! Shift-scheduling core — Axum server.
//!
//! Run with: cargo run
//! Then open: http://localhost:7860/health
//!
//! Reference configuration and persisted schedule state paths are resolved
//! once at startup from `SCHEDULING_DATA_PATH`/`SCHEDULING_STATE_PATH`
//! (falling back to `data/initial-data.json`/`data/schedule-state.json`),
//! matching the teacher's own static-path fallback in `main.rs` generalised
//! to this crate's two on-disk collaborators.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};

use shift_scheduling_core::api;

fn env_path(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let data_path = env_path("SCHEDULING_DATA_PATH", "data/initial-data.json");
    let state_path = env_path("SCHEDULING_STATE_PATH", "data/schedule-state.json");
    tracing::info!(%data_path, %state_path, "starting shift-scheduling core");

    let state = Arc::new(api::AppState::new(data_path, state_path));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api::router(state).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], 7860));
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
