//! REST API handlers (`spec.md` §6), grounded on the teacher's `api.rs`
//! router/handler shape — `Arc<AppState>` holding the long-lived
//! collaborators, `rayon::spawn` offloading the solve off the async runtime,
//! plain `axum::Json`/`StatusCode` returns — generalised from
//! job-tracked employee schedules to the single-file reference
//! configuration and persisted schedule state this crate works against.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::config::ConfigLoader;
use crate::domain::{ScheduleRequest, ScheduleResponse, ScheduleSaveRequest, ScheduleSaveResponse};
use crate::error::ScheduleError;
use crate::render;
use crate::solver::{self, Model, SolverConfig};
use crate::state_store::StateStore;
use crate::validator;
use crate::windows::TimeWindowMap;

/// Long-lived collaborators shared across handlers: the reference
/// configuration loader and the schedule state store. Neither holds any
/// in-memory mutable schedule state of its own — the on-disk files are the
/// truth (`spec.md` §5).
pub struct AppState {
    config: ConfigLoader,
    state_store: StateStore,
}

impl AppState {
    pub fn new(config_path: impl Into<std::path::PathBuf>, state_path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            config: ConfigLoader::new(config_path),
            state_store: StateStore::new(state_path),
        }
    }
}

/// Creates the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/initial-data", get(get_initial_data))
        .route("/api/generate-schedule", post(generate_schedule))
        .route("/api/schedule/draft", post(save_draft))
        .route("/api/schedule/finalize", post(finalize_schedule))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "UP" })
}

/// GET /api/initial-data (`spec.md` §6 `getInitialData`). 404s via
/// `ScheduleError::ConfigNotFound` when the reference file is absent.
async fn get_initial_data(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> Result<Json<crate::domain::InitialData>, ScheduleError> {
    let data = state.config.load()?;
    Ok(Json(data))
}

/// POST /api/generate-schedule (`spec.md` §6 `generateSchedule`). Never
/// propagates a solver error: a panic inside the solve is caught and
/// collapsed to `status = "SOLVER_ERROR"`, matching the source's
/// `except Exception` boundary around the CP-SAT call.
async fn generate_schedule(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<ScheduleResponse>, ScheduleError> {
    let data = state.config.load()?;

    let (tx, rx) = tokio::sync::oneshot::channel();
    rayon::spawn(move || {
        let response = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let windows = TimeWindowMap::build(&data.shifts);
            let model = Model::build(&data, &request, &windows);
            let outcome = solver::solve(&model, SolverConfig::default());
            render::render(&model, &outcome.solution, outcome.status)
        }))
        .unwrap_or_else(|_| ScheduleResponse {
            schedule: Default::default(),
            shortages: Vec::new(),
            coverage_breakdown: Vec::new(),
            status: "SOLVER_ERROR".to_string(),
            message: Some("The solver raised an unexpected error.".to_string()),
        });
        let _ = tx.send(response);
    });

    let response = rx.await.map_err(|_| {
        ScheduleError::Io(std::io::Error::other("solver task dropped before completion"))
    })?;
    Ok(Json(response))
}

/// POST /api/schedule/draft (`spec.md` §6 `saveDraft`): validates the
/// edited schedule against the reference rules before persisting, then
/// increments the version while leaving `locked = false`.
async fn save_draft(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
    Json(request): Json<ScheduleSaveRequest>,
) -> Result<Json<ScheduleSaveResponse>, ScheduleError> {
    let data = state.config.load()?;
    validator::validate_schedule_rules(&data, &request.schedule)?;
    let response = state.state_store.apply(&request, false)?;
    Ok(Json(response))
}

/// POST /api/schedule/finalize (`spec.md` §6 `finalizeSchedule`): same
/// validation as `saveDraft`, but sets `locked = true` so every further
/// mutation is rejected until the state is reset out of band.
async fn finalize_schedule(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
    Json(request): Json<ScheduleSaveRequest>,
) -> Result<Json<ScheduleSaveResponse>, ScheduleError> {
    let data = state.config.load()?;
    validator::validate_schedule_rules(&data, &request.schedule)?;
    let response = state.state_store.apply(&request, true)?;
    Ok(Json(response))
}
