//! Error model (`spec.md` §7), grounded on
//! `gianged-shift-scheduler`'s `*/src/error.rs` (`thiserror` + `IntoResponse`
//! with warn/error tracing on the status split).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::ScheduleChange;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Initial data not found")]
    ConfigNotFound,

    #[error("Schedule is locked and cannot be modified (version {current_version})")]
    Locked { current_version: u64 },

    #[error("Draft is based on an older version (current {current_version})")]
    VersionConflict {
        current_version: u64,
        changes: Vec<ScheduleChange>,
    },

    #[error("Schedule violates staffing rules")]
    RuleViolation { violations: Vec<String> },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    #[serde(rename = "detail", skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    changes: Option<Vec<ScheduleChange>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    violations: Option<Vec<String>>,
}

impl ScheduleError {
    fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        match self {
            ScheduleError::ConfigNotFound => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    reason: None,
                    message: Some(self.to_string()),
                    current_version: None,
                    changes: None,
                    violations: None,
                },
            ),
            ScheduleError::Locked { current_version } => (
                StatusCode::LOCKED,
                ErrorBody {
                    reason: Some("LOCKED"),
                    message: Some(self.to_string()),
                    current_version: Some(*current_version),
                    changes: None,
                    violations: None,
                },
            ),
            ScheduleError::VersionConflict {
                current_version,
                changes,
            } => (
                StatusCode::CONFLICT,
                ErrorBody {
                    reason: Some("VERSION_CONFLICT"),
                    message: Some(self.to_string()),
                    current_version: Some(*current_version),
                    changes: Some(changes.clone()),
                    violations: None,
                },
            ),
            ScheduleError::RuleViolation { violations } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    reason: Some("RULE_VIOLATION"),
                    message: Some(self.to_string()),
                    current_version: None,
                    changes: None,
                    violations: Some(violations.clone()),
                },
            ),
            ScheduleError::Io(_) | ScheduleError::Json(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    reason: None,
                    message: Some(self.to_string()),
                    current_version: None,
                    changes: None,
                    violations: None,
                },
            ),
        }
    }
}

impl IntoResponse for ScheduleError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();

        if status.is_server_error() {
            tracing::error!(error = %self, %status, "schedule state store error");
        } else {
            tracing::warn!(error = %self, %status, "schedule state store rejected request");
        }

        (status, Json(body)).into_response()
    }
}

/// Helper for handlers that want the raw JSON value (e.g. for tests) without
/// going through the `axum::response::Response` machinery.
pub fn error_body_json(err: &ScheduleError) -> Value {
    let (_, body) = err.status_and_body();
    serde_json::to_value(body).expect("ErrorBody always serializes")
}
