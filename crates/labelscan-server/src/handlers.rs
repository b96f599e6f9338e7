//! Endpoint handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use labelscan_core::{FieldSet, SaveRequest, ScanRequest};

use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Handler for `POST /scanSerialNumber`.
pub async fn scan_serial_number(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<FieldSet>, ApiError> {
    let Json(request) = payload?;
    let fields = state.extraction.scan(request).await?;
    Ok(Json(fields))
}

/// Handler for `POST /saveSerialNumber`.
pub async fn save_serial_number(
    State(state): State<AppState>,
    payload: Result<Json<SaveRequest>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError> {
    let Json(request) = payload?;
    state.persistence.save(request).await?;
    Ok(Json(SaveResponse {
        message: "Data saved successfully",
    }))
}

/// Handler for `GET /health`.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
