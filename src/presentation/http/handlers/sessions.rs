//! Session Handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::domain::entities::SessionSummary;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// GET /api/v1/sessions/{code}
pub async fn get_session(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<SessionSummary>, AppError> {
    let summary = state.registry.summary(&code).await?;
    Ok(Json(summary))
}
