use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct DoctorsResponse {
    pub doctors: Vec<String>,
}

/// GET /api/doctors: the roster, fed to the frontend and the extraction
/// prompt.
pub async fn list_doctors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DoctorsResponse>, AppError> {
    let doctors = state
        .directory
        .list()
        .map_err(|e| AppError::Storage(e.to_string()))?;
    Ok(Json(DoctorsResponse { doctors }))
}
