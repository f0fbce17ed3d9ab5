// src/handlers/catalog.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{CapManageCatalog, RequireCapability},
    services::Catalog,
};

// GET /api/catalog/services
pub async fn list_services(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.catalog.services())
}

// GET /api/catalog/professionals
pub async fn list_professionals(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.catalog.professionals())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAvailabilityPayload {
    pub is_available: bool,
}

// PUT /api/catalog/professionals/{id}/availability
pub async fn set_professional_availability(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CapManageCatalog>,
    Path(professional_id): Path<String>,
    Json(payload): Json<SetAvailabilityPayload>,
) -> Result<impl IntoResponse, AppError> {
    let professional = app_state
        .catalog
        .set_professional_availability(&professional_id, payload.is_available)?;

    Ok((StatusCode::OK, Json(professional)))
}
