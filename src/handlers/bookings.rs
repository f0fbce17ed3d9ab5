// src/handlers/bookings.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{booking::BookingRequest, schedule::ScheduleEntry},
};

// =============================================================================
//  FLUXO DO CLIENTE (público, sem capacidade)
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub professional_id: String,
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub professional_id: String,
    pub date: NaiveDate,
    pub slots: Vec<ScheduleEntry>,
}

// GET /api/availability?professionalId=p1&date=2024-01-01
pub async fn get_availability(
    State(app_state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut slots = app_state
        .availability_service
        .day_schedule(&query.professional_id, query.date)
        .await?;

    // O cliente só precisa saber se está livre; quem ocupa é assunto da agenda interna
    for entry in &mut slots {
        entry.appointment = None;
    }

    Ok(Json(AvailabilityResponse {
        professional_id: query.professional_id,
        date: query.date,
        slots,
    }))
}

// POST /api/bookings
pub async fn create_booking(
    State(app_state): State<AppState>,
    Json(payload): Json<BookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let confirmation = app_state.agenda_service.book(payload).await?;

    Ok((StatusCode::CREATED, Json(confirmation)))
}
