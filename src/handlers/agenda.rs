// src/handlers/agenda.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        access::{CallerContext, Capability},
        appointment::{AppointmentFilter, AppointmentStatus, DateRange, Slot},
    },
};

// =============================================================================
//  AGENDA INTERNA (profissionais e gestão)
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaQuery {
    pub professional_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<String>, // Lista separada por vírgula: "pending,confirmed"
}

fn parse_status_list(raw: &str) -> Result<Vec<AppointmentStatus>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<AppointmentStatus>)
        .collect()
}

impl AgendaQuery {
    fn into_filter(self) -> Result<AppointmentFilter, AppError> {
        let date_range = match (self.from, self.to) {
            (Some(from), Some(to)) => Some(DateRange::new(from, to)?),
            (Some(day), None) | (None, Some(day)) => Some(DateRange::single_day(day)),
            (None, None) => None,
        };

        let status_in = match self.status.as_deref() {
            Some(raw) => Some(parse_status_list(raw)?).filter(|list| !list.is_empty()),
            None => None,
        };

        Ok(AppointmentFilter {
            professional_id: self.professional_id,
            date_range,
            status_in,
        })
    }
}

// GET /api/agenda?professionalId=p1&from=2024-01-01&to=2024-01-31&status=confirmed
pub async fn list_appointments(
    State(app_state): State<AppState>,
    caller: CallerContext,
    Query(query): Query<AgendaQuery>,
) -> Result<impl IntoResponse, AppError> {
    // Sem profissional no filtro = agenda de todos
    match query.professional_id.as_deref() {
        Some(pro_id) => caller.ensure_schedule_access(pro_id)?,
        None => caller.require(Capability::ViewAllSchedules)?,
    }

    let filter = query.into_filter()?;
    let appointments = app_state.agenda_service.list_appointments(&filter).await?;

    Ok(Json(appointments))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotPayload {
    pub professional_id: String,
    pub date: NaiveDate,
    pub time: String,
}

impl From<SlotPayload> for Slot {
    fn from(payload: SlotPayload) -> Self {
        Slot::new(payload.professional_id, payload.date, payload.time.trim())
    }
}

// POST /api/agenda/blocks
pub async fn block_slot(
    State(app_state): State<AppState>,
    caller: CallerContext,
    Json(payload): Json<SlotPayload>,
) -> Result<impl IntoResponse, AppError> {
    caller.ensure_schedule_access(&payload.professional_id)?;

    let block = app_state.agenda_service.block_slot(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(block)))
}

// PUT /api/agenda/appointments/{id}/slot
pub async fn move_appointment(
    State(app_state): State<AppState>,
    caller: CallerContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<SlotPayload>,
) -> Result<impl IntoResponse, AppError> {
    // Precisa enxergar a agenda de origem e a de destino
    let current = app_state.agenda_service.find_appointment(id).await?;
    caller.ensure_schedule_access(&current.professional_id)?;
    caller.ensure_schedule_access(&payload.professional_id)?;

    let moved = app_state
        .agenda_service
        .move_appointment(id, payload.into())
        .await?;

    Ok((StatusCode::OK, Json(moved)))
}

async fn authorize_on_appointment(
    app_state: &AppState,
    caller: &CallerContext,
    id: Uuid,
) -> Result<(), AppError> {
    let current = app_state.agenda_service.find_appointment(id).await?;
    caller.ensure_schedule_access(&current.professional_id)
}

// POST /api/agenda/appointments/{id}/cancel
pub async fn cancel_appointment(
    State(app_state): State<AppState>,
    caller: CallerContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    authorize_on_appointment(&app_state, &caller, id).await?;

    let outcome = app_state.agenda_service.cancel_appointment(id).await?;

    Ok((StatusCode::OK, Json(outcome)))
}

// POST /api/agenda/appointments/{id}/confirm
pub async fn confirm_appointment(
    State(app_state): State<AppState>,
    caller: CallerContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    authorize_on_appointment(&app_state, &caller, id).await?;

    let appointment = app_state.agenda_service.confirm_appointment(id).await?;

    Ok((StatusCode::OK, Json(appointment)))
}

// POST /api/agenda/appointments/{id}/complete
pub async fn complete_appointment(
    State(app_state): State<AppState>,
    caller: CallerContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    authorize_on_appointment(&app_state, &caller, id).await?;

    let appointment = app_state.agenda_service.complete_appointment(id).await?;

    Ok((StatusCode::OK, Json(appointment)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(from: Option<&str>, to: Option<&str>, status: Option<&str>) -> AgendaQuery {
        AgendaQuery {
            professional_id: Some("p1".into()),
            from: from.map(|s| s.parse().unwrap()),
            to: to.map(|s| s.parse().unwrap()),
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn single_bound_means_single_day() {
        let filter = query(Some("2024-01-05"), None, None).into_filter().unwrap();
        let range = filter.date_range.unwrap();
        assert_eq!(range.from, range.to);
        assert_eq!(range.from.to_string(), "2024-01-05");
    }

    #[test]
    fn status_list_is_parsed() {
        let filter = query(None, None, Some("pending, confirmed")).into_filter().unwrap();
        assert_eq!(
            filter.status_in.unwrap(),
            vec![AppointmentStatus::Pending, AppointmentStatus::Confirmed]
        );

        let filter = query(None, None, Some("")).into_filter().unwrap();
        assert!(filter.status_in.is_none());
    }

    #[test]
    fn bad_query_is_rejected() {
        assert!(query(None, None, Some("archived")).into_filter().is_err());
        assert!(query(Some("2024-02-01"), Some("2024-01-01"), None).into_filter().is_err());
    }
}
