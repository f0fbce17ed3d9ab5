// src/handlers/finance.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{CapViewAllFinancials, RequireCapability},
    models::{
        access::{CallerContext, Capability},
        appointment::DateRange,
        finance::FinancialPeriod,
    },
};

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionQuery {
    pub period: Option<FinancialPeriod>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl CommissionQuery {
    /// `from/to` explícitos têm prioridade; sem nada, vale o mês corrente.
    fn resolve_range(&self, today: NaiveDate) -> Result<DateRange, AppError> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => DateRange::new(from, to),
            (Some(_), None) | (None, Some(_)) => Err(AppError::InvalidInput(
                "informe 'from' e 'to' juntos".into(),
            )),
            (None, None) => Ok(self.period.unwrap_or(FinancialPeriod::Month).range(today)),
        }
    }
}

// GET /api/finance/commissions?period=month
pub async fn commissions(
    State(app_state): State<AppState>,
    caller: CallerContext,
    Query(query): Query<CommissionQuery>,
) -> Result<impl IntoResponse, AppError> {
    // Sem visão geral, só dá para ver a própria linha
    if !caller.sees_all_financials() && caller.professional_id.is_none() {
        caller.require(Capability::ViewAllFinancials)?;
    }

    let range = query.resolve_range(today())?;
    let mut report = app_state.finance_service.commission_report(range).await?;

    report
        .professionals
        .retain(|row| caller.sees_financials_of(&row.professional_id));

    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub date: Option<NaiveDate>,
}

// GET /api/finance/daily?date=2024-01-01
pub async fn daily(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CapViewAllFinancials>,
    Query(query): Query<DailyQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = query.date.unwrap_or_else(today);
    let summary = app_state.finance_service.daily_summary(date).await?;

    Ok(Json(summary))
}
