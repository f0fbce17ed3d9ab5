// src/models/appointment.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::common::error::AppError;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "appointment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Blocked,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Blocked,
    ];

    /// Tudo que não foi cancelado ocupa o horário, inclusive bloqueios.
    pub fn occupies_slot(self) -> bool {
        self != AppointmentStatus::Cancelled
    }

    /// Entra no faturamento e na comissão.
    pub fn counts_as_revenue(self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled | AppointmentStatus::Blocked)
    }

    pub fn is_movable(self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Confirmed)
    }

    /// Transições de status fora do cancelamento (que tem regra própria).
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        matches!(
            (self, next),
            (AppointmentStatus::Pending, AppointmentStatus::Confirmed)
                | (AppointmentStatus::Pending, AppointmentStatus::Completed)
                | (AppointmentStatus::Confirmed, AppointmentStatus::Completed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| AppError::InvalidInput(format!("status desconhecido: '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_method", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Pix,
    Cash,
    Card,
}

impl PaymentMethod {
    /// Rótulo exibido para o cliente.
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Pix => "Pix",
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::Card => "Cartão",
        }
    }
}

// --- Slot (a unidade de exclusão mútua) ---

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub professional_id: String,
    pub date: NaiveDate,
    pub time: String,
}

impl Slot {
    pub fn new(professional_id: impl Into<String>, date: NaiveDate, time: impl Into<String>) -> Self {
        Self {
            professional_id: professional_id.into(),
            date,
            time: time.into(),
        }
    }
}

// --- Registro do Ledger ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub service_id: Option<String>,
    pub professional_id: String,
    pub date: NaiveDate,
    pub time: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub status: AppointmentStatus,
    pub price: Decimal, // Snapshot do preço no momento do agendamento
    pub payment_method: Option<PaymentMethod>,
    #[serde(skip)]
    pub seq: i64, // Ordem de inserção, desempate na listagem
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn slot(&self) -> Slot {
        Slot::new(self.professional_id.clone(), self.date, self.time.clone())
    }

    pub fn is_block(&self) -> bool {
        self.status == AppointmentStatus::Blocked
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub phone: String,
}

/// O que o Ledger precisa para gravar um novo registro.
/// Só pode ser montado pelos construtores, que garantem a forma de booking ou de bloqueio.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub(crate) service_id: Option<String>,
    pub(crate) slot: Slot,
    pub(crate) customer: Option<Customer>,
    pub(crate) payment_method: Option<PaymentMethod>,
    pub(crate) price: Decimal,
    pub(crate) status: AppointmentStatus,
}

impl NewAppointment {
    pub fn booking(
        service_id: impl Into<String>,
        slot: Slot,
        customer: Customer,
        payment_method: Option<PaymentMethod>,
        price: Decimal,
    ) -> Self {
        Self {
            service_id: Some(service_id.into()),
            slot,
            customer: Some(customer),
            payment_method,
            price,
            status: AppointmentStatus::Confirmed,
        }
    }

    pub fn block(slot: Slot) -> Self {
        Self {
            service_id: None,
            slot,
            customer: None,
            payment_method: None,
            price: Decimal::ZERO,
            status: AppointmentStatus::Blocked,
        }
    }

    pub fn slot(&self) -> &Slot {
        &self.slot
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn service_id(&self) -> Option<&str> {
        self.service_id.as_deref()
    }

    pub(crate) fn into_appointment(self, seq: i64, now: DateTime<Utc>) -> Appointment {
        let (customer_name, customer_phone) = match self.customer {
            Some(c) => (Some(c.name), Some(c.phone)),
            None => (None, None),
        };
        Appointment {
            id: Uuid::new_v4(),
            service_id: self.service_id,
            professional_id: self.slot.professional_id,
            date: self.slot.date,
            time: self.slot.time,
            customer_name,
            customer_phone,
            status: self.status,
            price: self.price,
            payment_method: self.payment_method,
            seq,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Resultado de um cancelamento. Bloqueios são apagados, bookings ficam para auditoria.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum CancelOutcome {
    Cancelled { appointment: Appointment },
    AlreadyCancelled { appointment: Appointment },
    Unblocked { id: Uuid },
}

// --- Consultas ---

/// Intervalo de datas fechado nas duas pontas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, AppError> {
        if from > to {
            return Err(AppError::InvalidInput(format!(
                "intervalo de datas invertido: {} > {}",
                from, to
            )));
        }
        Ok(Self { from, to })
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self { from: date, to: date }
    }

    /// O mês calendário inteiro que contém `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        Self { from: first, to: last }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub professional_id: Option<String>,
    pub date_range: Option<DateRange>,
    pub status_in: Option<Vec<AppointmentStatus>>,
}

impl AppointmentFilter {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.professional_id
            .as_ref()
            .is_none_or(|id| *id == appointment.professional_id)
            && self
                .date_range
                .is_none_or(|range| range.contains(appointment.date))
            && self
                .status_in
                .as_ref()
                .is_none_or(|statuses| statuses.contains(&appointment.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_range_covers_whole_calendar_month() {
        assert_eq!(
            DateRange::month_of(date(2024, 2, 14)),
            DateRange { from: date(2024, 2, 1), to: date(2024, 2, 29) }
        );
        assert_eq!(
            DateRange::month_of(date(2023, 12, 31)),
            DateRange { from: date(2023, 12, 1), to: date(2023, 12, 31) }
        );
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(matches!(
            DateRange::new(date(2024, 1, 2), date(2024, 1, 1)),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn status_rules() {
        use AppointmentStatus::*;
        assert!(Blocked.occupies_slot());
        assert!(!Cancelled.occupies_slot());
        assert!(Completed.counts_as_revenue());
        assert!(!Blocked.counts_as_revenue());
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(!Blocked.can_transition_to(Completed));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Completed.can_transition_to(Confirmed));
    }

    #[test]
    fn status_parses_from_query_labels() {
        assert_eq!("blocked".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::Blocked);
        assert!("all".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn block_carries_no_service_or_customer() {
        let block = NewAppointment::block(Slot::new("p1", date(2024, 1, 1), "09:00"))
            .into_appointment(1, Utc::now());
        assert!(block.is_block());
        assert_eq!(block.service_id, None);
        assert_eq!(block.customer_name, None);
        assert_eq!(block.price, Decimal::ZERO);
    }
}
