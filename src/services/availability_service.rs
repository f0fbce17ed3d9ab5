// src/services/availability_service.rs

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    common::error::AppError,
    db::LedgerStore,
    models::{
        appointment::{Appointment, AppointmentFilter, AppointmentStatus, DateRange, Slot},
        schedule::{ScheduleEntry, SlotGrid, SlotState},
    },
    services::catalog_service::Catalog,
};

/// Monta a agenda do dia a partir dos registros ativos daquele profissional.
/// Para cada rótulo da grade: bloqueado, ocupado ou livre.
pub fn build_day_schedule(labels: &[String], appointments: &[Appointment]) -> Vec<ScheduleEntry> {
    labels
        .iter()
        .map(|label| {
            let occupant = appointments
                .iter()
                .find(|a| a.time == *label && a.status.occupies_slot());

            let status = match occupant {
                Some(a) if a.is_block() => SlotState::Blocked,
                Some(_) => SlotState::Occupied,
                None => SlotState::Free,
            };

            ScheduleEntry {
                time: label.clone(),
                status,
                appointment: occupant.cloned(),
            }
        })
        .collect()
}

fn active_statuses() -> Vec<AppointmentStatus> {
    AppointmentStatus::ALL
        .into_iter()
        .filter(|s| s.occupies_slot())
        .collect()
}

/// Leitura pura do Ledger. O resultado é só orientativo: quem decide é o Ledger na escrita.
#[derive(Clone)]
pub struct AvailabilityService {
    store: Arc<dyn LedgerStore>,
    catalog: Arc<dyn Catalog>,
    grid: SlotGrid,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn LedgerStore>, catalog: Arc<dyn Catalog>, grid: SlotGrid) -> Self {
        Self { store, catalog, grid }
    }

    pub async fn day_schedule(
        &self,
        professional_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<ScheduleEntry>, AppError> {
        self.catalog.require_professional(professional_id)?;

        let appointments = self
            .store
            .list(&AppointmentFilter {
                professional_id: Some(professional_id.to_string()),
                date_range: Some(DateRange::single_day(date)),
                status_in: Some(active_statuses()),
            })
            .await?;

        Ok(build_day_schedule(self.grid.labels(), &appointments))
    }

    pub async fn is_slot_free(&self, slot: &Slot) -> Result<bool, AppError> {
        self.grid.ensure_contains(&slot.time)?;

        let occupied = self
            .store
            .list(&AppointmentFilter {
                professional_id: Some(slot.professional_id.clone()),
                date_range: Some(DateRange::single_day(slot.date)),
                status_in: Some(active_statuses()),
            })
            .await?
            .iter()
            .any(|a| a.time == slot.time);

        Ok(!occupied)
    }
}
