// src/db/memory_ledger.rs

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ledger_store::{ensure_movable, ensure_transition, not_found, occupied_error, LedgerStore},
    models::appointment::{
        Appointment, AppointmentFilter, AppointmentStatus, CancelOutcome, NewAppointment, Slot,
    },
};

#[derive(Default)]
struct LedgerState {
    records: BTreeMap<i64, Appointment>, // seq -> registro (ordem de inserção)
    by_id: HashMap<Uuid, i64>,
    occupancy: HashMap<Slot, Uuid>, // só registros que ocupam o slot
    next_seq: i64,
}

impl LedgerState {
    fn find(&self, id: Uuid) -> Option<&Appointment> {
        self.by_id.get(&id).and_then(|seq| self.records.get(seq))
    }

    fn find_mut(&mut self, id: Uuid) -> Option<&mut Appointment> {
        let seq = *self.by_id.get(&id)?;
        self.records.get_mut(&seq)
    }

    fn occupant(&self, slot: &Slot) -> Option<&Appointment> {
        self.occupancy.get(slot).and_then(|id| self.find(*id))
    }
}

/// Ledger em memória. Toda mutação acontece dentro de um único write guard,
/// e as leituras pegam o read guard, então nunca enxergam uma escrita pela metade.
/// Não sobrevive a reinício: em produção use o `PgLedgerStore`.
#[derive(Default)]
pub struct MemoryLedgerStore {
    state: RwLock<LedgerState>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn insert(&self, new: NewAppointment) -> Result<Appointment, AppError> {
        let mut state = self.state.write().await;

        if let Some(occupant) = state.occupant(new.slot()) {
            return Err(occupied_error(occupant));
        }

        state.next_seq += 1;
        let appointment = new.into_appointment(state.next_seq, Utc::now());

        if appointment.status.occupies_slot() {
            state.occupancy.insert(appointment.slot(), appointment.id);
        }
        state.by_id.insert(appointment.id, appointment.seq);
        state.records.insert(appointment.seq, appointment.clone());

        Ok(appointment)
    }

    async fn relocate(&self, id: Uuid, to: Slot) -> Result<Appointment, AppError> {
        let mut state = self.state.write().await;

        let current = state.find(id).cloned().ok_or_else(|| not_found(id))?;
        ensure_movable(&current)?;

        let from = current.slot();
        if from == to {
            return Ok(current);
        }

        if let Some(occupant) = state.occupant(&to) {
            if occupant.id != id {
                return Err(occupied_error(occupant));
            }
        }

        state.occupancy.remove(&from);
        state.occupancy.insert(to.clone(), id);

        let record = state.find_mut(id).ok_or_else(|| not_found(id))?;
        record.professional_id = to.professional_id;
        record.date = to.date;
        record.time = to.time;
        record.updated_at = Utc::now();

        Ok(record.clone())
    }

    async fn transition(&self, id: Uuid, next: AppointmentStatus) -> Result<Appointment, AppError> {
        let mut state = self.state.write().await;

        let record = state.find_mut(id).ok_or_else(|| not_found(id))?;
        if record.status == next {
            return Ok(record.clone());
        }
        ensure_transition(record, next)?;

        record.status = next;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn cancel(&self, id: Uuid) -> Result<CancelOutcome, AppError> {
        let mut state = self.state.write().await;

        let current = state.find(id).cloned().ok_or_else(|| not_found(id))?;

        match current.status {
            AppointmentStatus::Cancelled => Ok(CancelOutcome::AlreadyCancelled { appointment: current }),
            AppointmentStatus::Blocked => {
                state.occupancy.remove(&current.slot());
                state.by_id.remove(&id);
                state.records.remove(&current.seq);
                Ok(CancelOutcome::Unblocked { id })
            }
            _ => {
                state.occupancy.remove(&current.slot());
                let record = state.find_mut(id).ok_or_else(|| not_found(id))?;
                record.status = AppointmentStatus::Cancelled;
                record.updated_at = Utc::now();
                Ok(CancelOutcome::Cancelled { appointment: record.clone() })
            }
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, AppError> {
        Ok(self.state.read().await.find(id).cloned())
    }

    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppError> {
        let state = self.state.read().await;

        // BTreeMap já entrega em ordem de inserção; o sort é estável
        let mut items: Vec<Appointment> = state
            .records
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        items.sort_by(|a, b| (a.date, &a.time).cmp(&(b.date, &b.time)));

        Ok(items)
    }
}
