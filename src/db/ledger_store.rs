// src/db/ledger_store.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::appointment::{
        Appointment, AppointmentFilter, AppointmentStatus, CancelOutcome, NewAppointment, Slot,
    },
};

/// O Ledger de agendamentos. Cada escrita faz a checagem de conflito e a gravação
/// num único passo atômico; quem chama nunca vê um "checa e depois grava" separado.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Grava um booking ou bloqueio. Falha com conflito se o slot já está ocupado.
    async fn insert(&self, new: NewAppointment) -> Result<Appointment, AppError>;

    /// Move para outro (profissional, data, horário). Só conflita com *outro* registro ativo.
    async fn relocate(&self, id: Uuid, to: Slot) -> Result<Appointment, AppError>;

    /// Confirmar / concluir. Repetir o status atual não é erro.
    async fn transition(&self, id: Uuid, next: AppointmentStatus) -> Result<Appointment, AppError>;

    /// Cancela um booking (fica no histórico) ou apaga um bloqueio. Idempotente.
    async fn cancel(&self, id: Uuid) -> Result<CancelOutcome, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, AppError>;

    /// Ordenado por (data, horário), desempate pela ordem de inserção.
    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppError>;
}

pub(crate) fn occupied_error(occupant: &Appointment) -> AppError {
    if occupant.is_block() {
        AppError::SlotBlocked(occupant.slot())
    } else {
        AppError::SlotTaken(occupant.slot())
    }
}

pub(crate) fn not_found(id: Uuid) -> AppError {
    AppError::ResourceNotFound(format!("Agendamento {}", id))
}

pub(crate) fn ensure_movable(appointment: &Appointment) -> Result<(), AppError> {
    if appointment.status.is_movable() {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "agendamentos com status '{}' não podem ser movidos",
            appointment.status
        )))
    }
}

pub(crate) fn ensure_transition(
    appointment: &Appointment,
    next: AppointmentStatus,
) -> Result<(), AppError> {
    if appointment.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "transição de '{}' para '{}' não permitida",
            appointment.status, next
        )))
    }
}
