// src/services/agenda_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::LedgerStore,
    models::{
        appointment::{
            Appointment, AppointmentFilter, AppointmentStatus, CancelOutcome, Customer,
            NewAppointment, Slot,
        },
        booking::{BookingConfirmation, BookingRequest, BookingSummary},
        catalog::ensure_price,
        schedule::SlotGrid,
    },
    services::{catalog_service::Catalog, notification_service::NotificationSink},
};

#[derive(Debug, Clone)]
pub struct Establishment {
    pub name: String,
    pub phone: String,
}

/// Operações do Ledger: criar, bloquear, mover, cancelar e transições de status.
#[derive(Clone)]
pub struct AgendaService {
    store: Arc<dyn LedgerStore>,
    catalog: Arc<dyn Catalog>,
    grid: SlotGrid,
    sink: Arc<dyn NotificationSink>,
    establishment: Establishment,
}

impl AgendaService {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        catalog: Arc<dyn Catalog>,
        grid: SlotGrid,
        sink: Arc<dyn NotificationSink>,
        establishment: Establishment,
    ) -> Self {
        Self {
            store,
            catalog,
            grid,
            sink,
            establishment,
        }
    }

    fn validate_slot(&self, slot: &Slot) -> Result<(), AppError> {
        self.grid.ensure_contains(&slot.time)?;
        self.catalog.require_professional(&slot.professional_id)?;
        Ok(())
    }

    // --- CRIAÇÃO ---

    /// Ponto único de entrada para gravar no Ledger (booking de cliente ou bloqueio).
    pub async fn create_appointment(&self, new: NewAppointment) -> Result<Appointment, AppError> {
        self.validate_slot(new.slot())?;

        ensure_price(new.price())?;
        if let Some(customer) = &new.customer {
            if customer.name.trim().is_empty() || customer.phone.trim().is_empty() {
                return Err(AppError::InvalidInput(
                    "nome e telefone do cliente são obrigatórios".into(),
                ));
            }
        }
        if let Some(service_id) = new.service_id() {
            self.catalog.require_service(service_id)?;
        }

        match self.store.insert(new).await {
            Ok(appointment) => {
                tracing::info!(
                    appointment_id = %appointment.id,
                    professional_id = %appointment.professional_id,
                    date = %appointment.date,
                    time = %appointment.time,
                    status = %appointment.status,
                    "✅ Agendamento gravado"
                );
                Ok(appointment)
            }
            Err(e) => {
                if matches!(e, AppError::SlotTaken(_) | AppError::SlotBlocked(_)) {
                    tracing::warn!(reason = e.code(), "Conflito de horário: {}", e);
                }
                Err(e)
            }
        }
    }

    /// Fluxo do cliente: congela o preço do serviço, grava e entrega o resumo ao canal externo.
    pub async fn book(&self, request: BookingRequest) -> Result<BookingConfirmation, AppError> {
        request.validate()?;

        let service = self.catalog.require_service(&request.service_id)?;
        let professional = self.catalog.require_professional(&request.professional_id)?;
        if !professional.is_available {
            return Err(AppError::ProfessionalUnavailable(professional.name));
        }

        let slot = Slot::new(&professional.id, request.date, &request.time);
        let new = NewAppointment::booking(
            &service.id,
            slot,
            Customer {
                name: request.customer_name.trim().to_string(),
                phone: request.customer_phone.trim().to_string(),
            },
            request.payment_method,
            service.price, // Snapshot: edições futuras do catálogo não afetam este registro
        );

        let appointment = self.create_appointment(new).await?;

        let summary = BookingSummary {
            customer_name: request.customer_name.trim().to_string(),
            service_name: service.name,
            professional_name: professional.name,
            date: appointment.date,
            time: appointment.time.clone(),
            payment_method: appointment.payment_method,
            price: appointment.price,
            establishment_name: self.establishment.name.clone(),
        };

        // Falha no canal não desfaz o agendamento
        if let Err(e) = self.sink.booking_confirmed(summary.clone()).await {
            tracing::warn!(appointment_id = %appointment.id, error = %e, "Falha ao entregar confirmação");
        }

        Ok(BookingConfirmation {
            message: summary.render_message(),
            whatsapp_link: summary.whatsapp_link(&self.establishment.phone),
            summary,
            appointment,
        })
    }

    pub async fn block_slot(&self, slot: Slot) -> Result<Appointment, AppError> {
        self.create_appointment(NewAppointment::block(slot)).await
    }

    // --- MOVIMENTAÇÃO ---

    pub async fn move_appointment(&self, id: Uuid, to: Slot) -> Result<Appointment, AppError> {
        self.grid.ensure_contains(&to.time)?;
        let destination = self.catalog.require_professional(&to.professional_id)?;

        let current = self.find_appointment(id).await?;

        // Trocar de profissional equivale a agendar com ele
        if current.professional_id != destination.id && !destination.is_available {
            return Err(AppError::ProfessionalUnavailable(destination.name));
        }

        let moved = self.store.relocate(id, to).await.inspect_err(|e| {
            if matches!(e, AppError::SlotTaken(_) | AppError::SlotBlocked(_)) {
                tracing::warn!(appointment_id = %id, reason = e.code(), "Movimentação recusada: {}", e);
            }
        })?;

        tracing::info!(
            appointment_id = %moved.id,
            professional_id = %moved.professional_id,
            date = %moved.date,
            time = %moved.time,
            "🔀 Agendamento movido"
        );
        Ok(moved)
    }

    // --- TRANSIÇÕES ---

    pub async fn cancel_appointment(&self, id: Uuid) -> Result<CancelOutcome, AppError> {
        let outcome = self.store.cancel(id).await?;
        match &outcome {
            CancelOutcome::Cancelled { .. } => tracing::info!(appointment_id = %id, "Agendamento cancelado"),
            CancelOutcome::Unblocked { .. } => tracing::info!(appointment_id = %id, "Horário desbloqueado"),
            CancelOutcome::AlreadyCancelled { .. } => {
                tracing::debug!(appointment_id = %id, "Cancelamento repetido ignorado")
            }
        }
        Ok(outcome)
    }

    pub async fn confirm_appointment(&self, id: Uuid) -> Result<Appointment, AppError> {
        self.store.transition(id, AppointmentStatus::Confirmed).await
    }

    pub async fn complete_appointment(&self, id: Uuid) -> Result<Appointment, AppError> {
        let done = self.store.transition(id, AppointmentStatus::Completed).await?;
        tracing::info!(appointment_id = %id, price = %done.price, "Atendimento concluído");
        Ok(done)
    }

    // --- CONSULTA ---

    pub async fn find_appointment(&self, id: Uuid) -> Result<Appointment, AppError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Agendamento {}", id)))
    }

    pub async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, AppError> {
        self.store.list(filter).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::{
        db::MemoryLedgerStore,
        models::appointment::PaymentMethod,
        services::catalog_service::InMemoryCatalog,
    };

    pub(crate) const SEED: &str = r#"{
        "services": [
            { "id": "1", "name": "Corte Premium", "price": 50, "durationMin": 45 },
            { "id": "3", "name": "Combo Rei", "price": 80, "durationMin": 75 }
        ],
        "professionals": [
            { "id": "p1", "name": "Carlos", "commissionRate": 100, "isAvailable": true },
            { "id": "p2", "name": "Ana", "commissionRate": 50, "isAvailable": true },
            { "id": "p3", "name": "Roberto", "commissionRate": 40, "isAvailable": false }
        ]
    }"#;

    #[derive(Default)]
    struct RecordingSink {
        received: Mutex<Vec<BookingSummary>>,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn booking_confirmed(&self, summary: BookingSummary) -> anyhow::Result<()> {
            self.received.lock().unwrap().push(summary);
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl NotificationSink for FailingSink {
        async fn booking_confirmed(&self, _summary: BookingSummary) -> anyhow::Result<()> {
            anyhow::bail!("canal fora do ar")
        }
    }

    fn establishment() -> Establishment {
        Establishment { name: "BarberFlow".into(), phone: "5511999999999".into() }
    }

    fn service_with(sink: Arc<dyn NotificationSink>) -> (AgendaService, Arc<InMemoryCatalog>) {
        let catalog = Arc::new(InMemoryCatalog::from_json(SEED).unwrap());
        let service = AgendaService::new(
            Arc::new(MemoryLedgerStore::new()),
            catalog.clone(),
            SlotGrid::default(),
            sink,
            establishment(),
        );
        (service, catalog)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn request(service: &str, pro: &str, date: NaiveDate, time: &str) -> BookingRequest {
        BookingRequest {
            service_id: service.into(),
            professional_id: pro.into(),
            date,
            time: time.into(),
            customer_name: "Lucas Lima".into(),
            customer_phone: "11777777777".into(),
            payment_method: Some(PaymentMethod::Pix),
        }
    }

    #[tokio::test]
    async fn booking_snapshots_price_and_notifies() {
        let sink = Arc::new(RecordingSink::default());
        let (agenda, catalog) = service_with(sink.clone());

        let confirmation = agenda.book(request("1", "p2", day(1), "10:00")).await.unwrap();
        assert_eq!(confirmation.appointment.status, AppointmentStatus::Confirmed);
        assert_eq!(confirmation.appointment.price, Decimal::from(50));
        assert!(confirmation.whatsapp_link.unwrap().starts_with("https://wa.me/5511999999999"));

        let received = sink.received.lock().unwrap().clone();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].service_name, "Corte Premium");
        assert_eq!(received[0].professional_name, "Ana");
        assert_eq!(received[0].establishment_name, "BarberFlow");

        // Editar o preço depois não altera o registro
        catalog.update_service_price("1", Decimal::from(99)).unwrap();
        let stored = agenda
            .list_appointments(&AppointmentFilter::default())
            .await
            .unwrap();
        assert_eq!(stored[0].price, Decimal::from(50));
    }

    #[tokio::test]
    async fn blank_customer_name_is_a_validation_error() {
        let (agenda, _) = service_with(Arc::new(RecordingSink::default()));
        let mut blank = request("1", "p1", day(1), "10:00");
        blank.customer_name = "   ".into();

        let err = agenda.book(blank).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        // A mesma regra vale para quem grava direto no Ledger
        let direct = NewAppointment::booking(
            "1",
            Slot::new("p1", day(1), "10:00"),
            Customer { name: " ".into(), phone: "11777777777".into() },
            None,
            Decimal::from(50),
        );
        let err = agenda.create_appointment(direct).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let stored = agenda.list_appointments(&AppointmentFilter::default()).await.unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn sub_cent_price_is_rejected() {
        let (agenda, _) = service_with(Arc::new(RecordingSink::default()));
        let new = NewAppointment::booking(
            "1",
            Slot::new("p1", day(1), "10:00"),
            Customer { name: "Lucas".into(), phone: "11777777777".into() },
            Some(PaymentMethod::Pix),
            Decimal::new(10005, 3),
        );

        let err = agenda.create_appointment(new).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn sink_failure_keeps_the_booking() {
        let (agenda, _) = service_with(Arc::new(FailingSink));
        agenda.book(request("1", "p1", day(1), "09:00")).await.unwrap();

        let stored = agenda.list_appointments(&AppointmentFilter::default()).await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn the_three_refusals_are_distinguishable() {
        let (agenda, _) = service_with(Arc::new(RecordingSink::default()));

        let err = agenda.book(request("1", "p3", day(1), "10:00")).await.unwrap_err();
        assert!(matches!(err, AppError::ProfessionalUnavailable(_)));

        agenda.book(request("1", "p1", day(1), "10:00")).await.unwrap();
        let err = agenda.book(request("3", "p1", day(1), "10:00")).await.unwrap_err();
        assert!(matches!(err, AppError::SlotTaken(_)));

        agenda.block_slot(Slot::new("p1", day(1), "11:00")).await.unwrap();
        let err = agenda.book(request("1", "p1", day(1), "11:00")).await.unwrap_err();
        assert!(matches!(err, AppError::SlotBlocked(_)));

        // Mesmo horário em outra data passa
        agenda.book(request("1", "p1", day(2), "10:00")).await.unwrap();
    }

    #[tokio::test]
    async fn validation_and_not_found() {
        let (agenda, _) = service_with(Arc::new(RecordingSink::default()));

        let err = agenda.book(request("1", "p1", day(1), "12:00")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = agenda.book(request("42", "p1", day(1), "10:00")).await.unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound(_)));

        let err = agenda.block_slot(Slot::new("nobody", day(1), "10:00")).await.unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound(_)));

        let mut bad = request("1", "p1", day(1), "10:00");
        bad.customer_name = String::new();
        assert!(matches!(agenda.book(bad).await, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn move_respects_blocks_and_destination_availability() {
        let (agenda, catalog) = service_with(Arc::new(RecordingSink::default()));

        let appt = agenda.book(request("1", "p1", day(1), "10:00")).await.unwrap().appointment;
        let block = agenda.block_slot(Slot::new("p2", day(1), "15:00")).await.unwrap();

        let err = agenda
            .move_appointment(appt.id, Slot::new("p2", day(1), "15:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SlotBlocked(_)));

        agenda.cancel_appointment(block.id).await.unwrap();
        let moved = agenda
            .move_appointment(appt.id, Slot::new("p2", day(1), "15:00"))
            .await
            .unwrap();
        assert_eq!(moved.professional_id, "p2");

        let err = agenda
            .move_appointment(appt.id, Slot::new("p3", day(1), "15:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ProfessionalUnavailable(_)));

        // Remarcar na mesma agenda continua possível mesmo indisponível
        catalog.set_professional_availability("p2", false).unwrap();
        agenda
            .move_appointment(appt.id, Slot::new("p2", day(3), "09:00"))
            .await
            .unwrap();

        let err = agenda
            .move_appointment(Uuid::new_v4(), Slot::new("p1", day(1), "09:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound(_)));
    }

    #[tokio::test]
    async fn confirm_and_complete() {
        let (agenda, _) = service_with(Arc::new(RecordingSink::default()));
        let block = agenda.block_slot(Slot::new("p1", day(1), "09:00")).await.unwrap();
        assert!(matches!(
            agenda.complete_appointment(block.id).await,
            Err(AppError::InvalidInput(_))
        ));

        let appt = agenda.book(request("1", "p1", day(1), "10:00")).await.unwrap().appointment;
        let done = agenda.complete_appointment(appt.id).await.unwrap();
        assert_eq!(done.status, AppointmentStatus::Completed);
        assert!(matches!(agenda.confirm_appointment(appt.id).await, Err(AppError::InvalidInput(_))));
    }
}
