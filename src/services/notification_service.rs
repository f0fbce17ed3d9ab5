// src/services/notification_service.rs

use async_trait::async_trait;

use crate::models::booking::BookingSummary;

/// Canal de confirmação externo (WhatsApp, SMS...). Recebe só uma cópia do resumo;
/// não tem acesso ao Ledger.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn booking_confirmed(&self, summary: BookingSummary) -> anyhow::Result<()>;
}

/// Sink padrão: apenas registra a mensagem pronta no log.
#[derive(Debug, Clone, Default)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn booking_confirmed(&self, summary: BookingSummary) -> anyhow::Result<()> {
        tracing::info!(
            customer = %summary.customer_name,
            professional = %summary.professional_name,
            date = %summary.date,
            time = %summary.time,
            "📨 Resumo do agendamento pronto para envio"
        );
        tracing::debug!(message = %summary.render_message());
        Ok(())
    }
}
