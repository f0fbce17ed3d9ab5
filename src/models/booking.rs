// src/models/booking.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::appointment::{Appointment, PaymentMethod};

// `length` conta espaços; nome ou telefone só com espaços também é campo vazio
fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message("required".into()));
    }
    Ok(())
}

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if value.trim().chars().count() < 8 {
        return Err(ValidationError::new("length").with_message("Telefone inválido".into()));
    }
    Ok(())
}

// O pedido de agendamento feito pelo cliente
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[validate(length(min = 1, message = "required"))]
    pub service_id: String,

    #[validate(length(min = 1, message = "required"))]
    pub professional_id: String,

    pub date: NaiveDate,

    #[validate(length(min = 1, message = "required"))]
    pub time: String,

    #[validate(custom(function = "validate_not_blank"))]
    pub customer_name: String,

    #[validate(custom(function = "validate_phone"))]
    pub customer_phone: String,

    pub payment_method: Option<PaymentMethod>,
}

/// O que sai do motor para o canal de confirmação (WhatsApp, SMS...).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    pub customer_name: String,
    pub service_name: String,
    pub professional_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub payment_method: Option<PaymentMethod>,
    pub price: Decimal,
    pub establishment_name: String,
}

impl BookingSummary {
    pub fn render_message(&self) -> String {
        // Sem forma escolhida, a mensagem assume dinheiro
        let label = self.payment_method.unwrap_or(PaymentMethod::Cash).label();
        let payment = format!("{} (R$ {:.2})", label, self.price);

        format!(
            "Olá! 👋 Gostaria de confirmar meu agendamento no *{}*:\n\n\
             ✂️ *Serviço:* {}\n\
             💈 *Profissional:* {}\n\
             📅 *Data:* {}\n\
             ⏰ *Horário:* {}\n\
             💰 *Pagamento:* {}\n\n\
             Aguardo a confirmação!",
            self.establishment_name,
            self.service_name,
            self.professional_name,
            self.date.format("%d/%m/%Y"),
            self.time,
            payment,
        )
    }

    /// Link `wa.me` com a mensagem pronta. Sem dígitos no telefone não há link.
    pub fn whatsapp_link(&self, phone: &str) -> Option<String> {
        let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return None;
        }
        Some(format!(
            "https://wa.me/{}?text={}",
            digits,
            urlencoding::encode(&self.render_message())
        ))
    }
}

// Resposta do booking para o cliente
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub appointment: Appointment,
    pub summary: BookingSummary,
    pub message: String,
    pub whatsapp_link: Option<String>,
}
