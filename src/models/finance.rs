// src/models/finance.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::appointment::DateRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinancialPeriod {
    Day,
    Month,
}

impl FinancialPeriod {
    pub fn range(self, today: NaiveDate) -> DateRange {
        match self {
            FinancialPeriod::Day => DateRange::single_day(today),
            FinancialPeriod::Month => DateRange::month_of(today),
        }
    }
}

// Uma linha do relatório de comissões
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalFinancials {
    pub professional_id: String,
    pub professional_name: String,
    pub commission_rate: u8,
    pub services_count: usize,
    pub total_production: Decimal, // Soma dos preços atendidos
    pub commission: Decimal,       // Parte do profissional
    pub house_share: Decimal,      // Parte da casa
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub professionals: Vec<ProfessionalFinancials>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBreakdown {
    pub pix_revenue: Decimal,
    pub cash_revenue: Decimal,
    pub card_revenue: Decimal,
}

// Os cards do topo do painel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_revenue: Decimal,
    pub appointments_count: usize,
    pub average_ticket: Decimal,
    #[serde(flatten)]
    pub payments: PaymentBreakdown,
}
