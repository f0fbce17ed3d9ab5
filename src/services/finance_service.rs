// src/services/finance_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    common::error::AppError,
    db::LedgerStore,
    models::{
        appointment::{Appointment, AppointmentFilter, DateRange, PaymentMethod},
        catalog::Professional,
        finance::{DailySummary, FinancialReport, PaymentBreakdown, ProfessionalFinancials},
    },
    services::catalog_service::Catalog,
};

fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Comissão = produção * taxa / 100, arredondada meio-para-cima em centavos.
pub fn split_commission(total_production: Decimal, commission_rate: u8) -> (Decimal, Decimal) {
    let commission = round_money(total_production * Decimal::from(commission_rate) / Decimal::ONE_HUNDRED);
    (commission, total_production - commission)
}

/// Produção, comissão e parte da casa por profissional no intervalo.
/// Cancelados e bloqueios ficam de fora; quem não atendeu aparece zerado.
pub fn compute_financials(
    range: DateRange,
    professionals: &[Professional],
    appointments: &[Appointment],
) -> Vec<ProfessionalFinancials> {
    professionals
        .iter()
        .map(|pro| {
            let included: Vec<&Appointment> = appointments
                .iter()
                .filter(|a| {
                    a.professional_id == pro.id
                        && range.contains(a.date)
                        && a.status.counts_as_revenue()
                })
                .collect();

            let total_production: Decimal = included.iter().map(|a| a.price).sum();
            let (commission, house_share) = split_commission(total_production, pro.commission_rate);

            ProfessionalFinancials {
                professional_id: pro.id.clone(),
                professional_name: pro.name.clone(),
                commission_rate: pro.commission_rate,
                services_count: included.len(),
                total_production,
                commission,
                house_share,
            }
        })
        .collect()
}

fn revenue_of_day<'a>(
    date: NaiveDate,
    appointments: &'a [Appointment],
) -> impl Iterator<Item = &'a Appointment> {
    appointments
        .iter()
        .filter(move |a| a.date == date && a.status.counts_as_revenue())
}

/// Faturamento do dia por forma de pagamento. Sem forma de pagamento não entra em nenhum balde.
pub fn payment_breakdown(date: NaiveDate, appointments: &[Appointment]) -> PaymentBreakdown {
    revenue_of_day(date, appointments).fold(PaymentBreakdown::default(), |mut acc, a| {
        match a.payment_method {
            Some(PaymentMethod::Pix) => acc.pix_revenue += a.price,
            Some(PaymentMethod::Cash) => acc.cash_revenue += a.price,
            Some(PaymentMethod::Card) => acc.card_revenue += a.price,
            None => {}
        }
        acc
    })
}

pub fn daily_summary(date: NaiveDate, appointments: &[Appointment]) -> DailySummary {
    let (count, total) = revenue_of_day(date, appointments)
        .fold((0usize, Decimal::ZERO), |(n, sum), a| (n + 1, sum + a.price));

    let average_ticket = if count == 0 {
        Decimal::ZERO
    } else {
        round_money(total / Decimal::from(count))
    };

    DailySummary {
        date,
        total_revenue: total,
        appointments_count: count,
        average_ticket,
        payments: payment_breakdown(date, appointments),
    }
}

#[derive(Clone)]
pub struct FinanceService {
    store: Arc<dyn LedgerStore>,
    catalog: Arc<dyn Catalog>,
}

impl FinanceService {
    pub fn new(store: Arc<dyn LedgerStore>, catalog: Arc<dyn Catalog>) -> Self {
        Self { store, catalog }
    }

    pub async fn commission_report(&self, range: DateRange) -> Result<FinancialReport, AppError> {
        let appointments = self
            .store
            .list(&AppointmentFilter {
                date_range: Some(range),
                ..Default::default()
            })
            .await?;

        let professionals = self.catalog.professionals();

        Ok(FinancialReport {
            from: range.from,
            to: range.to,
            professionals: compute_financials(range, &professionals, &appointments),
        })
    }

    pub async fn daily_summary(&self, date: NaiveDate) -> Result<DailySummary, AppError> {
        let appointments = self
            .store
            .list(&AppointmentFilter {
                date_range: Some(DateRange::single_day(date)),
                ..Default::default()
            })
            .await?;

        Ok(daily_summary(date, &appointments))
    }
}
