// src/models/schedule.rs

use chrono::NaiveTime;
use serde::Serialize;

use crate::{common::error::AppError, models::appointment::Appointment};

pub const DEFAULT_TIME_SLOTS: [&str; 9] = [
    "09:00", "10:00", "11:00", "13:00", "14:00", "15:00", "16:00", "17:00", "18:00",
];

/// Conjunto fechado de horários do dia. Vem da configuração, nunca do código do motor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotGrid {
    labels: Vec<String>,
}

impl SlotGrid {
    /// Aceita apenas rótulos `HH:MM` com zero à esquerda, sem repetição.
    /// A grade fica em ordem cronológica, que coincide com a ordem textual dos rótulos.
    pub fn new<I, S>(labels: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed: Vec<(NaiveTime, String)> = Vec::new();

        for raw in labels {
            let label = raw.as_ref().trim();
            let time = NaiveTime::parse_from_str(label, "%H:%M")
                .ok()
                .filter(|t| t.format("%H:%M").to_string() == label)
                .ok_or_else(|| {
                    AppError::InvalidInput(format!("horário inválido na grade: '{}'", label))
                })?;

            if parsed.iter().any(|(t, _)| *t == time) {
                return Err(AppError::InvalidInput(format!(
                    "horário repetido na grade: '{}'",
                    label
                )));
            }
            parsed.push((time, label.to_string()));
        }

        if parsed.is_empty() {
            return Err(AppError::InvalidInput("a grade de horários está vazia".into()));
        }

        parsed.sort_by_key(|(t, _)| *t);
        Ok(Self {
            labels: parsed.into_iter().map(|(_, label)| label).collect(),
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn ensure_contains(&self, label: &str) -> Result<(), AppError> {
        if self.contains(label) {
            Ok(())
        } else {
            Err(AppError::InvalidInput(format!(
                "o horário '{}' não faz parte da grade de atendimento",
                label
            )))
        }
    }
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self {
            labels: DEFAULT_TIME_SLOTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    Free,
    Occupied,
    Blocked,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub time: String,
    pub status: SlotState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment: Option<Appointment>,
}
