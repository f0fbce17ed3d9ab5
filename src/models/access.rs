// src/models/access.rs

use std::collections::HashSet;
use std::str::FromStr;

use serde::Serialize;

use crate::common::error::AppError;

/// Capacidades entregues pelo colaborador de autenticação. O motor só as consulta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewOwnSchedule,
    ViewAllSchedules,
    ManageCatalog,
    ViewAllFinancials,
}

impl Capability {
    pub fn slug(self) -> &'static str {
        match self {
            Capability::ViewOwnSchedule => "view_own_schedule",
            Capability::ViewAllSchedules => "view_all_schedules",
            Capability::ManageCatalog => "manage_catalog",
            Capability::ViewAllFinancials => "view_all_financials",
        }
    }
}

impl FromStr for Capability {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "view_own_schedule" => Ok(Capability::ViewOwnSchedule),
            "view_all_schedules" => Ok(Capability::ViewAllSchedules),
            "manage_catalog" => Ok(Capability::ManageCatalog),
            "view_all_financials" => Ok(Capability::ViewAllFinancials),
            other => Err(AppError::InvalidInput(format!("capacidade desconhecida: '{}'", other))),
        }
    }
}

/// Quem está chamando: o profissional (se houver) e o que ele pode fazer.
#[derive(Debug, Clone, Default)]
pub struct CallerContext {
    pub professional_id: Option<String>,
    pub capabilities: HashSet<Capability>,
}

impl CallerContext {
    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Você precisa da capacidade '{}' para realizar esta ação.",
                capability.slug()
            )))
        }
    }

    fn is_self(&self, professional_id: &str) -> bool {
        self.professional_id.as_deref() == Some(professional_id)
    }

    /// A própria agenda pede `view_own_schedule`; a de outro profissional, `view_all_schedules`.
    pub fn ensure_schedule_access(&self, professional_id: &str) -> Result<(), AppError> {
        if self.can(Capability::ViewAllSchedules) {
            return Ok(());
        }
        if self.is_self(professional_id) {
            return self.require(Capability::ViewOwnSchedule);
        }
        self.require(Capability::ViewAllSchedules)
    }

    pub fn sees_all_financials(&self) -> bool {
        self.can(Capability::ViewAllFinancials)
    }

    pub fn sees_financials_of(&self, professional_id: &str) -> bool {
        self.sees_all_financials() || self.is_self(professional_id)
    }
}
