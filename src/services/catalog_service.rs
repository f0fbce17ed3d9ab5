// src/services/catalog_service.rs

use std::{collections::HashSet, path::Path, sync::RwLock};

use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    common::error::AppError,
    models::catalog::{ensure_price, CatalogSnapshot, Professional, Service},
};

/// Visão somente-leitura do catálogo. O motor nunca altera serviços ou profissionais.
pub trait Catalog: Send + Sync {
    fn service(&self, id: &str) -> Option<Service>;
    fn professional(&self, id: &str) -> Option<Professional>;
    fn services(&self) -> Vec<Service>;
    fn professionals(&self) -> Vec<Professional>;

    fn require_service(&self, id: &str) -> Result<Service, AppError> {
        self.service(id)
            .ok_or_else(|| AppError::ResourceNotFound(format!("Serviço {}", id)))
    }

    fn require_professional(&self, id: &str) -> Result<Professional, AppError> {
        self.professional(id)
            .ok_or_else(|| AppError::ResourceNotFound(format!("Profissional {}", id)))
    }
}

fn validate_snapshot(snapshot: &CatalogSnapshot) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for service in &snapshot.services {
        service.validate()?;
        if !seen.insert(service.id.as_str()) {
            return Err(AppError::InvalidInput(format!("serviço duplicado: '{}'", service.id)));
        }
    }

    let mut seen = HashSet::new();
    for professional in &snapshot.professionals {
        professional.validate()?;
        if !seen.insert(professional.id.as_str()) {
            return Err(AppError::InvalidInput(format!(
                "profissional duplicado: '{}'",
                professional.id
            )));
        }
    }
    Ok(())
}

/// Catálogo carregado do arquivo de seed. O cadastro em si é de outro sistema;
/// aqui só entram a troca de disponibilidade e a edição de preço vindas de fora.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    inner: RwLock<CatalogSnapshot>,
}

impl InMemoryCatalog {
    pub fn new(snapshot: CatalogSnapshot) -> Result<Self, AppError> {
        validate_snapshot(&snapshot)?;
        Ok(Self {
            inner: RwLock::new(snapshot),
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let snapshot: CatalogSnapshot = serde_json::from_str(raw)
            .map_err(|e| AppError::InvalidInput(format!("catálogo inválido: {}", e)))?;
        Self::new(snapshot)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::InternalServerError(anyhow::anyhow!(
                "falha ao ler o catálogo {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&raw)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, CatalogSnapshot> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, CatalogSnapshot> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_professional_availability(
        &self,
        id: &str,
        is_available: bool,
    ) -> Result<Professional, AppError> {
        let mut snapshot = self.write();
        let professional = snapshot
            .professionals
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::ResourceNotFound(format!("Profissional {}", id)))?;

        professional.is_available = is_available;
        tracing::info!(professional_id = %id, is_available, "Disponibilidade do profissional alterada");
        Ok(professional.clone())
    }

    pub fn update_service_price(&self, id: &str, price: Decimal) -> Result<Service, AppError> {
        ensure_price(price)?;

        let mut snapshot = self.write();
        let service = snapshot
            .services
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::ResourceNotFound(format!("Serviço {}", id)))?;

        service.price = price;
        Ok(service.clone())
    }
}

impl Catalog for InMemoryCatalog {
    fn service(&self, id: &str) -> Option<Service> {
        self.read().services.iter().find(|s| s.id == id).cloned()
    }

    fn professional(&self, id: &str) -> Option<Professional> {
        self.read().professionals.iter().find(|p| p.id == id).cloned()
    }

    fn services(&self) -> Vec<Service> {
        self.read().services.clone()
    }

    fn professionals(&self) -> Vec<Professional> {
        self.read().professionals.clone()
    }
}
