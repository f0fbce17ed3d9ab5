// src/models/catalog.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::common::error::AppError;

/// Preço em reais com no máximo centavos: não negativo e até 2 casas decimais.
pub(crate) fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("negative_price")
            .with_message("O preço não pode ser negativo".into()));
    }
    if price.normalize().scale() > 2 {
        return Err(ValidationError::new("sub_cent_price")
            .with_message("O preço deve ter no máximo 2 casas decimais".into()));
    }
    Ok(())
}

/// A mesma regra fora do derive (edição de preço, gravação no Ledger).
pub(crate) fn ensure_price(price: Decimal) -> Result<(), AppError> {
    validate_price(&price).map_err(|e| {
        AppError::InvalidInput(
            e.message
                .map(|m| m.to_string())
                .unwrap_or_else(|| e.code.to_string()),
        )
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[validate(length(min = 1, message = "required"))]
    pub id: String,

    #[validate(length(min = 1, message = "required"))]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,

    #[validate(range(min = 1, message = "A duração deve ser positiva"))]
    pub duration_min: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Professional {
    #[validate(length(min = 1, message = "required"))]
    pub id: String,

    #[validate(length(min = 1, message = "required"))]
    pub name: String,

    #[serde(default)]
    pub role: Option<String>,

    // Porcentagem da produção que fica com o profissional
    #[validate(range(max = 100, message = "A comissão deve estar entre 0 e 100"))]
    pub commission_rate: u8,

    pub is_available: bool,
}

/// Snapshot completo do catálogo, no formato do arquivo de seed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub professionals: Vec<Professional>,
}
