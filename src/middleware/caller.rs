// src/middleware/caller.rs

use std::collections::HashSet;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    models::access::{Capability, CallerContext},
};

// Cabeçalhos preenchidos pelo gateway de autenticação (fora deste serviço)
pub const PROFESSIONAL_ID_HEADER: &str = "x-professional-id";
pub const CAPABILITIES_HEADER: &str = "x-capabilities";

fn header_str<'a>(parts: &'a Parts, name: &str) -> Result<Option<&'a str>, AppError> {
    match parts.headers.get(name) {
        Some(value) => value
            .to_str()
            .map(|s| Some(s.trim()))
            .map_err(|_| AppError::InvalidInput(format!("Cabeçalho {} contém caracteres inválidos.", name))),
        None => Ok(None),
    }
}

impl<S> FromRequestParts<S> for CallerContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Sem cabeçalhos = visitante anônimo, sem nenhuma capacidade
        let professional_id = header_str(parts, PROFESSIONAL_ID_HEADER)?
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let capabilities: HashSet<Capability> = match header_str(parts, CAPABILITIES_HEADER)? {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse::<Capability>)
                .collect::<Result<_, _>>()?,
            None => HashSet::new(),
        };

        Ok(CallerContext {
            professional_id,
            capabilities,
        })
    }
}
