// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::appointment::Slot;

/// Família do erro, para quem precisa ramificar sem olhar a variante exata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Conflict,
    NotFound,
    Validation,
    Forbidden,
    Storage,
    Internal,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Dados inválidos: {0}")]
    InvalidInput(String),

    #[error("O horário {} de {} já está ocupado", .0.time, .0.date)]
    SlotTaken(Slot),

    #[error("O horário {} de {} está bloqueado pelo estabelecimento", .0.time, .0.date)]
    SlotBlocked(Slot),

    #[error("O profissional {0} não está aceitando agendamentos")]
    ProfessionalUnavailable(String),

    #[error("{0} não encontrado")]
    ResourceNotFound(String),

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    // Falha da camada de armazenamento, propagada sem alteração
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::ValidationError(_) | AppError::InvalidInput(_) => ErrorKind::Validation,
            AppError::SlotTaken(_)
            | AppError::SlotBlocked(_)
            | AppError::ProfessionalUnavailable(_) => ErrorKind::Conflict,
            AppError::ResourceNotFound(_) => ErrorKind::NotFound,
            AppError::Forbidden(_) => ErrorKind::Forbidden,
            AppError::DatabaseError(_) => ErrorKind::Storage,
            AppError::InternalServerError(_) => ErrorKind::Internal,
        }
    }

    /// Código estável enviado ao cliente no corpo da resposta.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) | AppError::InvalidInput(_) => "validation_error",
            AppError::SlotTaken(_) => "slot_taken",
            AppError::SlotBlocked(_) => "slot_blocked",
            AppError::ProfessionalUnavailable(_) => "professional_unavailable",
            AppError::ResourceNotFound(_) => "not_found",
            AppError::Forbidden(_) => "forbidden",
            AppError::DatabaseError(_) => "storage_error",
            AppError::InternalServerError(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Storage | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let body = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "error": "Um ou mais campos são inválidos.",
                    "code": code,
                    "details": details,
                })
            }

            // Erros de armazenamento e internos viram 500 sem vazar detalhes.
            ref e @ (AppError::DatabaseError(_) | AppError::InternalServerError(_)) => {
                tracing::error!(error = ?e, "Erro Interno do Servidor: {}", e);
                json!({ "error": "Ocorreu um erro inesperado.", "code": code })
            }

            e => json!({ "error": e.to_string(), "code": code }),
        };

        (status, Json(body)).into_response()
    }
}
