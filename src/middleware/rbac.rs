// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::access::{CallerContext, Capability},
};

/// 1. O Trait que define qual capacidade uma rota exige
pub trait CapabilityDef: Send + Sync + 'static {
    fn capability() -> Capability;
}

/// 2. O Extractor (Guardião)
pub struct RequireCapability<T>(pub CallerContext, pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireCapability<T>
where
    T: CapabilityDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let caller = CallerContext::from_request_parts(parts, state).await?;
        caller.require(T::capability())?;
        Ok(RequireCapability(caller, PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS CAPACIDADES (TIPOS)
// ---

pub struct CapManageCatalog;
impl CapabilityDef for CapManageCatalog {
    fn capability() -> Capability { Capability::ManageCatalog }
}

pub struct CapViewAllFinancials;
impl CapabilityDef for CapViewAllFinancials {
    fn capability() -> Capability { Capability::ViewAllFinancials }
}
