// src/config.rs

use std::{env, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{LedgerStore, MemoryLedgerStore, PgLedgerStore},
    models::{
        catalog::CatalogSnapshot,
        schedule::{SlotGrid, DEFAULT_TIME_SLOTS},
    },
    services::{
        agenda_service::Establishment, AgendaService, AvailabilityService, FinanceService,
        InMemoryCatalog, LogNotificationSink, NotificationSink,
    },
};

// =============================================================================
//  CONFIGURAÇÃO (variáveis de ambiente)
// =============================================================================

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub time_slots: SlotGrid,
    pub establishment: Establishment,
    pub catalog_path: PathBuf,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta as configurações a partir de qualquer fonte chave/valor (o ambiente, nos testes um mapa).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: '{}'", raw))?,
            None => 5,
        };

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("BIND_ADDR inválido: '{}'", bind_addr))?;

        let time_slots = match get("TIME_SLOTS") {
            Some(raw) => SlotGrid::new(raw.split(',').map(str::trim))
                .context("TIME_SLOTS inválido")?,
            None => SlotGrid::new(DEFAULT_TIME_SLOTS)?,
        };

        Ok(Self {
            database_url: get("DATABASE_URL"),
            db_max_connections,
            bind_addr,
            time_slots,
            establishment: Establishment {
                name: get("ESTABLISHMENT_NAME").unwrap_or_else(|| "Barbearia".to_string()),
                phone: get("ESTABLISHMENT_PHONE").unwrap_or_default(),
            },
            catalog_path: get("CATALOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("seeds/catalog.json")),
        })
    }
}

// =============================================================================
//  ESTADO COMPARTILHADO
// =============================================================================

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<InMemoryCatalog>,
    pub agenda_service: AgendaService,
    pub availability_service: AvailabilityService,
    pub finance_service: FinanceService,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let store: Arc<dyn LedgerStore> = match settings.database_url.as_deref() {
            Some(database_url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(settings.db_max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await
                    .context("Falha ao conectar ao banco de dados")?;

                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                let repo = PgLedgerStore::new(pool);
                repo.run_migrations().await?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
                Arc::new(repo)
            }
            None => {
                tracing::warn!("DATABASE_URL ausente: usando agenda em memória (nada sobrevive a um restart)");
                Arc::new(MemoryLedgerStore::new())
            }
        };

        let catalog = if settings.catalog_path.exists() {
            let catalog = InMemoryCatalog::from_file(&settings.catalog_path)?;
            tracing::info!(path = %settings.catalog_path.display(), "Catálogo carregado");
            catalog
        } else {
            tracing::warn!(
                path = %settings.catalog_path.display(),
                "Arquivo de catálogo não encontrado: iniciando com catálogo vazio"
            );
            InMemoryCatalog::new(CatalogSnapshot::default())?
        };

        Ok(Self::from_parts(
            settings,
            store,
            Arc::new(catalog),
            Arc::new(LogNotificationSink),
        ))
    }

    /// Monta o gráfico de dependências a partir de peças já prontas.
    pub fn from_parts(
        settings: Settings,
        store: Arc<dyn LedgerStore>,
        catalog: Arc<InMemoryCatalog>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let grid = settings.time_slots.clone();

        let agenda_service = AgendaService::new(
            store.clone(),
            catalog.clone(),
            grid.clone(),
            sink,
            settings.establishment.clone(),
        );
        let availability_service = AvailabilityService::new(store.clone(), catalog.clone(), grid);
        let finance_service = FinanceService::new(store, catalog.clone());

        Self {
            catalog,
            agenda_service,
            availability_service,
            finance_service,
        }
    }
}
