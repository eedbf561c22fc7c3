mod error;
use std::sync::Arc;

pub use error::{AppError, FieldErrors, Result};
pub mod category_service;
pub mod config;
pub mod currency_service;
pub mod expense_service;
pub mod models;
pub mod report_service;
mod routes;
pub mod storage;

use axum::Router;
use category_service::CategoryService;
use config::Settings;
use currency_service::CurrencyService;
use expense_service::ExpenseService;
use models::AppState;
use report_service::ReportService;
use storage::{MemoryStorage, PgStorage, Storage};

/// Wires the services around one storage backend
pub fn build_state(storage: Arc<dyn Storage>, settings: &Settings) -> Result<AppState> {
    let currency_service =
        CurrencyService::new(settings.exchange_api_base.clone(), settings.exchange_timeout)?;
    Ok(AppState::new(
        CategoryService::new(storage.clone()),
        ExpenseService::new(storage.clone()),
        ReportService::new(storage),
        currency_service,
    ))
}

/// Opens the configured store: Postgres when `DATABASE_URL` is set, memory otherwise
pub async fn open_storage(settings: &Settings) -> Result<Arc<dyn Storage>> {
    match &settings.database_url {
        Some(url) => {
            tracing::info!("connecting to postgres");
            let storage: Arc<dyn Storage> =
                PgStorage::connect(url, settings.database_max_connections).await?;
            tracing::info!("database ready");
            Ok(storage)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, records are kept in memory only");
            Ok(Arc::new(MemoryStorage::new()))
        }
    }
}

pub fn app(state: AppState, settings: &Settings) -> Router {
    routes::init(state, settings.request_timeout)
}
