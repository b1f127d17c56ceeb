// Public API - what other modules can use
pub use models::{
    parse_id, Collection, DeleteOutcome, Document, Fields, Filter, InsertOutcome, UpdateOutcome,
};
pub use repository::{DocumentStore, InMemoryDocumentStore, PostgresDocumentStore};

use std::sync::Arc;
use tracing::{info, instrument};

use crate::{config::StoreConfig, shared::AppError};

// Internal modules
pub mod models;
pub mod repository;

/// Opens the configured document store and verifies it is reachable.
/// Any failure here is fatal for startup.
#[instrument(skip(config))]
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn DocumentStore + Send + Sync>, AppError> {
    let store: Arc<dyn DocumentStore + Send + Sync> = match config {
        StoreConfig::Memory => {
            info!("Using in-memory document store");
            Arc::new(InMemoryDocumentStore::new())
        }
        StoreConfig::Postgres {
            options,
            max_connections,
        } => {
            let store = PostgresDocumentStore::connect(options, *max_connections).await?;
            store.ensure_schema().await?;
            Arc::new(store)
        }
    };

    store.ping().await?;
    Ok(store)
}
