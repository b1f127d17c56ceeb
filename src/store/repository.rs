use async_trait::async_trait;
use serde_json::Value;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    types::Json,
    PgPool,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::models::{
    Collection, DeleteOutcome, Document, Fields, Filter, InsertOutcome, UpdateOutcome, ID_FIELD,
};
use crate::shared::AppError;

/// Gateway to the external document database
#[async_trait]
pub trait DocumentStore {
    async fn find_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, AppError>;
    async fn find_one(&self, collection: Collection, id: Uuid)
        -> Result<Option<Document>, AppError>;
    async fn insert_one(
        &self,
        collection: Collection,
        fields: Fields,
    ) -> Result<InsertOutcome, AppError>;
    /// Merges `fields` into the stored document, leaving every other field untouched
    async fn update_one(
        &self,
        collection: Collection,
        id: Uuid,
        fields: Fields,
    ) -> Result<UpdateOutcome, AppError>;
    async fn delete_one(&self, collection: Collection, id: Uuid)
        -> Result<DeleteOutcome, AppError>;
    /// Connectivity check, run once at startup
    async fn ping(&self) -> Result<(), AppError>;
    /// Releases connections on shutdown
    async fn close(&self) {}
}

/// In-memory implementation of DocumentStore for development and testing
///
/// Documents are kept per collection in insertion order and are lost when
/// the process exits.
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a store with pre-populated documents in one collection
    pub fn with_documents(collection: Collection, documents: Vec<Document>) -> Self {
        let mut collections = HashMap::new();
        collections.insert(collection, documents);
        Self {
            collections: RwLock::new(collections),
        }
    }

    pub async fn document_count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    #[instrument(skip(self, filter))]
    async fn find_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, AppError> {
        let collections = self.collections.read().await;
        let documents: Vec<Document> = collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default();

        debug!(count = documents.len(), "Documents fetched from memory");
        Ok(documents)
    }

    #[instrument(skip(self))]
    async fn find_one(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<Document>, AppError> {
        let collections = self.collections.read().await;
        let document = collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id).cloned());

        debug!(found = document.is_some(), "Document lookup in memory");
        Ok(document)
    }

    #[instrument(skip(self, fields))]
    async fn insert_one(
        &self,
        collection: Collection,
        fields: Fields,
    ) -> Result<InsertOutcome, AppError> {
        let document = Document::new(fields);
        let inserted_id = document.id;

        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(document);

        debug!(%inserted_id, "Document inserted in memory");
        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id,
        })
    }

    #[instrument(skip(self, fields))]
    async fn update_one(
        &self,
        collection: Collection,
        id: Uuid,
        mut fields: Fields,
    ) -> Result<UpdateOutcome, AppError> {
        fields.remove(ID_FIELD);

        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
        else {
            debug!("No document matched update in memory");
            return Ok(UpdateOutcome {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
            });
        };

        let mut modified = false;
        for (key, value) in fields {
            if document.fields.get(&key) != Some(&value) {
                document.fields.insert(key, value);
                modified = true;
            }
        }

        debug!(modified, "Document updated in memory");
        Ok(UpdateOutcome {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
        })
    }

    #[instrument(skip(self))]
    async fn delete_one(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<DeleteOutcome, AppError> {
        let mut collections = self.collections.write().await;
        let deleted_count = match collections.get_mut(&collection) {
            Some(docs) => match docs.iter().position(|d| d.id == id) {
                Some(index) => {
                    docs.remove(index);
                    1
                }
                None => 0,
            },
            None => 0,
        };

        debug!(deleted_count, "Document delete in memory");
        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// PostgreSQL implementation of DocumentStore
///
/// All collections share one `documents` table; document fields live in a
/// JSONB column so records stay schema-less.
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(options))]
    pub async fn connect(options: &PgConnectOptions, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options.clone())
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to connect to document database");
                AppError::DatabaseError(e.to_string())
            })?;

        info!(max_connections, "Connected to document database");
        Ok(Self::new(pool))
    }

    /// Creates the documents table and its lookup index if they do not exist
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                id UUID PRIMARY KEY,
                collection TEXT NOT NULL,
                body JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS documents_collection_idx ON documents (collection, created_at)",
        )
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        debug!("Document schema ensured");
        Ok(())
    }
}

fn database_error(e: sqlx::Error) -> AppError {
    warn!(error = %e, "Document database operation failed");
    AppError::DatabaseError(e.to_string())
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[instrument(skip(self, filter))]
    async fn find_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, AppError> {
        let rows = sqlx::query_as::<_, (Uuid, Json<Fields>)>(
            "SELECT id, body FROM documents
             WHERE collection = $1 AND body @> $2
             ORDER BY created_at, id",
        )
        .bind(collection.as_str())
        .bind(Json(filter.to_value()))
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        debug!(count = rows.len(), "Documents fetched from database");
        Ok(rows
            .into_iter()
            .map(|(id, Json(fields))| Document { id, fields })
            .collect())
    }

    #[instrument(skip(self))]
    async fn find_one(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<Document>, AppError> {
        let row = sqlx::query_as::<_, (Uuid, Json<Fields>)>(
            "SELECT id, body FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        debug!(found = row.is_some(), "Document lookup in database");
        Ok(row.map(|(id, Json(fields))| Document { id, fields }))
    }

    #[instrument(skip(self, fields))]
    async fn insert_one(
        &self,
        collection: Collection,
        fields: Fields,
    ) -> Result<InsertOutcome, AppError> {
        let document = Document::new(fields);

        sqlx::query("INSERT INTO documents (id, collection, body) VALUES ($1, $2, $3)")
            .bind(document.id)
            .bind(collection.as_str())
            .bind(Json(Value::Object(document.fields)))
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        debug!(inserted_id = %document.id, "Document inserted in database");
        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id: document.id,
        })
    }

    #[instrument(skip(self, fields))]
    async fn update_one(
        &self,
        collection: Collection,
        id: Uuid,
        mut fields: Fields,
    ) -> Result<UpdateOutcome, AppError> {
        fields.remove(ID_FIELD);

        // `unchanged` is evaluated against the row before the merge
        let unchanged = sqlx::query_scalar::<_, bool>(
            "WITH target AS (
                SELECT id, body @> $3 AS unchanged
                FROM documents
                WHERE collection = $1 AND id = $2
                FOR UPDATE
            )
            UPDATE documents
            SET body = documents.body || $3
            FROM target
            WHERE documents.id = target.id
            RETURNING target.unchanged",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(Value::Object(fields)))
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        let outcome = match unchanged {
            Some(unchanged) => UpdateOutcome {
                acknowledged: true,
                matched_count: 1,
                modified_count: u64::from(!unchanged),
            },
            None => UpdateOutcome {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
            },
        };

        debug!(
            matched = outcome.matched_count,
            modified = outcome.modified_count,
            "Document update in database"
        );
        Ok(outcome)
    }

    #[instrument(skip(self))]
    async fn delete_one(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<DeleteOutcome, AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        debug!(
            deleted_count = result.rows_affected(),
            "Document delete in database"
        );
        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count: result.rows_affected(),
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
        info!("Pinged document database, connection is healthy");
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Document database pool closed");
    }
}
