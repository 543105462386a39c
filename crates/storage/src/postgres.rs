//! PostgreSQL document store: every collection lives in one JSONB table.

use std::time::Duration;

use async_trait::async_trait;
use futures::{stream, StreamExt, TryStreamExt};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;
use tracing::{info, warn};
use uuid::Uuid;

use usquest_core::config::PostgresConfig;

use crate::document::{Document, DocumentStore, DocumentStream};
use crate::error::StorageError;

/// [`DocumentStore`] over the `documents` table.
///
/// Holds no pool when PostgreSQL is not configured; every operation then
/// fails with [`StorageError::Unavailable`]. Migrations run before the first
/// query and are retried on each use until they succeed once.
pub struct PgDocumentStore {
    pool: Option<PgPool>,
    migrated: OnceCell<()>,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Some(pool),
            migrated: OnceCell::new(),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            pool: None,
            migrated: OnceCell::new(),
        }
    }

    /// Build a lazily connecting pool and try to apply migrations.
    ///
    /// Neither a refused connection nor a failed migration is fatal here.
    /// An outage surfaces when a trigger first needs the backend.
    pub async fn connect(config: &PostgresConfig) -> Result<Self, StorageError> {
        let Some(url) = config.database_url() else {
            warn!("DATABASE_URL / PG_USERNAME not configured — assignments cannot be persisted");
            return Ok(Self::unconfigured());
        };

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect_lazy(&url)?;

        let store = Self::new(pool);
        match store.ready_pool().await {
            Ok(_) => info!("PostgreSQL ready at {}", config.host),
            Err(e) => warn!(
                host = %config.host,
                error = %e,
                "PostgreSQL not ready — migrations will be retried on first use"
            ),
        }

        Ok(store)
    }

    fn pool(&self) -> Result<&PgPool, StorageError> {
        self.pool
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable("PostgreSQL is not configured".into()))
    }

    /// The pool, once the schema is in place.
    async fn ready_pool(&self) -> Result<&PgPool, StorageError> {
        let pool = self.pool()?;
        self.migrated
            .get_or_try_init(|| async {
                sqlx::migrate!("../../migrations").run(pool).await?;
                info!("PostgreSQL migrations applied");
                Ok::<(), StorageError>(())
            })
            .await?;
        Ok(pool)
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, collection: &str, body: serde_json::Value) -> Result<String, StorageError> {
        let pool = self.ready_pool().await?;
        let id = Uuid::new_v4();

        sqlx::query("INSERT INTO documents (id, collection, body) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(collection)
            .bind(&body)
            .execute(pool)
            .await?;

        Ok(id.to_string())
    }

    fn stream_all<'a>(&'a self, collection: &'a str) -> DocumentStream<'a> {
        stream::once(self.ready_pool())
            .map_ok(move |pool| {
                sqlx::query_as::<_, (Uuid, serde_json::Value)>(
                    "SELECT id, body FROM documents WHERE collection = $1 ORDER BY created_at, id",
                )
                .bind(collection)
                .fetch(pool)
                .map(|row| {
                    row.map(|(id, body)| Document {
                        id: id.to_string(),
                        body,
                    })
                    .map_err(StorageError::from)
                })
            })
            .try_flatten()
            .boxed()
    }

    fn backend_name(&self) -> &str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_store_is_unavailable() {
        let store = PgDocumentStore::unconfigured();

        let err = store
            .insert("global_quests", serde_json::json!({"title": "x"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));

        let err = store
            .stream_all("users")
            .try_collect::<Vec<_>>()
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }

    #[tokio::test]
    async fn connect_without_credentials_is_unconfigured() {
        let config = PostgresConfig {
            url: None,
            host: "localhost".into(),
            port: 5432,
            database: "usquest".into(),
            username: None,
            password: None,
            ssl_mode: "prefer".into(),
            max_connections: 1,
            connect_timeout_secs: 1,
        };
        let store = PgDocumentStore::connect(&config).await.unwrap();
        assert!(store.pool.is_none());
        assert_eq!(store.backend_name(), "postgres");
    }

    #[tokio::test]
    async fn failed_migration_is_retried_on_next_use() {
        // Nothing listens on port 1, so every acquire fails.
        let config = PostgresConfig {
            url: Some("postgres://usquest:pw@127.0.0.1:1/usquest".into()),
            host: "127.0.0.1".into(),
            port: 1,
            database: "usquest".into(),
            username: None,
            password: None,
            ssl_mode: "disable".into(),
            max_connections: 1,
            connect_timeout_secs: 1,
        };
        let store = PgDocumentStore::connect(&config).await.unwrap();
        assert!(store.pool.is_some());
        assert!(store.migrated.get().is_none());

        for _ in 0..2 {
            let err = store
                .insert("global_quests", serde_json::json!({"title": "x"}))
                .await
                .unwrap_err();
            assert!(matches!(err, StorageError::Unavailable(_)));
            assert!(store.migrated.get().is_none(), "failure must not be cached");
        }

        let err = store
            .stream_all("users")
            .try_collect::<Vec<_>>()
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }
}
