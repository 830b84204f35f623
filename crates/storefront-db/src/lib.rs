use std::sync::Arc;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use storefront_core::{AppConfig, CoreError, DatastoreKind};
use thiserror::Error;

pub mod firestore;
pub mod memory;
pub mod orders;
pub mod postgres;
pub mod products;
pub mod reviews;
pub mod store;

#[cfg(test)]
mod testing;

pub use firestore::{FirestoreConfig, FirestoreStore};
pub use memory::MemoryStore;
pub use orders::{
    create_order, get_order, list_all_orders, list_orders_by_user, update_order_status,
};
pub use postgres::PgStore;
pub use products::{get_custom_product, list_custom_products, save_product};
pub use reviews::{
    create_review, delete_review, list_all_reviews, list_reviews_by_product,
    list_reviews_for_display,
};
pub use store::{Datastore, QueryOrder};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Path relative to crates/storefront-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend cannot serve an ordered query until an index is built.
    #[error("query requires an index that is not available: {0}")]
    MissingIndex(String),

    #[error("record not found")]
    NotFound,

    #[error("datastore request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("datastore returned HTTP {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Invalid(#[from] CoreError),
}

/// Connect to a Postgres pool using explicit URL and config.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Run all pending migrations against the pool.
///
/// Returns the number of migrations that were applied.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, sqlx::migrate::MigrateError> {
    // The _sqlx_migrations table does not exist on a fresh database; treat
    // absence as zero applied.
    let applied_before: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    MIGRATOR.run(pool).await?;

    let applied_after: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    let delta = (applied_after - applied_before).max(0);
    Ok(usize::try_from(delta).unwrap_or(0))
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Builds the datastore backend selected by `STOREFRONT_DATASTORE`.
///
/// The Postgres backend connects and applies pending migrations before
/// returning.
///
/// # Errors
///
/// Returns [`StoreError`] if the backend cannot be constructed or reached.
pub async fn open_datastore(config: &AppConfig) -> Result<Arc<dyn Datastore>, StoreError> {
    match &config.datastore {
        DatastoreKind::Firestore {
            project_id,
            base_url,
            access_token,
        } => {
            let store = FirestoreStore::new(FirestoreConfig {
                project_id: project_id.clone(),
                base_url: base_url.clone(),
                access_token: access_token.clone(),
                timeout_secs: config.http_timeout_secs,
                user_agent: config.user_agent.clone(),
            })?;
            Ok(Arc::new(store))
        }
        DatastoreKind::Postgres { database_url } => {
            let pool = connect_pool(database_url, PoolConfig::from_app_config(config)).await?;
            let applied = run_migrations(&pool).await?;
            tracing::info!(applied, "postgres migrations up to date");
            Ok(Arc::new(PgStore::new(pool)))
        }
        DatastoreKind::Memory => {
            tracing::warn!("using in-memory datastore; nothing will be persisted");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
