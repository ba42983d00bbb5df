//! Store connection provider and request-scoped sessions.
//!
//! A [`StoreProvider`] hands out one [`Session`] per request. The session is
//! the unit of work: repositories obtained from it share its connection (or
//! lock), writes become visible on [`Session::commit`], and a session that is
//! dropped without committing is rolled back. Handlers therefore release the
//! session on every path, success or failure.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;

use stockroom_core::{Repository, RepositoryResult};
use stockroom_inventory::{Inventory, InventoryId};
use stockroom_products::{Product, ProductId};

use crate::config::AppConfig;

pub mod memory;
pub mod postgres;
pub mod schema;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Product repository borrowed from a session.
pub type ProductRepository<'s> = Box<dyn Repository<Product, ProductId> + 's>;

/// Inventory repository borrowed from a session.
pub type InventoryRepository<'s> = Box<dyn Repository<Inventory, InventoryId> + 's>;

/// Request-scoped unit of work over the store.
#[async_trait]
pub trait Session: Send {
    fn products(&mut self) -> ProductRepository<'_>;

    fn inventories(&mut self) -> InventoryRepository<'_>;

    /// Make every write performed through this session durable.
    async fn commit(self: Box<Self>) -> RepositoryResult<()>;
}

/// Supplies sessions; shared by all requests.
#[async_trait]
pub trait StoreProvider: Send + Sync {
    async fn open(&self) -> RepositoryResult<Box<dyn Session>>;
}

/// Build the store selected by `config`.
///
/// With `DATABASE_URL` set this connects a Postgres pool and makes sure the
/// tables exist; otherwise it returns an empty in-memory store.
pub async fn connect(config: &AppConfig) -> RepositoryResult<Arc<dyn StoreProvider>> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; using in-memory store (data is not persisted)");
        return Ok(Arc::new(InMemoryStore::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await
        .map_err(postgres::map_sqlx_error)?;

    schema::ensure_schema(&pool).await?;

    tracing::info!(
        max_connections = config.max_connections,
        "connected to postgres store"
    );
    Ok(Arc::new(PgStore::new(pool)))
}
