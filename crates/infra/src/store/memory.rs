//! In-memory store for dev/test.
//!
//! Mirrors the Postgres schema closely enough for the HTTP surface to behave
//! the same: per-table id sequences, inventory → product foreign key with
//! restrict-on-delete, and all-or-nothing sessions.
//!
//! A session holds the store lock for its whole lifetime, so sessions are
//! serialized. Rollback restores the rows captured when the session opened;
//! id sequences are not rewound (same as Postgres sequences).

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use stockroom_core::{
    check_insert, check_lookup, check_update, Entity, FieldValue, Repository, RepositoryError,
    RepositoryResult, SerialId,
};
use stockroom_inventory::Inventory;
use stockroom_products::{Product, ProductId};

use super::{InventoryRepository, ProductRepository, Session, StoreProvider};

/// Rows of one entity type plus its id sequence.
#[derive(Debug, Clone)]
pub struct Table<E: Entity> {
    rows: BTreeMap<E::Id, E>,
    last_id: i32,
}

impl<E: Entity> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<E: Entity> Table<E> {
    fn next_id(&mut self) -> E::Id {
        self.last_id += 1;
        E::Id::from_raw(self.last_id)
    }
}

#[derive(Debug, Clone, Default)]
struct Tables {
    products: Table<Product>,
    inventories: Table<Inventory>,
}

impl Tables {
    fn restore_rows(&mut self, snapshot: Tables) {
        self.products.rows = snapshot.products.rows;
        self.inventories.rows = snapshot.inventories.rows;
    }
}

/// Shared in-memory store; cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreProvider for InMemoryStore {
    async fn open(&self) -> RepositoryResult<Box<dyn Session>> {
        let tables = self.tables.clone().lock_owned().await;
        let snapshot = tables.clone();
        Ok(Box::new(InMemorySession {
            tables,
            snapshot: Some(snapshot),
        }))
    }
}

/// Session over the in-memory store; rolls back on drop unless committed.
pub struct InMemorySession {
    tables: OwnedMutexGuard<Tables>,
    snapshot: Option<Tables>,
}

#[async_trait]
impl Session for InMemorySession {
    fn products(&mut self) -> ProductRepository<'_> {
        let Tables {
            products,
            inventories,
        } = &mut *self.tables;
        Box::new(InMemoryRepository::new(
            products,
            ProductLinks {
                inventories: &*inventories,
            },
        ))
    }

    fn inventories(&mut self) -> InventoryRepository<'_> {
        let Tables {
            products,
            inventories,
        } = &mut *self.tables;
        Box::new(InMemoryRepository::new(
            inventories,
            InventoryLinks {
                products: &*products,
            },
        ))
    }

    async fn commit(self: Box<Self>) -> RepositoryResult<()> {
        let mut session = self;
        session.snapshot = None;
        Ok(())
    }
}

impl Drop for InMemorySession {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.tables.restore_rows(snapshot);
            tracing::debug!("in-memory session rolled back");
        }
    }
}

/// Foreign-key behaviour of one table towards the others.
pub trait Links<E: Entity>: Send + Sync {
    /// Replace stored references with the current referenced rows.
    fn hydrate(&self, _entity: &mut E) {}

    /// Reject writes whose references do not exist.
    fn check_references(&self, _entity: &E) -> RepositoryResult<()> {
        Ok(())
    }

    /// Whether another table still points at `id`.
    fn is_referenced(&self, _id: &E::Id) -> bool {
        false
    }
}

struct ProductLinks<'s> {
    inventories: &'s Table<Inventory>,
}

impl Links<Product> for ProductLinks<'_> {
    fn is_referenced(&self, id: &ProductId) -> bool {
        self.inventories
            .rows
            .values()
            .any(|inv| inv.product_id() == Some(*id))
    }
}

struct InventoryLinks<'s> {
    products: &'s Table<Product>,
}

impl Links<Inventory> for InventoryLinks<'_> {
    fn hydrate(&self, entity: &mut Inventory) {
        entity.product = entity
            .product_id()
            .and_then(|id| self.products.rows.get(&id).cloned());
    }

    fn check_references(&self, entity: &Inventory) -> RepositoryResult<()> {
        match entity.product_id() {
            Some(id) if !self.products.rows.contains_key(&id) => Err(RepositoryError::constraint(
                format!("inventory references missing product {id}"),
            )),
            _ => Ok(()),
        }
    }
}

/// Generic repository over one in-memory table.
pub struct InMemoryRepository<'s, E: Entity, L> {
    table: &'s mut Table<E>,
    links: L,
}

impl<'s, E: Entity, L: Links<E>> InMemoryRepository<'s, E, L> {
    pub fn new(table: &'s mut Table<E>, links: L) -> Self {
        Self { table, links }
    }

    fn hydrated(&self, mut entity: E) -> E {
        self.links.hydrate(&mut entity);
        entity
    }
}

#[async_trait]
impl<'s, E, L> Repository<E, E::Id> for InMemoryRepository<'s, E, L>
where
    E: Entity,
    L: Links<E>,
{
    async fn create(&mut self, mut entity: E) -> RepositoryResult<E> {
        check_insert(&entity)?;
        self.links.check_references(&entity)?;

        let id = self.table.next_id();
        entity.assign_id(id);
        self.table.rows.insert(id, entity.clone());
        Ok(self.hydrated(entity))
    }

    async fn find(&mut self, id: &E::Id) -> RepositoryResult<Option<E>> {
        Ok(self.table.rows.get(id).cloned().map(|e| self.hydrated(e)))
    }

    async fn find_all(&mut self) -> RepositoryResult<Vec<E>> {
        Ok(self
            .table
            .rows
            .values()
            .cloned()
            .map(|e| self.hydrated(e))
            .collect())
    }

    async fn find_by(&mut self, field: &str, value: &FieldValue) -> RepositoryResult<Vec<E>> {
        check_lookup::<E>(field, value)?;
        Ok(self
            .table
            .rows
            .values()
            .filter(|e| e.field_value(field).as_ref() == Some(value))
            .cloned()
            .map(|e| self.hydrated(e))
            .collect())
    }

    async fn edit(&mut self, entity: E) -> RepositoryResult<E> {
        let id = check_update(&entity)?;
        self.links.check_references(&entity)?;

        let Some(row) = self.table.rows.get_mut(&id) else {
            return Err(RepositoryError::not_found(E::NAME, id));
        };
        *row = entity.clone();
        Ok(self.hydrated(entity))
    }

    async fn remove(&mut self, id: &E::Id) -> RepositoryResult<()> {
        if !self.table.rows.contains_key(id) {
            return Err(RepositoryError::not_found(E::NAME, id));
        }
        if self.links.is_referenced(id) {
            return Err(RepositoryError::constraint(format!(
                "{} {id} is still referenced",
                E::NAME
            )));
        }
        self.table.rows.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn widget() -> Product {
        Product::new("Widget", Decimal::new(999, 2))
    }

    #[tokio::test]
    async fn ids_are_assigned_sequentially_per_table() {
        let store = InMemoryStore::new();
        let mut session = store.open().await.unwrap();

        let a = session.products().create(widget()).await.unwrap();
        let b = session.products().create(widget()).await.unwrap();
        let inv = session
            .inventories()
            .create(Inventory::new(1, "A1", None))
            .await
            .unwrap();

        assert_eq!(a.id.map(SerialId::raw), Some(1));
        assert_eq!(b.id.map(SerialId::raw), Some(2));
        assert_eq!(inv.id.map(SerialId::raw), Some(1));
    }

    #[tokio::test]
    async fn find_all_on_empty_store_is_empty() {
        let store = InMemoryStore::new();
        let mut session = store.open().await.unwrap();
        assert!(session.products().find_all().await.unwrap().is_empty());
        assert!(session.inventories().find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn uncommitted_session_is_rolled_back() {
        let store = InMemoryStore::new();
        {
            let mut session = store.open().await.unwrap();
            session.products().create(widget()).await.unwrap();
        }

        let mut session = store.open().await.unwrap();
        assert!(session.products().find_all().await.unwrap().is_empty());

        // Sequences survive rollback.
        let created = session.products().create(widget()).await.unwrap();
        assert_eq!(created.id.map(SerialId::raw), Some(2));
    }

    #[tokio::test]
    async fn committed_session_is_visible_to_the_next_one() {
        let store = InMemoryStore::new();
        let mut session = store.open().await.unwrap();
        let created = session.products().create(widget()).await.unwrap();
        session.commit().await.unwrap();

        let mut session = store.open().await.unwrap();
        let found = session.products().find(&created.id.unwrap()).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn remove_missing_id_is_not_found_and_leaves_others() {
        let store = InMemoryStore::new();
        let mut session = store.open().await.unwrap();
        let kept = session.products().create(widget()).await.unwrap();

        let err = session
            .products()
            .remove(&ProductId::new(99))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { entity: "product", .. }));
        assert_eq!(session.products().find_all().await.unwrap(), vec![kept]);
    }

    #[tokio::test]
    async fn referenced_product_cannot_be_removed() {
        let store = InMemoryStore::new();
        let mut session = store.open().await.unwrap();
        let product = session.products().create(widget()).await.unwrap();
        session
            .inventories()
            .create(Inventory::new(5, "A1", Some(product.clone())))
            .await
            .unwrap();

        let err = session
            .products()
            .remove(&product.id.unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Constraint(_)));
    }

    #[tokio::test]
    async fn inventory_reads_reflect_current_product_state() {
        let store = InMemoryStore::new();
        let mut session = store.open().await.unwrap();
        let product = session.products().create(widget()).await.unwrap();
        let inv = session
            .inventories()
            .create(Inventory::new(5, "A1", Some(product.clone())))
            .await
            .unwrap();

        let mut repriced = product.clone();
        repriced.price = Decimal::new(1450, 2);
        session.products().edit(repriced.clone()).await.unwrap();

        let found = session
            .inventories()
            .find(&inv.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.product, Some(repriced));
    }

    #[tokio::test]
    async fn inventory_with_unknown_product_violates_foreign_key() {
        let store = InMemoryStore::new();
        let mut session = store.open().await.unwrap();
        let ghost = widget().with_id(ProductId::new(42));

        let err = session
            .inventories()
            .create(Inventory::new(1, "A1", Some(ghost)))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Constraint(_)));
    }

    #[tokio::test]
    async fn edit_of_unknown_id_is_not_found() {
        let store = InMemoryStore::new();
        let mut session = store.open().await.unwrap();
        let err = session
            .products()
            .edit(widget().with_id(ProductId::new(7)))
            .await
            .unwrap_err();
        assert_eq!(err, RepositoryError::not_found("product", 7));
    }

    #[tokio::test]
    async fn find_by_matches_declared_fields_only() {
        let store = InMemoryStore::new();
        let mut session = store.open().await.unwrap();
        session.products().create(widget()).await.unwrap();
        session
            .products()
            .create(Product::new("Gizmo", Decimal::new(1450, 2)))
            .await
            .unwrap();

        let by_price = session
            .products()
            .find_by("price", &FieldValue::Decimal(Decimal::new(145, 1)))
            .await
            .unwrap();
        assert_eq!(by_price.len(), 1);
        assert_eq!(by_price[0].name, "Gizmo");

        let err = session
            .products()
            .find_by("sku", &FieldValue::Text("x".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));
    }
}
