//! Postgres-backed store.
//!
//! One generic repository, [`PgRepository`], serves every entity. What differs
//! per entity (table, columns, row mapping) lives in its [`PgEntity`] impl.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | RepositoryError |
//! |------------|-----------------------|-----------------|
//! | Database (foreign key violation) | `23503` | `Constraint` |
//! | Database (unique violation) | `23505` | `Constraint` |
//! | Database (not-null violation) | `23502` | `Constraint` |
//! | Database (check violation) | `23514` | `Constraint` |
//! | Database (other), PoolClosed, Io, ... | any other | `Database` |
//!
//! ## Sessions
//!
//! A [`PgSession`] is one transaction on one pooled connection. Dropping it
//! without `commit` rolls the transaction back (sqlx `Transaction` semantics).

use std::marker::PhantomData;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgConnection, PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use stockroom_core::{
    check_insert, check_lookup, check_update, Entity, FieldValue, Repository, RepositoryError,
    RepositoryResult, SerialId,
};
use stockroom_inventory::{Inventory, InventoryId};
use stockroom_products::{Product, ProductId};

use super::{InventoryRepository, ProductRepository, Session, StoreProvider};

/// Query with positional Postgres arguments.
pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Table mapping for an entity stored in Postgres.
///
/// Lookup fields are plain columns of `TABLE` named after the field.
pub trait PgEntity: Entity {
    const TABLE: &'static str;
    const ID_COLUMN: &'static str;
    /// Writable (non-id) columns, in the order `bind_columns` binds them.
    const COLUMNS: &'static [&'static str];
    /// `SELECT ... FROM ...` including joins; no `WHERE`/`ORDER BY`.
    const SELECT: &'static str;

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q>;

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error>;
}

impl PgEntity for Product {
    const TABLE: &'static str = "product";
    const ID_COLUMN: &'static str = "product_id";
    const COLUMNS: &'static [&'static str] = &["name", "price"];
    const SELECT: &'static str =
        "SELECT product.product_id, product.name, product.price FROM product";

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query.bind(self.name.as_str()).bind(self.price)
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Product {
            id: Some(ProductId::from_raw(row.try_get("product_id")?)),
            name: row.try_get("name")?,
            price: row.try_get("price")?,
        })
    }
}

impl PgEntity for Inventory {
    const TABLE: &'static str = "inventory";
    const ID_COLUMN: &'static str = "inventory_id";
    const COLUMNS: &'static [&'static str] = &["quantity", "location", "product_id"];
    const SELECT: &'static str = r#"SELECT
            inventory.inventory_id,
            inventory.quantity,
            inventory.location,
            inventory.product_id,
            product.name AS product_name,
            product.price AS product_price
        FROM inventory
        LEFT JOIN product ON product.product_id = inventory.product_id"#;

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.quantity)
            .bind(self.location.as_str())
            .bind(self.product_id().map(SerialId::raw))
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let product = match row.try_get::<Option<i32>, _>("product_id")? {
            Some(product_id) => Some(Product {
                id: Some(ProductId::from_raw(product_id)),
                name: row.try_get("product_name")?,
                price: row.try_get::<Decimal, _>("product_price")?,
            }),
            None => None,
        };
        Ok(Inventory {
            id: Some(InventoryId::from_raw(row.try_get("inventory_id")?)),
            quantity: row.try_get("quantity")?,
            location: row.try_get("location")?,
            product,
        })
    }
}

/// Map a sqlx error to the repository taxonomy (see module docs).
pub fn map_sqlx_error(err: sqlx::Error) -> RepositoryError {
    if let Some(db) = err.as_database_error() {
        if let Some(code) = db.code() {
            if matches!(code.as_ref(), "23502" | "23503" | "23505" | "23514") {
                return RepositoryError::constraint(db.message().to_string());
            }
        }
    }
    RepositoryError::database(err.to_string())
}

fn insert_sql<E: PgEntity>() -> String {
    let placeholders = (1..=E::COLUMNS.len())
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        E::TABLE,
        E::COLUMNS.join(", "),
        placeholders,
        E::ID_COLUMN
    )
}

fn update_sql<E: PgEntity>() -> String {
    let assignments = E::COLUMNS
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{col} = ${}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {} SET {} WHERE {} = ${}",
        E::TABLE,
        assignments,
        E::ID_COLUMN,
        E::COLUMNS.len() + 1
    )
}

fn bind_value<'q>(query: PgQuery<'q>, value: &'q FieldValue) -> PgQuery<'q> {
    match value {
        FieldValue::Text(v) => query.bind(v.as_str()),
        FieldValue::Integer(v) => query.bind(*v),
        FieldValue::Decimal(v) => query.bind(*v),
    }
}

/// Postgres store: hands out one transaction per session.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreProvider for PgStore {
    async fn open(&self) -> RepositoryResult<Box<dyn Session>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(PgSession { tx }))
    }
}

pub struct PgSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl Session for PgSession {
    fn products(&mut self) -> ProductRepository<'_> {
        Box::new(PgRepository::<Product>::new(&mut *self.tx))
    }

    fn inventories(&mut self) -> InventoryRepository<'_> {
        Box::new(PgRepository::<Inventory>::new(&mut *self.tx))
    }

    async fn commit(self: Box<Self>) -> RepositoryResult<()> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }
}

/// Generic repository over one Postgres table, bound to a session connection.
pub struct PgRepository<'c, E> {
    conn: &'c mut PgConnection,
    _entity: PhantomData<fn() -> E>,
}

impl<'c, E: PgEntity> PgRepository<'c, E> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }

    async fn fetch(&mut self, sql: &str, value: Option<&FieldValue>) -> RepositoryResult<Vec<E>> {
        let query = sqlx::query(sql);
        let query = match value {
            Some(v) => bind_value(query, v),
            None => query,
        };
        let rows = query
            .fetch_all(&mut *self.conn)
            .await
            .map_err(map_sqlx_error)?;
        rows.iter()
            .map(E::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl<'c, E: PgEntity> Repository<E, E::Id> for PgRepository<'c, E> {
    #[instrument(level = "debug", skip_all, fields(entity = E::NAME), err)]
    async fn create(&mut self, entity: E) -> RepositoryResult<E> {
        check_insert(&entity)?;

        let sql = insert_sql::<E>();
        let row = entity
            .bind_columns(sqlx::query(&sql))
            .fetch_one(&mut *self.conn)
            .await
            .map_err(map_sqlx_error)?;
        let id = E::Id::from_raw(row.try_get(0).map_err(map_sqlx_error)?);

        self.find(&id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(E::NAME, id))
    }

    #[instrument(level = "debug", skip(self), fields(entity = E::NAME), err)]
    async fn find(&mut self, id: &E::Id) -> RepositoryResult<Option<E>> {
        let sql = format!("{} WHERE {}.{} = $1", E::SELECT, E::TABLE, E::ID_COLUMN);
        let row = sqlx::query(&sql)
            .bind(id.raw())
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(map_sqlx_error)?;
        row.as_ref()
            .map(E::from_row)
            .transpose()
            .map_err(map_sqlx_error)
    }

    #[instrument(level = "debug", skip(self), fields(entity = E::NAME), err)]
    async fn find_all(&mut self) -> RepositoryResult<Vec<E>> {
        let sql = format!("{} ORDER BY {}.{}", E::SELECT, E::TABLE, E::ID_COLUMN);
        self.fetch(&sql, None).await
    }

    #[instrument(level = "debug", skip(self), fields(entity = E::NAME), err)]
    async fn find_by(&mut self, field: &str, value: &FieldValue) -> RepositoryResult<Vec<E>> {
        // Whitelisted by `check_lookup`, so safe to splice into SQL.
        check_lookup::<E>(field, value)?;
        let sql = format!(
            "{} WHERE {}.{} = $1 ORDER BY {}.{}",
            E::SELECT,
            E::TABLE,
            field,
            E::TABLE,
            E::ID_COLUMN
        );
        self.fetch(&sql, Some(value)).await
    }

    #[instrument(level = "debug", skip_all, fields(entity = E::NAME), err)]
    async fn edit(&mut self, entity: E) -> RepositoryResult<E> {
        let id = check_update(&entity)?;

        let sql = update_sql::<E>();
        let result = entity
            .bind_columns(sqlx::query(&sql))
            .bind(id.raw())
            .execute(&mut *self.conn)
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(E::NAME, id));
        }

        self.find(&id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(E::NAME, id))
    }

    #[instrument(level = "debug", skip(self), fields(entity = E::NAME), err)]
    async fn remove(&mut self, id: &E::Id) -> RepositoryResult<()> {
        let sql = format!("DELETE FROM {} WHERE {} = $1", E::TABLE, E::ID_COLUMN);
        let result = sqlx::query(&sql)
            .bind(id.raw())
            .execute(&mut *self.conn)
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(E::NAME, id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_statement_binds_every_column() {
        assert_eq!(
            insert_sql::<Inventory>(),
            "INSERT INTO inventory (quantity, location, product_id) VALUES ($1, $2, $3) RETURNING inventory_id"
        );
    }

    #[test]
    fn update_statement_binds_id_last() {
        assert_eq!(
            update_sql::<Product>(),
            "UPDATE product SET name = $1, price = $2 WHERE product_id = $3"
        );
    }

    #[test]
    fn non_database_errors_map_to_database_kind() {
        let err = map_sqlx_error(sqlx::Error::PoolClosed);
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}
