//! Idempotent table bootstrap for the Postgres store.
//!
//! Creates the two tables when they are missing; never alters existing ones.

use sqlx::PgPool;

use stockroom_core::RepositoryResult;

use super::postgres::map_sqlx_error;

const STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS product (
        product_id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        price NUMERIC(12, 2) NOT NULL CHECK (price >= 0)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS inventory (
        inventory_id SERIAL PRIMARY KEY,
        quantity INTEGER NOT NULL CHECK (quantity >= 0),
        location TEXT NOT NULL,
        product_id INTEGER NULL REFERENCES product (product_id)
    )"#,
    "CREATE INDEX IF NOT EXISTS inventory_product_id_idx ON inventory (product_id)",
];

/// Create the `product` and `inventory` tables if they do not exist.
pub async fn ensure_schema(pool: &PgPool) -> RepositoryResult<()> {
    for statement in STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(map_sqlx_error)?;
    }
    tracing::debug!(statements = STATEMENTS.len(), "schema ensured");
    Ok(())
}
