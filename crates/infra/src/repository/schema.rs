//! Relational schema for the SQLite adapters.
//!
//! - `order_lines`: one row per persisted order line; `id` is bookkeeping only.
//! - `batches`: one row per batch, unique on `reference`.
//! - `allocations`: links a batch row to the order line rows allocated to it.

use sqlx::SqlitePool;

use crate::error::StorageResult;

const CREATE_ORDER_LINES: &str = r#"
    CREATE TABLE IF NOT EXISTS order_lines (
        id       INTEGER PRIMARY KEY AUTOINCREMENT,
        sku      VARCHAR(255),
        quantity INTEGER NOT NULL,
        order_id VARCHAR(255)
    )
"#;

const CREATE_BATCHES: &str = r#"
    CREATE TABLE IF NOT EXISTS batches (
        id                 INTEGER PRIMARY KEY AUTOINCREMENT,
        reference          VARCHAR(255) NOT NULL UNIQUE,
        sku                VARCHAR(255) NOT NULL,
        purchased_quantity INTEGER NOT NULL,
        eta                DATE NULL
    )
"#;

const CREATE_ALLOCATIONS: &str = r#"
    CREATE TABLE IF NOT EXISTS allocations (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        orderline_id INTEGER NOT NULL REFERENCES order_lines (id),
        batch_id     INTEGER NOT NULL REFERENCES batches (id)
    )
"#;

/// Create all tables if they do not exist yet. Safe to run on every start.
pub async fn migrate(pool: &SqlitePool) -> StorageResult<()> {
    for statement in [CREATE_ORDER_LINES, CREATE_BATCHES, CREATE_ALLOCATIONS] {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::debug!("schema migrated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn migrate_is_idempotent() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        migrate(&pool).await.unwrap();
        migrate(&pool).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
        assert_eq!(names, vec!["allocations", "batches", "order_lines"]);
    }
}
