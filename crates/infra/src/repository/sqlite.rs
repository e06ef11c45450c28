//! SQLite-backed repositories.
//!
//! Data-mapper style: rows are decoded into plain values and then pushed
//! through the domain constructors, so a stored record that violates a domain
//! rule surfaces as `StorageError::Corrupt` instead of an invalid entity.
//!
//! Expects the tables created by [`super::schema::migrate`].

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::instrument;

use stockflow_allocation::{Batch, OrderLine};
use stockflow_core::{BatchRef, OrderId, Sku};

use super::r#trait::{BatchRepository, OrderLineRepository};
use crate::error::{StorageError, StorageResult};

/// Order line store over the `order_lines` table.
#[derive(Debug, Clone)]
pub struct SqliteOrderLineRepository {
    pool: SqlitePool,
}

impl SqliteOrderLineRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderLineRepository for SqliteOrderLineRepository {
    #[instrument(skip(self, line), fields(order_id = %line.order_id(), sku = %line.sku()))]
    async fn add(&self, line: &OrderLine) -> StorageResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_order_line(&mut conn, line).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self) -> StorageResult<Vec<OrderLine>> {
        let rows = sqlx::query("SELECT order_id, sku, quantity FROM order_lines ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(line_from_row).collect()
    }
}

/// Batch store over the `batches` and `allocations` tables.
///
/// Saving a batch rewrites its allocation links in one transaction. Allocated
/// lines are linked to an existing value-equal `order_lines` row when there is
/// one, otherwise a new row is inserted.
#[derive(Debug, Clone)]
pub struct SqliteBatchRepository {
    pool: SqlitePool,
}

impl SqliteBatchRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn load_allocations(&self, batch_id: i64, batch: &mut Batch) -> StorageResult<()> {
        let rows = sqlx::query(
            r#"
            SELECT ol.order_id, ol.sku, ol.quantity
            FROM allocations a
            JOIN order_lines ol ON ol.id = a.orderline_id
            WHERE a.batch_id = ?
            ORDER BY a.id
            "#,
        )
        .bind(batch_id)
        .fetch_all(&self.pool)
        .await?;

        for row in &rows {
            let line = line_from_row(row)?;
            batch.allocate(&line);
            if !batch.is_allocated(&line) {
                return Err(StorageError::Corrupt(format!(
                    "batch {} cannot hold stored allocation of {} x {} for order {}",
                    batch.reference(),
                    line.quantity(),
                    line.sku(),
                    line.order_id()
                )));
            }
        }
        Ok(())
    }

    async fn hydrate_all(&self, rows: Vec<SqliteRow>) -> StorageResult<Vec<Batch>> {
        let decoded = rows
            .iter()
            .map(batch_from_row)
            .collect::<StorageResult<Vec<_>>>()?;

        let mut batches = Vec::with_capacity(decoded.len());
        for (batch_id, mut batch) in decoded {
            self.load_allocations(batch_id, &mut batch).await?;
            batches.push(batch);
        }
        Ok(batches)
    }
}

#[async_trait]
impl BatchRepository for SqliteBatchRepository {
    #[instrument(skip(self, batch), fields(reference = %batch.reference()))]
    async fn add(&self, batch: &Batch) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;

        let batch_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO batches (reference, sku, purchased_quantity, eta)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (reference) DO UPDATE SET
                sku = excluded.sku,
                purchased_quantity = excluded.purchased_quantity,
                eta = excluded.eta
            RETURNING id
            "#,
        )
        .bind(batch.reference().as_str())
        .bind(batch.sku().as_str())
        .bind(batch.purchased_quantity())
        .bind(batch.eta())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM allocations WHERE batch_id = ?")
            .bind(batch_id)
            .execute(&mut *tx)
            .await?;

        for line in batch.allocations() {
            let line_id = match find_order_line(&mut tx, line).await? {
                Some(id) => id,
                None => insert_order_line(&mut tx, line).await?,
            };
            sqlx::query("INSERT INTO allocations (orderline_id, batch_id) VALUES (?, ?)")
                .bind(line_id)
                .bind(batch_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self, reference), fields(reference = %reference))]
    async fn get(&self, reference: &BatchRef) -> StorageResult<Option<Batch>> {
        let row = sqlx::query(
            "SELECT id, reference, sku, purchased_quantity, eta FROM batches WHERE reference = ?",
        )
        .bind(reference.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.hydrate_all(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn list(&self) -> StorageResult<Vec<Batch>> {
        let rows = sqlx::query(
            "SELECT id, reference, sku, purchased_quantity, eta FROM batches ORDER BY reference",
        )
        .fetch_all(&self.pool)
        .await?;
        self.hydrate_all(rows).await
    }

    #[instrument(skip(self, sku), fields(sku = %sku))]
    async fn list_for_sku(&self, sku: &Sku) -> StorageResult<Vec<Batch>> {
        let rows = sqlx::query(
            r#"
            SELECT id, reference, sku, purchased_quantity, eta
            FROM batches
            WHERE sku = ?
            ORDER BY reference
            "#,
        )
        .bind(sku.as_str())
        .fetch_all(&self.pool)
        .await?;
        self.hydrate_all(rows).await
    }
}

async fn insert_order_line(conn: &mut SqliteConnection, line: &OrderLine) -> StorageResult<i64> {
    let result = sqlx::query("INSERT INTO order_lines (sku, quantity, order_id) VALUES (?, ?, ?)")
        .bind(line.sku().as_str())
        .bind(line.quantity())
        .bind(line.order_id().as_str())
        .execute(&mut *conn)
        .await?;
    Ok(result.last_insert_rowid())
}

async fn find_order_line(
    conn: &mut SqliteConnection,
    line: &OrderLine,
) -> StorageResult<Option<i64>> {
    let id: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT id FROM order_lines
        WHERE order_id = ? AND sku = ? AND quantity = ?
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(line.order_id().as_str())
    .bind(line.sku().as_str())
    .bind(line.quantity())
    .fetch_optional(&mut *conn)
    .await?;
    Ok(id)
}

fn required_text(row: &SqliteRow, column: &str) -> StorageResult<String> {
    row.try_get::<Option<String>, _>(column)?
        .ok_or_else(|| StorageError::Corrupt(format!("column {column} is NULL")))
}

fn line_from_row(row: &SqliteRow) -> StorageResult<OrderLine> {
    let order_id = OrderId::new(required_text(row, "order_id")?)?;
    let sku = Sku::new(required_text(row, "sku")?)?;
    let quantity: i64 = row.try_get("quantity")?;
    Ok(OrderLine::new(order_id, sku, quantity)?)
}

fn batch_from_row(row: &SqliteRow) -> StorageResult<(i64, Batch)> {
    let id: i64 = row.try_get("id")?;
    let reference = BatchRef::new(required_text(row, "reference")?)?;
    let sku = Sku::new(required_text(row, "sku")?)?;
    let purchased_quantity: i64 = row.try_get("purchased_quantity")?;
    let eta: Option<NaiveDate> = row.try_get("eta")?;
    Ok((id, Batch::new(reference, sku, purchased_quantity, eta)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::schema::migrate;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        migrate(&pool).await.unwrap();
        pool
    }

    fn line(order_id: &str, sku: &str, qty: i64) -> OrderLine {
        OrderLine::new(OrderId::new(order_id).unwrap(), Sku::new(sku).unwrap(), qty).unwrap()
    }

    fn batch(reference: &str, sku: &str, qty: i64, eta: Option<NaiveDate>) -> Batch {
        Batch::new(BatchRef::new(reference).unwrap(), Sku::new(sku).unwrap(), qty, eta).unwrap()
    }

    #[tokio::test]
    async fn orderline_mapper_can_load_lines() {
        let pool = test_pool().await;
        sqlx::query(
            r#"
            INSERT INTO order_lines (order_id, sku, quantity) VALUES
                ('order1', 'RED-CHAIR', 12),
                ('order1', 'RED-TABLE', 13),
                ('order2', 'BLUE-LIPSTICK', 14)
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let repo = SqliteOrderLineRepository::new(pool);
        let expected = vec![
            line("order1", "RED-CHAIR", 12),
            line("order1", "RED-TABLE", 13),
            line("order2", "BLUE-LIPSTICK", 14),
        ];
        assert_eq!(repo.list().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn orderline_mapper_can_save_lines() {
        let pool = test_pool().await;
        let repo = SqliteOrderLineRepository::new(pool.clone());

        repo.add(&line("order1", "DECORATIVE-WIDGET", 12)).await.unwrap();

        let rows: Vec<(String, String, i64)> =
            sqlx::query_as("SELECT order_id, sku, quantity FROM order_lines")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(rows, vec![("order1".to_string(), "DECORATIVE-WIDGET".to_string(), 12)]);
    }

    #[tokio::test]
    async fn invalid_stored_line_is_reported_as_corrupt() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO order_lines (order_id, sku, quantity) VALUES ('o1', 'LAMP', 0)")
            .execute(&pool)
            .await
            .unwrap();

        let err = SqliteOrderLineRepository::new(pool).list().await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));
    }

    #[tokio::test]
    async fn batch_round_trips_with_allocations_and_eta() {
        let pool = test_pool().await;
        let repo = SqliteBatchRepository::new(pool);
        let eta = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        let mut b = batch("batch1", "SMALL-TABLE", 20, Some(eta));
        b.allocate(&line("order1", "SMALL-TABLE", 2));
        b.allocate(&line("order2", "SMALL-TABLE", 5));
        repo.add(&b).await.unwrap();

        let loaded = repo.get(b.reference()).await.unwrap().unwrap();
        assert_eq!(loaded, b);
        assert_eq!(loaded.eta(), Some(eta));
        assert_eq!(loaded.purchased_quantity(), 20);
        assert_eq!(loaded.available_quantity(), 13);
        assert!(loaded.is_allocated(&line("order2", "SMALL-TABLE", 5)));
    }

    #[tokio::test]
    async fn saving_again_replaces_allocations() {
        let pool = test_pool().await;
        let repo = SqliteBatchRepository::new(pool.clone());
        let first = line("order1", "LAMP", 3);
        let second = line("order2", "LAMP", 4);

        let mut b = batch("batch1", "LAMP", 10, None);
        b.allocate(&first);
        repo.add(&b).await.unwrap();

        b.deallocate(&first);
        b.allocate(&second);
        repo.add(&b).await.unwrap();

        let loaded = repo.get(b.reference()).await.unwrap().unwrap();
        assert!(!loaded.is_allocated(&first));
        assert!(loaded.is_allocated(&second));
        assert_eq!(loaded.available_quantity(), 6);

        let batch_rows: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM batches")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(batch_rows.0, 1);
    }

    #[tokio::test]
    async fn saving_a_batch_links_existing_order_line_rows() {
        let pool = test_pool().await;
        let lines = SqliteOrderLineRepository::new(pool.clone());
        let batches = SqliteBatchRepository::new(pool.clone());
        let l = line("order1", "LAMP", 3);

        lines.add(&l).await.unwrap();
        let mut b = batch("batch1", "LAMP", 10, None);
        b.allocate(&l);
        batches.add(&b).await.unwrap();

        assert_eq!(lines.list().await.unwrap(), vec![l]);
    }

    #[tokio::test]
    async fn overallocated_stored_batch_is_reported_as_corrupt() {
        let pool = test_pool().await;
        sqlx::query(
            "INSERT INTO batches (reference, sku, purchased_quantity, eta) VALUES ('b1', 'LAMP', 1, NULL)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO order_lines (order_id, sku, quantity) VALUES ('o1', 'LAMP', 5)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO allocations (orderline_id, batch_id) VALUES (1, 1)")
            .execute(&pool)
            .await
            .unwrap();

        let repo = SqliteBatchRepository::new(pool);
        let err = repo.get(&BatchRef::new("b1").unwrap()).await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(msg) if msg.contains("b1")));
    }

    #[tokio::test]
    async fn list_for_sku_returns_matching_batches_by_reference() {
        let pool = test_pool().await;
        let repo = SqliteBatchRepository::new(pool);
        for b in [
            batch("c-batch", "LAMP", 1, None),
            batch("a-batch", "LAMP", 1, None),
            batch("b-batch", "CHAIR", 1, None),
        ] {
            repo.add(&b).await.unwrap();
        }

        let lamps = repo.list_for_sku(&Sku::new("LAMP").unwrap()).await.unwrap();
        let refs: Vec<&str> = lamps.iter().map(|b| b.reference().as_str()).collect();
        assert_eq!(refs, vec!["a-batch", "c-batch"]);
        assert_eq!(repo.list().await.unwrap().len(), 3);
        assert!(repo.get(&BatchRef::new("missing").unwrap()).await.unwrap().is_none());
    }
}
