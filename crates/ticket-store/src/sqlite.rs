use std::str::FromStr;

use chrono::Utc;
use common::{INITIAL_STOCK, OrderId, TicketCode, UNIT_PRICE};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::{IssuedTicket, OrderRow, Result, StoreError};

/// SQLite-backed ticket store.
///
/// Wraps a connection pool; cheap to clone and share across handlers.
#[derive(Clone)]
pub struct TicketStore {
    pool: SqlitePool,
}

impl TicketStore {
    /// Opens (creating if missing) the database at the given sqlx URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Ok(Self { pool })
    }

    /// Opens a private in-memory database, for tests.
    ///
    /// Capped at one connection: each in-memory connection is otherwise its
    /// own empty database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs the database migrations and seeds the stock counter.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Executes the purchase workflow in one transaction.
    ///
    /// The stock decrement is conditional (`available >= quantity`), so two
    /// interleaved purchases can never drive the counter negative; whichever
    /// loses gets [`StoreError::InsufficientStock`] with the true remaining
    /// count. The per-ticket inserts and code patches share the transaction,
    /// so a failure mid-loop rolls back the decrement and every prior row.
    ///
    /// `quantity` must be positive; the API layer validates before calling.
    #[tracing::instrument(skip(self))]
    pub async fn purchase(
        &self,
        buyer_name: &str,
        buyer_email: &str,
        quantity: i64,
    ) -> Result<Vec<IssuedTicket>> {
        let mut tx = self.pool.begin().await?;

        let decremented =
            sqlx::query("UPDATE stock SET available = available - ?1 WHERE id = 1 AND available >= ?1")
                .bind(quantity)
                .execute(&mut *tx)
                .await?;

        if decremented.rows_affected() == 0 {
            let remaining: i64 = sqlx::query_scalar("SELECT available FROM stock WHERE id = 1")
                .fetch_optional(&mut *tx)
                .await?
                .unwrap_or(0);
            return Err(StoreError::InsufficientStock {
                requested: quantity,
                remaining,
            });
        }

        let now = Utc::now();
        let mut tickets = Vec::with_capacity(quantity as usize);

        // Serial inserts keep the issued ids contiguous within a purchase.
        for _ in 0..quantity {
            let inserted = sqlx::query(
                r#"
                INSERT INTO orders (buyer_name, buyer_email, quantity, total, created_at)
                VALUES (?1, ?2, 1, ?3, ?4)
                "#,
            )
            .bind(buyer_name)
            .bind(buyer_email)
            .bind(UNIT_PRICE)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            let id = OrderId::new(inserted.last_insert_rowid());
            let code = TicketCode::for_order(id);

            sqlx::query("UPDATE orders SET ticket_code = ?1 WHERE id = ?2")
                .bind(code.as_str())
                .bind(id.as_i64())
                .execute(&mut *tx)
                .await?;

            tickets.push(IssuedTicket {
                id,
                buyer_name: buyer_name.to_string(),
                buyer_email: buyer_email.to_string(),
                ticket_code: code,
                unit_price: UNIT_PRICE,
            });
        }

        tx.commit().await?;

        metrics::counter!("tickets_issued_total").increment(quantity as u64);
        tracing::info!(quantity, buyer_name, "tickets issued");

        Ok(tickets)
    }

    /// Returns all order rows, newest first.
    ///
    /// Rows from one purchase share a timestamp, so the id tie-break keeps
    /// the ordering deterministic.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<OrderRow>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, buyer_name, buyer_email, quantity, total, ticket_code, status, created_at
            FROM orders
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Loads one order row by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<OrderRow> {
        sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, buyer_name, buyer_email, quantity, total, ticket_code, status, created_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::OrderNotFound(id))
    }

    /// Returns the remaining stock, 0 if the singleton row is absent.
    #[tracing::instrument(skip(self))]
    pub async fn available(&self) -> Result<i64> {
        let available: Option<i64> = sqlx::query_scalar("SELECT available FROM stock WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(available.unwrap_or(0))
    }

    /// Marks an order cancelled.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, id: OrderId) -> Result<()> {
        let updated = sqlx::query("UPDATE orders SET status = 'cancelled' WHERE id = ?1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::OrderNotFound(id));
        }

        tracing::info!(%id, "order cancelled");
        Ok(())
    }

    /// Deletes all orders, restarts the id sequence at 1, and restores the
    /// stock counter to its initial value.
    #[tracing::instrument(skip(self))]
    pub async fn reset(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM orders").execute(&mut *tx).await?;

        // sqlite_sequence does not exist until the first AUTOINCREMENT
        // insert, so a missing table here just means nothing to clear.
        if let Err(e) = sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'orders'")
            .execute(&mut *tx)
            .await
        {
            let missing_table = matches!(
                &e,
                sqlx::Error::Database(db) if db.message().contains("no such table")
            );
            if !missing_table {
                return Err(e.into());
            }
        }

        sqlx::query("UPDATE stock SET available = ?1 WHERE id = 1")
            .bind(INITIAL_STOCK)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("store reset: orders cleared, stock back to {INITIAL_STOCK}");
        Ok(())
    }
}
