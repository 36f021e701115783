use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;
use uuid::Uuid;

use super::{OrderStore, StoreError};
use crate::domain::order::{Order, OrderLineItem};

// ============================================================================
// PostgreSQL Order Store
// ============================================================================
//
// Per-user numbering runs inside one transaction:
// 1. pg_advisory_xact_lock(hashtext(user_id)) serializes creators of one user
// 2. MAX(order_number) + 1 is read under that lock
// 3. the row is inserted and the transaction commits (lock released)
//
// Different users hash to different locks and never wait on each other.
// UNIQUE (user_id, order_number) backs the lock up at the schema level.
//
// ============================================================================

const CREATE_ORDERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS orders (
    id UUID PRIMARY KEY,
    user_id TEXT NOT NULL,
    items JSONB NOT NULL,
    total_items BIGINT NOT NULL,
    order_number BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT orders_user_order_number_key UNIQUE (user_id, order_number)
)";

const CREATE_USER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS orders_user_id_idx ON orders (user_id)";

const SELECT_ORDER_COLUMNS: &str =
    "SELECT id, user_id, items::text AS items, total_items, order_number, created_at FROM orders";

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create the orders table and its index if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_ORDERS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_USER_INDEX).execute(&self.pool).await?;
        tracing::info!("Orders schema ready");
        Ok(())
    }
}

fn order_from_row(row: &PgRow) -> Result<Order, StoreError> {
    let items_json: String = row.try_get("items")?;
    let items: Vec<OrderLineItem> = serde_json::from_str(&items_json)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;

    Ok(Order {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        order_number: row.try_get("order_number")?,
        items,
        total_items: row.try_get("total_items")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(
        &self,
        user_id: &str,
        items: Vec<OrderLineItem>,
        total_items: i64,
    ) -> Result<Order, StoreError> {
        let items_json = serde_json::to_string(&items)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let id = Uuid::new_v4();

        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let (order_number,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(order_number), 0) + 1 FROM orders WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let row = sqlx::query(
            "INSERT INTO orders (id, user_id, items, total_items, order_number)
             VALUES ($1, $2, $3::jsonb, $4, $5)
             RETURNING created_at",
        )
        .bind(id)
        .bind(user_id)
        .bind(&items_json)
        .bind(total_items)
        .bind(order_number)
        .fetch_one(&mut *tx)
        .await?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        tx.commit().await?;

        tracing::debug!(
            order_id = %id,
            user_id = %user_id,
            order_number = order_number,
            "Inserted order row"
        );

        Ok(Order {
            id,
            user_id: user_id.to_string(),
            order_number,
            items,
            total_items,
            created_at,
        })
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(&format!("{SELECT_ORDER_COLUMNS} ORDER BY created_at ASC, id ASC"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(order_from_row).collect()
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(&format!(
            "{SELECT_ORDER_COLUMNS} WHERE user_id = $1 ORDER BY created_at DESC, order_number DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(order_from_row).collect()
    }

    async fn delete_by_order_number_and_user(
        &self,
        order_number: i64,
        user_id: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM orders WHERE order_number = $1 AND user_id = $2")
            .bind(order_number)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

// ============================================================================
// Integration Tests (need a live PostgreSQL via DATABASE_URL)
// ============================================================================
