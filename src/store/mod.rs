// ============================================================================
// Order Store - authoritative collection of placed orders
// ============================================================================
//
// One capability interface, two backends:
// - memory   - process-local, used when no DATABASE_URL is configured
// - postgres - durable, transactional per-user numbering
//
// The backend is chosen once at startup and injected as Arc<dyn OrderStore>.
//
// ============================================================================

mod memory;
mod postgres;

pub use memory::InMemoryOrderStore;
pub use postgres::PgOrderStore;

use async_trait::async_trait;

use crate::domain::order::{Order, OrderLineItem};
use crate::utils::IsTransient;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("stored order is corrupt: {0}")]
    Serialization(String),
}

impl IsTransient for StoreError {
    fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order, assigning its id and the next order number for
    /// `user_id`. Either everything is stored or nothing is.
    async fn create(
        &self,
        user_id: &str,
        items: Vec<OrderLineItem>,
        total_items: i64,
    ) -> Result<Order, StoreError>;

    /// Every order, oldest first.
    async fn list_all(&self) -> Result<Vec<Order>, StoreError>;

    /// One user's orders, newest first.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Order>, StoreError>;

    /// Returns true if a row was deleted.
    async fn delete_by_order_number_and_user(
        &self,
        order_number: i64,
        user_id: &str,
    ) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str;
}
