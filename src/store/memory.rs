use async_trait::async_trait;
use chrono::Utc;
use std::sync::RwLock;
use uuid::Uuid;

use super::{OrderStore, StoreError};
use crate::domain::order::{Order, OrderLineItem};

/// In-memory backend for development and tests.
///
/// A single write lock covers "read max order number, insert next" for every
/// user, so creations serialize process-wide. That caps throughput at one
/// creation at a time, which is acceptable for a single drive-thru lane.
pub struct InMemoryOrderStore {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(
        &self,
        user_id: &str,
        items: Vec<OrderLineItem>,
        total_items: i64,
    ) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().map_err(poisoned)?;

        let order_number = orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .map(|o| o.order_number)
            .max()
            .unwrap_or(0)
            + 1;

        let order = Order {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            order_number,
            items,
            total_items,
            created_at: Utc::now(),
        };
        orders.push(order.clone());

        Ok(order)
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().map_err(poisoned)?;
        Ok(orders.clone())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().map_err(poisoned)?;

        // Insertion order is creation order, so reversing gives newest first
        // even when two orders share a timestamp.
        Ok(orders
            .iter()
            .rev()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_by_order_number_and_user(
        &self,
        order_number: i64,
        user_id: &str,
    ) -> Result<bool, StoreError> {
        let mut orders = self.orders.write().map_err(poisoned)?;
        let before = orders.len();
        orders.retain(|o| !(o.order_number == order_number && o.user_id == user_id));
        Ok(orders.len() < before)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
