use std::sync::Arc;

use crate::error::PipelineError;
use crate::store::OrderStore;

use super::{total_items, Order, OrderError, StructuredAction};

// ============================================================================
// Action Interpreter
// ============================================================================
//
// Applies a validated StructuredAction for one user:
//   Order  → totals the surviving lines and creates an order
//   Cancel → deletes the caller's order with that number, if it exists
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Placed(Order),
    Cancelled { order_number: i64 },
}

pub struct ActionInterpreter {
    store: Arc<dyn OrderStore>,
}

impl ActionInterpreter {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    pub async fn apply(
        &self,
        user_id: &str,
        action: StructuredAction,
    ) -> Result<ActionOutcome, PipelineError> {
        match action {
            StructuredAction::Order { items } => {
                // An order with no valid lines is still recorded (total 0).
                let total = total_items(&items);
                if items.is_empty() {
                    tracing::info!(user_id = %user_id, "Placing order with no valid items");
                }

                let order = self.store.create(user_id, items, total).await?;

                tracing::info!(
                    order_id = %order.id,
                    user_id = %user_id,
                    order_number = order.order_number,
                    total_items = order.total_items,
                    "✅ Order placed"
                );

                Ok(ActionOutcome::Placed(order))
            }

            StructuredAction::Cancel { order_number } => {
                let deleted = self
                    .store
                    .delete_by_order_number_and_user(order_number, user_id)
                    .await?;

                if !deleted {
                    tracing::info!(
                        user_id = %user_id,
                        order_number = order_number,
                        "Cancel target not found for user"
                    );
                    return Err(OrderError::NotFound(order_number).into());
                }

                tracing::info!(
                    user_id = %user_id,
                    order_number = order_number,
                    "✅ Order cancelled"
                );

                Ok(ActionOutcome::Cancelled { order_number })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{MenuItem, OrderLineItem};
    use crate::store::InMemoryOrderStore;

    fn interpreter() -> (ActionInterpreter, Arc<InMemoryOrderStore>) {
        let store = Arc::new(InMemoryOrderStore::new());
        (ActionInterpreter::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_order_totals_items() {
        let (interpreter, store) = interpreter();
        let items = vec![
            OrderLineItem::new(MenuItem::Burgers, 2),
            OrderLineItem::new(MenuItem::Fries, 1),
        ];

        let outcome = interpreter
            .apply("alice", StructuredAction::Order { items: items.clone() })
            .await
            .unwrap();

        let ActionOutcome::Placed(order) = outcome else {
            panic!("expected a placed order");
        };
        assert_eq!(order.items, items);
        assert_eq!(order.total_items, 3);
        assert_eq!(order.order_number, 1);
        assert_eq!(store.list_by_user("alice").await.unwrap(), vec![order]);
    }

    #[tokio::test]
    async fn test_empty_order_is_still_recorded() {
        let (interpreter, store) = interpreter();

        let outcome = interpreter
            .apply("alice", StructuredAction::Order { items: vec![] })
            .await
            .unwrap();

        let ActionOutcome::Placed(order) = outcome else {
            panic!("expected a placed order");
        };
        assert!(order.items.is_empty());
        assert_eq!(order.total_items, 0);
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_missing_order_is_not_found() {
        let (interpreter, store) = interpreter();
        interpreter
            .apply("alice", StructuredAction::Order { items: vec![] })
            .await
            .unwrap();
        let before = store.list_all().await.unwrap();

        let result = interpreter
            .apply("alice", StructuredAction::Cancel { order_number: 5 })
            .await;

        assert!(matches!(
            result,
            Err(PipelineError::Order(OrderError::NotFound(5)))
        ));
        assert_eq!(store.list_all().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_cancel_only_touches_callers_order() {
        let (interpreter, store) = interpreter();
        for user in ["alice", "bob"] {
            interpreter
                .apply(
                    user,
                    StructuredAction::Order {
                        items: vec![OrderLineItem::new(MenuItem::Drinks, 1)],
                    },
                )
                .await
                .unwrap();
        }

        let outcome = interpreter
            .apply("alice", StructuredAction::Cancel { order_number: 1 })
            .await
            .unwrap();

        assert_eq!(outcome, ActionOutcome::Cancelled { order_number: 1 });
        assert!(store.list_by_user("alice").await.unwrap().is_empty());
        assert_eq!(store.list_by_user("bob").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_cannot_reach_other_users_order() {
        let (interpreter, store) = interpreter();
        interpreter
            .apply("bob", StructuredAction::Order { items: vec![] })
            .await
            .unwrap();

        let result = interpreter
            .apply("alice", StructuredAction::Cancel { order_number: 1 })
            .await;

        assert!(matches!(result, Err(PipelineError::Order(OrderError::NotFound(1)))));
        assert_eq!(store.list_by_user("bob").await.unwrap().len(), 1);
    }
}
