use super::value_objects::OrderLineItem;

// ============================================================================
// Structured Actions - validated intent extracted from model output
// ============================================================================
//
// Only the schema validator builds these. Nothing derived from raw user text
// reaches the order store without passing through it first.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum StructuredAction {
    Order {
        items: Vec<OrderLineItem>,
    },
    Cancel {
        order_number: i64,
    },
}

impl StructuredAction {
    pub fn kind(&self) -> &'static str {
        match self {
            StructuredAction::Order { .. } => "order",
            StructuredAction::Cancel { .. } => "cancel",
        }
    }
}
