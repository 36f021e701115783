use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;

// ============================================================================
// Order Value Objects
// ============================================================================

/// The only things the drive-thru sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuItem {
    Burgers,
    Fries,
    Drinks,
}

impl MenuItem {
    pub const ALL: [MenuItem; 3] = [MenuItem::Burgers, MenuItem::Fries, MenuItem::Drinks];

    /// Case-sensitive lookup of a menu name as the model is asked to emit it.
    pub fn parse(name: &str) -> Option<Self> {
        MenuItem::ALL.into_iter().find(|item| item.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MenuItem::Burgers => "burgers",
            MenuItem::Fries => "fries",
            MenuItem::Drinks => "drinks",
        }
    }
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of an order. `quantity` is always >= 1 once it has passed the
/// schema validator.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct OrderLineItem {
    pub item: MenuItem,
    pub quantity: i32,
}

impl OrderLineItem {
    pub fn new(item: MenuItem, quantity: i32) -> Self {
        Self { item, quantity }
    }
}

/// Sum of line quantities, computed once when an order is placed.
pub fn total_items(items: &[OrderLineItem]) -> i64 {
    items.iter().map(|line| i64::from(line.quantity)).sum()
}

/// A placed order as persisted by an `OrderStore`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: String,
    pub order_number: i64,
    pub items: Vec<OrderLineItem>,
    pub total_items: i64,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Unit Tests
// ============================================================================
