use serde_json::Value;

use super::{MenuItem, OrderLineItem, SchemaError, StructuredAction};

// ============================================================================
// Schema Validator - turns untrusted model JSON into a StructuredAction
// ============================================================================
//
// The prompt asks the model to follow these rules; this module enforces them
// regardless of what the model actually returned.
//
// Rules, in order:
// 1. `type` must be "order" or "cancel"
// 2. "order": `items` is an array; off-menu or non-positive lines are dropped
// 3. "cancel": a positive whole `order_number`; legacy `order_id` is read
//    only when `order_number` is absent
//
// ============================================================================

/// Field names accepted for the cancel target, newest first. The first one
/// present decides; an invalid value never falls through to the next.
const ORDER_NUMBER_FIELDS: [&str; 2] = ["order_number", "order_id"];

pub fn validate_action(raw: &Value) -> Result<StructuredAction, SchemaError> {
    let action_type = raw.get("type").and_then(Value::as_str);

    match action_type {
        Some("order") => {
            let items = raw
                .get("items")
                .and_then(Value::as_array)
                .ok_or(SchemaError::InvalidItems)?;

            Ok(StructuredAction::Order {
                items: items.iter().filter_map(validate_line).collect(),
            })
        }
        Some("cancel") => {
            let order_number = ORDER_NUMBER_FIELDS
                .iter()
                .find_map(|field| raw.get(*field))
                .and_then(whole_number)
                .filter(|n| *n > 0)
                .ok_or(SchemaError::MissingOrderNumber)?;

            Ok(StructuredAction::Cancel { order_number })
        }
        Some(other) => Err(SchemaError::UnknownActionType(other.to_string())),
        None => Err(SchemaError::UnknownActionType(
            raw.get("type").map(Value::to_string).unwrap_or_else(|| "missing".to_string()),
        )),
    }
}

/// JSON integers, plus floats with no fractional part (`5.0`).
fn whole_number(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// A line survives only with a menu item and an integer quantity in 1..=i32::MAX.
fn validate_line(line: &Value) -> Option<OrderLineItem> {
    let item = line.get("item").and_then(Value::as_str).and_then(MenuItem::parse);
    let quantity = line
        .get("quantity")
        .and_then(Value::as_i64)
        .filter(|q| *q > 0)
        .and_then(|q| i32::try_from(q).ok());

    match (item, quantity) {
        (Some(item), Some(quantity)) => Some(OrderLineItem::new(item, quantity)),
        _ => {
            tracing::debug!(line = %line, "Dropping invalid order line");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_items_kept_in_order() {
        let raw = json!({
            "type": "order",
            "items": [
                {"item": "fries", "quantity": 3},
                {"item": "burgers", "quantity": 2},
                {"item": "drinks", "quantity": 1}
            ]
        });

        let action = validate_action(&raw).unwrap();
        assert_eq!(
            action,
            StructuredAction::Order {
                items: vec![
                    OrderLineItem::new(MenuItem::Fries, 3),
                    OrderLineItem::new(MenuItem::Burgers, 2),
                    OrderLineItem::new(MenuItem::Drinks, 1),
                ]
            }
        );
    }

    #[test]
    fn test_off_menu_and_non_positive_lines_dropped() {
        let raw = json!({
            "type": "order",
            "items": [
                {"item": "pizza", "quantity": 2},
                {"item": "burgers", "quantity": 0},
                {"item": "fries", "quantity": -1},
                {"item": "Drinks", "quantity": 1},
                {"item": "drinks", "quantity": 1.5},
                {"item": "drinks", "quantity": "2"},
                "burgers",
                {"item": "drinks", "quantity": 2}
            ]
        });

        let action = validate_action(&raw).unwrap();
        assert_eq!(
            action,
            StructuredAction::Order {
                items: vec![OrderLineItem::new(MenuItem::Drinks, 2)]
            }
        );
    }

    #[test]
    fn test_all_items_invalid_yields_empty_order() {
        let raw = json!({"type": "order", "items": [{"item": "pizza", "quantity": 2}]});
        assert_eq!(
            validate_action(&raw).unwrap(),
            StructuredAction::Order { items: vec![] }
        );
    }

    #[test]
    fn test_quantity_beyond_i32_dropped() {
        let raw = json!({
            "type": "order",
            "items": [{"item": "fries", "quantity": 5_000_000_000i64}]
        });
        assert_eq!(
            validate_action(&raw).unwrap(),
            StructuredAction::Order { items: vec![] }
        );
    }

    #[test]
    fn test_items_must_be_array() {
        let missing = json!({"type": "order"});
        let object = json!({"type": "order", "items": {"item": "fries", "quantity": 1}});

        assert_eq!(validate_action(&missing), Err(SchemaError::InvalidItems));
        assert_eq!(validate_action(&object), Err(SchemaError::InvalidItems));
    }

    #[test]
    fn test_unknown_action_type() {
        let refund = json!({"type": "refund", "order_number": 1});
        let upper = json!({"type": "ORDER", "items": []});
        let untyped = json!({"items": []});
        let not_object = json!([1, 2, 3]);

        assert_eq!(
            validate_action(&refund),
            Err(SchemaError::UnknownActionType("refund".to_string()))
        );
        assert_eq!(
            validate_action(&upper),
            Err(SchemaError::UnknownActionType("ORDER".to_string()))
        );
        assert!(matches!(
            validate_action(&untyped),
            Err(SchemaError::UnknownActionType(_))
        ));
        assert!(matches!(
            validate_action(&not_object),
            Err(SchemaError::UnknownActionType(_))
        ));
    }

    #[test]
    fn test_cancel_accepts_both_field_names() {
        let current = json!({"type": "cancel", "order_number": 5});
        let legacy = json!({"type": "cancel", "order_id": 7});

        assert_eq!(
            validate_action(&current).unwrap(),
            StructuredAction::Cancel { order_number: 5 }
        );
        assert_eq!(
            validate_action(&legacy).unwrap(),
            StructuredAction::Cancel { order_number: 7 }
        );
    }

    #[test]
    fn test_cancel_requires_positive_integer() {
        for raw in [
            json!({"type": "cancel"}),
            json!({"type": "cancel", "order_number": 0}),
            json!({"type": "cancel", "order_number": -3}),
            json!({"type": "cancel", "order_number": "5"}),
            json!({"type": "cancel", "order_number": 2.5}),
            json!({"type": "cancel", "order_number": null}),
            json!({"type": "cancel", "order_number": 0.0}),
        ] {
            assert_eq!(validate_action(&raw), Err(SchemaError::MissingOrderNumber), "{}", raw);
        }
    }

    #[test]
    fn test_invalid_order_number_does_not_fall_back_to_order_id() {
        for raw in [
            json!({"type": "cancel", "order_number": "5", "order_id": 3}),
            json!({"type": "cancel", "order_number": -1, "order_id": 3}),
            json!({"type": "cancel", "order_number": null, "order_id": 3}),
        ] {
            assert_eq!(validate_action(&raw), Err(SchemaError::MissingOrderNumber), "{}", raw);
        }

        let both_valid = json!({"type": "cancel", "order_number": 5, "order_id": 3});
        assert_eq!(
            validate_action(&both_valid).unwrap(),
            StructuredAction::Cancel { order_number: 5 }
        );
    }

    #[test]
    fn test_cancel_accepts_whole_float() {
        let raw = json!({"type": "cancel", "order_number": 5.0});
        assert_eq!(
            validate_action(&raw).unwrap(),
            StructuredAction::Cancel { order_number: 5 }
        );
    }
}
