// ============================================================================
// Order Business Rule Errors
// ============================================================================

/// Raised by the schema validator when model output cannot become a
/// `StructuredAction`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Unknown action type: {0}")]
    UnknownActionType(String),

    #[error("Cancel request is missing a positive order number")]
    MissingOrderNumber,

    #[error("Order items must be an array")]
    InvalidItems,
}

/// Raised by the action interpreter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Order #{0} not found")]
    NotFound(i64),
}
