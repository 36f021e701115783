use crate::domain::order::{OrderError, SchemaError};
use crate::inference::InferenceError;
use crate::store::StoreError;

// ============================================================================
// Pipeline Errors - everything a /process-request call can end with
// ============================================================================
//
// Each component keeps its own error enum; this one only gathers them so the
// HTTP layer can tell client errors (not found, bad input) from upstream and
// server failures.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl PipelineError {
    /// Stable name for logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidRequest(_) => "invalid_request",
            PipelineError::Inference(InferenceError::Timeout(_)) => "inference_timeout",
            PipelineError::Inference(InferenceError::Unavailable(_)) => "inference_unavailable",
            PipelineError::Inference(InferenceError::MalformedOutput(_)) => "malformed_model_output",
            PipelineError::Schema(SchemaError::UnknownActionType(_)) => "unknown_action_type",
            PipelineError::Schema(SchemaError::MissingOrderNumber) => "missing_order_number",
            PipelineError::Schema(SchemaError::InvalidItems) => "invalid_items",
            PipelineError::Order(OrderError::NotFound(_)) => "order_not_found",
            PipelineError::Storage(_) => "storage_unavailable",
        }
    }

    /// Outcomes a user can cause by asking for the wrong thing.
    pub fn is_expected(&self) -> bool {
        matches!(self, PipelineError::InvalidRequest(_) | PipelineError::Order(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_kinds_follow_taxonomy() {
        let cases: Vec<(PipelineError, &str)> = vec![
            (InferenceError::Timeout(Duration::from_secs(10)).into(), "inference_timeout"),
            (InferenceError::Unavailable("x".into()).into(), "inference_unavailable"),
            (InferenceError::MalformedOutput("x".into()).into(), "malformed_model_output"),
            (SchemaError::UnknownActionType("x".into()).into(), "unknown_action_type"),
            (SchemaError::MissingOrderNumber.into(), "missing_order_number"),
            (OrderError::NotFound(5).into(), "order_not_found"),
            (StoreError::Unavailable("x".into()).into(), "storage_unavailable"),
        ];

        for (error, kind) in cases {
            assert_eq!(error.kind(), kind);
        }
    }

    #[test]
    fn test_not_found_is_expected() {
        let not_found: PipelineError = OrderError::NotFound(5).into();
        let storage: PipelineError = StoreError::Unavailable("down".into()).into();

        assert!(not_found.is_expected());
        assert!(!storage.is_expected());
        assert_eq!(not_found.to_string(), "Order #5 not found");
    }
}
