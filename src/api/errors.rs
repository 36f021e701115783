use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::domain::order::{OrderError, SchemaError};
use crate::error::PipelineError;
use crate::inference::InferenceError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ResponseError for PipelineError {
    fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            PipelineError::Order(OrderError::NotFound(_)) => StatusCode::NOT_FOUND,
            PipelineError::Inference(InferenceError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            // The model host, or the model itself, gave us nothing usable.
            PipelineError::Inference(InferenceError::Unavailable(_))
            | PipelineError::Inference(InferenceError::MalformedOutput(_))
            | PipelineError::Schema(SchemaError::UnknownActionType(_))
            | PipelineError::Schema(SchemaError::MissingOrderNumber)
            | PipelineError::Schema(SchemaError::InvalidItems) => StatusCode::BAD_GATEWAY,
            PipelineError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            detail: self.to_string(),
        })
    }
}
