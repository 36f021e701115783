// ============================================================================
// HTTP API
// ============================================================================
//
//   GET  /                   liveness message
//   GET  /health             storage + inference status
//   GET  /metrics            Prometheus text format
//   GET  /orders             every order (legacy listing)
//   GET  /orders/{user_id}   one user's orders, newest first
//   POST /process-request    free text in, order placed or cancelled
//
// ============================================================================

mod errors;
mod handlers;

pub use errors::ErrorBody;

use actix_cors::Cors;
use actix_web::{error, web, HttpResponse};
use std::sync::Arc;

use crate::metrics::Metrics;
use crate::pipeline::OrderPipeline;
use crate::store::OrderStore;

/// Shared state injected into every handler.
pub struct AppState {
    pub pipeline: Arc<OrderPipeline>,
    pub store: Arc<dyn OrderStore>,
    pub metrics: Arc<Metrics>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/", web::get().to(handlers::read_root))
        .route("/health", web::get().to(handlers::health))
        .route("/metrics", web::get().to(handlers::metrics))
        .route("/orders", web::get().to(handlers::list_orders))
        .route("/orders/{user_id}", web::get().to(handlers::list_user_orders))
        .route("/process-request", web::post().to(handlers::process_request));
}

/// Malformed request bodies answer 400 with the same `{detail}` shape as
/// pipeline errors.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let body = ErrorBody {
            detail: err.to_string(),
        };
        error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

/// CORS for the trusted frontend origins only.
pub fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}
