use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use super::{AppState, ErrorBody};
use crate::domain::order::{ActionOutcome, Order};
use crate::error::PipelineError;
use crate::health::{check_inference, check_store, SystemHealth};

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub user_input: String,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Serialize)]
struct OrderPlacedResponse {
    message: &'static str,
    order: Order,
}

pub async fn read_root() -> impl Responder {
    HttpResponse::Ok().json(MessageResponse {
        message: "Drive-thru ordering system API".to_string(),
    })
}

pub async fn health(state: web::Data<AppState>) -> impl Responder {
    let components = vec![
        check_store(state.store.as_ref()).await,
        check_inference(state.pipeline.inference_circuit_state().await),
    ];
    let health = SystemHealth::from_components(components);

    if health.healthy {
        HttpResponse::Ok().json(health)
    } else {
        HttpResponse::ServiceUnavailable().json(health)
    }
}

pub async fn metrics(state: web::Data<AppState>) -> HttpResponse {
    match state.metrics.encode_text() {
        Ok(text) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(text),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            HttpResponse::InternalServerError().json(ErrorBody {
                detail: e.to_string(),
            })
        }
    }
}

pub async fn list_orders(state: web::Data<AppState>) -> Result<HttpResponse, PipelineError> {
    let orders = state.store.list_all().await?;
    Ok(HttpResponse::Ok().json(orders))
}

pub async fn list_user_orders(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, PipelineError> {
    let user_id = path.into_inner();
    let orders = state.store.list_by_user(&user_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

pub async fn process_request(
    state: web::Data<AppState>,
    body: web::Json<ProcessRequest>,
) -> Result<HttpResponse, PipelineError> {
    let ProcessRequest { user_input, user_id } = body.into_inner();

    let response = match state.pipeline.process(&user_id, &user_input).await? {
        ActionOutcome::Placed(order) => HttpResponse::Ok().json(OrderPlacedResponse {
            message: "Order placed successfully",
            order,
        }),
        ActionOutcome::Cancelled { order_number } => HttpResponse::Ok().json(MessageResponse {
            message: format!("Order #{} cancelled successfully", order_number),
        }),
    };

    Ok(response)
}
