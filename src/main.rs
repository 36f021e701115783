use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod domain;
mod error;
mod health;
mod inference;
mod metrics;
mod pipeline;
mod store;
mod utils;

use api::AppState;
use config::AppConfig;
use inference::{InferenceClient, TogetherClient};
use pipeline::OrderPipeline;
use store::{InMemoryOrderStore, OrderStore, PgOrderStore};
use utils::{retry_on_transient, RetryConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging, overridable with RUST_LOG
    // Example: RUST_LOG=drive_thru=trace cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,drive_thru=debug"))
        )
        .init();

    tracing::info!("🍔 Starting drive-thru order intake service");

    let config = AppConfig::from_env()?;

    // === 1. Order store: PostgreSQL when configured, otherwise in-memory ===
    let store: Arc<dyn OrderStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to PostgreSQL...");
            let url = url.clone();
            let pg = retry_on_transient(RetryConfig::startup(), |attempt| {
                let url = url.clone();
                async move {
                    tracing::debug!(attempt = attempt, "Opening database pool");
                    PgOrderStore::connect(&url).await
                }
            })
            .await
            .into_result()?;
            pg.ensure_schema().await?;
            Arc::new(pg)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, orders are kept in memory only");
            Arc::new(InMemoryOrderStore::new())
        }
    };
    tracing::info!(backend = store.backend_name(), "Order store ready");

    // === 2. Metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);

    // === 3. Inference client ===
    if config.inference.api_key.is_none() {
        tracing::warn!("TOGETHER_API_KEY not set, inference requests will be unauthenticated");
    }
    tracing::info!(
        endpoint = %config.inference.endpoint,
        model = %config.inference.model,
        timeout_secs = config.inference.timeout.as_secs(),
        "Inference endpoint configured"
    );
    let completion = Arc::new(TogetherClient::new(config.inference.clone())?);
    let inference = InferenceClient::new(completion);

    // === 4. HTTP server ===
    let pipeline = Arc::new(OrderPipeline::new(inference, store.clone(), metrics.clone()));
    let state = web::Data::new(AppState {
        pipeline,
        store,
        metrics,
    });
    let origins = config.cors_allowed_origins.clone();

    tracing::info!("🚀 Listening on http://{}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(api::cors(&origins))
            .wrap(middleware::Logger::new("%r %s %Dms"))
            .app_data(state.clone())
            .configure(api::configure)
    })
    .bind(config.bind_addr)?
    .run()
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}
