use std::sync::Arc;
use std::time::Instant;

use crate::domain::order::{validate_action, ActionInterpreter, ActionOutcome};
use crate::error::PipelineError;
use crate::inference::{build_prompt, InferenceClient};
use crate::metrics::Metrics;
use crate::store::OrderStore;
use crate::utils::CircuitState;

// ============================================================================
// Order Pipeline
// ============================================================================
//
// caller text → prompt → inference → schema validation → interpreter → store
//
// Nothing is retried here. Inference failures and schema violations go back
// to the caller as typed errors.
//
// ============================================================================

pub struct OrderPipeline {
    inference: InferenceClient,
    interpreter: ActionInterpreter,
    metrics: Arc<Metrics>,
}

impl OrderPipeline {
    pub fn new(inference: InferenceClient, store: Arc<dyn OrderStore>, metrics: Arc<Metrics>) -> Self {
        Self {
            inference,
            interpreter: ActionInterpreter::new(store),
            metrics,
        }
    }

    pub async fn process(
        &self,
        user_id: &str,
        user_input: &str,
    ) -> Result<ActionOutcome, PipelineError> {
        let result = self.run(user_id, user_input).await;

        match &result {
            Ok(ActionOutcome::Placed(_)) => {
                self.metrics.record_request("order");
                self.metrics.orders_created.inc();
            }
            Ok(ActionOutcome::Cancelled { .. }) => {
                self.metrics.record_request("cancel");
                self.metrics.orders_cancelled.inc();
            }
            Err(e) => {
                self.metrics.record_request(e.kind());
                if e.is_expected() {
                    tracing::info!(user_id = %user_id, kind = e.kind(), error = %e, "Request rejected");
                } else {
                    tracing::warn!(user_id = %user_id, kind = e.kind(), error = %e, "Request failed");
                }
            }
        }

        result
    }

    async fn run(&self, user_id: &str, user_input: &str) -> Result<ActionOutcome, PipelineError> {
        if user_id.trim().is_empty() {
            return Err(PipelineError::InvalidRequest("user_id must not be empty".to_string()));
        }
        if user_input.trim().is_empty() {
            return Err(PipelineError::InvalidRequest("user_input must not be empty".to_string()));
        }

        tracing::info!(
            user_id = %user_id,
            input_len = user_input.len(),
            "Processing customer request"
        );

        let prompt = build_prompt(user_input);

        let started = Instant::now();
        let raw = self.inference.request_action(&prompt).await;
        let elapsed = started.elapsed().as_secs_f64();
        let raw = match raw {
            Ok(raw) => {
                self.metrics.record_inference(elapsed, None);
                raw
            }
            Err(e) => {
                let e = PipelineError::from(e);
                self.metrics.record_inference(elapsed, Some(e.kind()));
                return Err(e);
            }
        };

        let action = validate_action(&raw)?;
        tracing::debug!(user_id = %user_id, action = action.kind(), "Model output validated");

        self.interpreter.apply(user_id, action).await
    }

    pub async fn inference_circuit_state(&self) -> CircuitState {
        self.inference.circuit_state().await
    }
}
