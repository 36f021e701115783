use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::OrderStore;
use crate::utils::CircuitState;

// ============================================================================
// Health Check Abstractions
// ============================================================================
//
// GET /health reports two components:
// - storage   - a round trip to the order store
// - inference - the circuit breaker in front of the model endpoint
//
// ============================================================================

/// Health status of a component
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_unhealthy(&self) -> bool {
        matches!(self, HealthStatus::Unhealthy(_))
    }
}

/// Health information for a component
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    #[serde(flatten)]
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ComponentHealth {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
            last_check: Utc::now(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    pub healthy: bool,
    pub components: Vec<ComponentHealth>,
}

impl SystemHealth {
    pub fn from_components(components: Vec<ComponentHealth>) -> Self {
        let healthy = !components.iter().any(|c| c.status.is_unhealthy());
        Self { healthy, components }
    }
}

pub async fn check_store(store: &dyn OrderStore) -> ComponentHealth {
    let status = match store.ping().await {
        Ok(()) => HealthStatus::Healthy,
        Err(e) => HealthStatus::Unhealthy(e.to_string()),
    };
    ComponentHealth::new("storage", status).with_details(store.backend_name())
}

pub fn check_inference(circuit: CircuitState) -> ComponentHealth {
    let status = match circuit {
        CircuitState::Closed => HealthStatus::Healthy,
        CircuitState::HalfOpen => HealthStatus::Degraded("probing endpoint recovery".to_string()),
        CircuitState::Open => {
            HealthStatus::Unhealthy("endpoint failing, circuit open".to_string())
        }
    };
    ComponentHealth::new("inference", status).with_details(format!("circuit {}", circuit.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryOrderStore;

    #[tokio::test]
    async fn test_memory_store_is_healthy() {
        let store = InMemoryOrderStore::new();
        let health = check_store(&store).await;

        assert_eq!(health.status, HealthStatus::Healthy);
        assert_eq!(health.details.as_deref(), Some("memory"));
    }

    #[test]
    fn test_open_circuit_makes_system_unhealthy() {
        let closed = SystemHealth::from_components(vec![check_inference(CircuitState::Closed)]);
        let half_open = SystemHealth::from_components(vec![check_inference(CircuitState::HalfOpen)]);
        let open = SystemHealth::from_components(vec![check_inference(CircuitState::Open)]);

        assert!(closed.healthy);
        assert!(half_open.healthy);
        assert!(!open.healthy);
    }

    #[test]
    fn test_component_json_shape() {
        let json = serde_json::to_value(check_inference(CircuitState::Open)).unwrap();
        assert_eq!(json["name"], "inference");
        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["reason"], "endpoint failing, circuit open");
        assert_eq!(json["details"], "circuit open");
    }
}
