use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

// ============================================================================
// Metrics Module - Prometheus metrics for the order pipeline
// ============================================================================
//
// - Requests by outcome (order, cancel, or the error kind)
// - Inference latency and failures by kind
// - Orders created / cancelled
//
// Exposed in text format on GET /metrics.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub requests_total: IntCounterVec,

    pub inference_duration: Histogram,
    pub inference_failures: IntCounterVec,

    pub orders_created: IntCounter,
    pub orders_cancelled: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("drive_thru_requests_total", "Processed customer requests by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let inference_duration = Histogram::with_opts(
            HistogramOpts::new(
                "drive_thru_inference_duration_seconds",
                "Time spent waiting on the inference endpoint",
            )
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0]),
        )?;
        registry.register(Box::new(inference_duration.clone()))?;

        let inference_failures = IntCounterVec::new(
            Opts::new("drive_thru_inference_failures_total", "Inference failures by kind"),
            &["kind"],
        )?;
        registry.register(Box::new(inference_failures.clone()))?;

        let orders_created = IntCounter::new("drive_thru_orders_created_total", "Orders placed")?;
        registry.register(Box::new(orders_created.clone()))?;

        let orders_cancelled =
            IntCounter::new("drive_thru_orders_cancelled_total", "Orders cancelled")?;
        registry.register(Box::new(orders_cancelled.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            inference_duration,
            inference_failures,
            orders_created,
            orders_cancelled,
        })
    }

    pub fn record_request(&self, outcome: &str) {
        self.requests_total.with_label_values(&[outcome]).inc();
    }

    pub fn record_inference(&self, duration_secs: f64, failure_kind: Option<&str>) {
        self.inference_duration.observe(duration_secs);
        if let Some(kind) = failure_kind {
            self.inference_failures.with_label_values(&[kind]).inc();
        }
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn encode_text(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert!(!metrics.registry.gather().is_empty());
    }

    #[test]
    fn test_record_request_outcomes() {
        let metrics = Metrics::new().unwrap();
        metrics.record_request("order");
        metrics.record_request("order");
        metrics.record_request("order_not_found");

        let text = metrics.encode_text().unwrap();
        assert!(text.contains("drive_thru_requests_total{outcome=\"order\"} 2"), "{text}");
        assert!(text.contains("drive_thru_requests_total{outcome=\"order_not_found\"} 1"), "{text}");
    }

    #[test]
    fn test_record_inference() {
        let metrics = Metrics::new().unwrap();
        metrics.record_inference(0.3, None);
        metrics.record_inference(10.0, Some("inference_timeout"));

        let text = metrics.encode_text().unwrap();
        assert!(text.contains("drive_thru_inference_duration_seconds_count 2"), "{text}");
        assert!(
            text.contains("drive_thru_inference_failures_total{kind=\"inference_timeout\"} 1"),
            "{text}"
        );
    }
}
