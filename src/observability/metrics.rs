use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token metrics
    pub token_lookups: IntCounterVec,
    pub token_exchanges: IntCounterVec,
    pub token_exchange_duration: HistogramVec,

    // Tracking metrics
    pub tracking_requests: IntCounterVec,
    pub tracking_duration: HistogramVec,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("upsclient".into()), None).unwrap();

        let token_lookups = IntCounterVec::new(
            Opts::new("token_cache_lookups_total", "Token cache lookups by result"),
            &["result"],
        )
        .unwrap();
        let token_exchanges = IntCounterVec::new(
            Opts::new("token_exchanges_total", "OAuth token exchanges by outcome"),
            &["outcome"],
        )
        .unwrap();
        let token_exchange_duration = HistogramVec::new(
            HistogramOpts::new("token_exchange_duration_seconds", "OAuth token exchange latency").buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 30.0]),
            &["outcome"],
        )
        .unwrap();
        let tracking_requests = IntCounterVec::new(
            Opts::new("tracking_requests_total", "Tracking lookups by outcome"),
            &["outcome"],
        )
        .unwrap();
        let tracking_duration = HistogramVec::new(
            HistogramOpts::new("tracking_duration_seconds", "Tracking lookup latency").buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 30.0]),
            &["outcome"],
        )
        .unwrap();

        registry.register(Box::new(token_lookups.clone())).unwrap();
        registry.register(Box::new(token_exchanges.clone())).unwrap();
        registry.register(Box::new(token_exchange_duration.clone())).unwrap();
        registry.register(Box::new(tracking_requests.clone())).unwrap();
        registry.register(Box::new(tracking_duration.clone())).unwrap();

        Arc::new(Self {
            registry,
            token_lookups,
            token_exchanges,
            token_exchange_duration,
            tracking_requests,
            tracking_duration,
        })
    }

    /// Prometheus text exposition of every registered metric.
    pub fn encode_text(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::new();
        if encoder.encode(&self.registry.gather(), &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

/// Label for an operation result.
pub fn outcome_label<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() { "success" } else { "failure" }
}
