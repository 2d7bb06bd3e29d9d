use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get};
use opentelemetry::metrics::{Counter, Histogram, MeterProvider};
use opentelemetry_sdk::metrics::{MetricError, SdkMeterProvider};
use prometheus::{Encoder, TextEncoder};
use tracing::info;

pub struct Metrics {
    registry: Arc<prometheus::Registry>,
    _provider: SdkMeterProvider,

    // Upstream RPC metrics
    pub rpc_requests: Counter<u64>,
    pub rpc_errors: Counter<u64>,
    pub rpc_latency: Histogram<f64>,

    // Served-request metrics
    pub requests_served: Counter<u64>,
    pub request_duration: Histogram<f64>,
    pub trace_records: Counter<u64>,
}

impl Metrics {
    pub fn new() -> Result<Self, MetricError> {
        // Create a new prometheus registry
        let registry = prometheus::Registry::new();

        // Configure OpenTelemetry to use this registry
        let exporter = opentelemetry_prometheus::exporter()
            .with_registry(registry.clone())
            .build()?;

        // Set up a meter to create instruments
        let provider = SdkMeterProvider::builder().with_reader(exporter).build();
        let meter = provider.meter("trace_bridge_metrics");

        let rpc_requests = meter
            .u64_counter("trace_bridge_rpc_requests")
            .with_description("Number of upstream RPC requests made")
            .build();

        let rpc_errors = meter
            .u64_counter("trace_bridge_rpc_errors")
            .with_description("Number of upstream RPC errors encountered")
            .build();

        let rpc_latency = meter
            .f64_histogram("trace_bridge_rpc_latency")
            .with_description("Upstream RPC request latency")
            .with_boundaries(vec![
                0.025, 0.05, 0.075, 0.1, 0.15, 0.2, 0.3, 0.5, 1.0, 5.0, 10.0,
            ])
            .with_unit("s")
            .build();

        let requests_served = meter
            .u64_counter("trace_bridge_requests_served")
            .with_description("Number of trace requests served")
            .build();

        let request_duration = meter
            .f64_histogram("trace_bridge_request_duration")
            .with_description("Time spent serving a trace request end to end")
            .with_boundaries(vec![
                0.025, 0.05, 0.075, 0.1, 0.15, 0.2, 0.3, 0.5, 1.0, 5.0, 10.0, 30.0,
            ])
            .with_unit("s")
            .build();

        let trace_records = meter
            .u64_counter("trace_bridge_trace_records")
            .with_description("Number of flat trace records emitted")
            .build();

        Ok(Self {
            registry: Arc::new(registry),
            _provider: provider,
            rpc_requests,
            rpc_errors,
            rpc_latency,
            requests_served,
            request_duration,
            trace_records,
        })
    }

    pub async fn start_metrics_server(&self, addr: &str, port: u16) {
        let addr = format!("{addr}:{port}").parse::<SocketAddr>().unwrap();
        let registry = self.registry.clone();

        let app = Router::new().route("/metrics", get(move || metrics_handler(registry.clone())));

        // Determine the access URL based on the binding address. Only used for logging.
        let access_url = if addr.ip().to_string() == "0.0.0.0" {
            format!("http://localhost:{port}/metrics")
        } else {
            format!("http://{}:{port}/metrics", addr.ip())
        };

        info!(
            "Starting metrics server - binding to {} (accessible at {})",
            addr, access_url
        );

        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

        // Spawn the server in a separate task
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
    }
}

async fn metrics_handler(registry: Arc<prometheus::Registry>) -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}
