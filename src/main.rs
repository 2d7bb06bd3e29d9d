use std::sync::Arc;

use alloy_network::AnyNetwork;
use alloy_provider::{Provider, ProviderBuilder};
use anyhow::{Result, anyhow};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};
use url::Url;

use trace_bridge::metrics::Metrics;
use trace_bridge::server::{self, RpcContext};
use trace_bridge::tracer;
use trace_bridge::utils::load_config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    // Load config
    let config = match load_config("config.yml") {
        Ok(config) => {
            info!("Config loaded successfully");
            config
        }
        Err(e) => {
            error!("Failed to load config: {}", e);
            return Err(anyhow!(e));
        }
    };

    // Initialize optional metrics
    let metrics = if config.metrics.enabled {
        Some(Arc::new(Metrics::new()?))
    } else {
        info!("Metrics are disabled");
        None
    };

    // Start metrics server if metrics are enabled
    if let Some(metrics_instance) = &metrics {
        metrics_instance
            .start_metrics_server(&config.metrics.address, config.metrics.port)
            .await;
    }

    // Create upstream RPC provider
    let rpc_url: Url = config.rpc_url.parse()?;
    info!("Upstream RPC URL: {}", rpc_url);
    let provider = ProviderBuilder::new()
        .network::<AnyNetwork>()
        .connect_http(rpc_url)
        .erased();

    // Shutdown signal shared with the admin_shutdown RPC method
    let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

    let ctx = RpcContext {
        provider,
        trace_options: tracer::call_tracer_options(&config.tracer.timeout),
        metrics,
        shutdown: shutdown_tx,
    };
    let module = server::build_module(ctx)?;

    let listen_addr = format!("{}:{}", config.server.address, config.server.port);
    let (handle, local_addr) = server::start_server(&listen_addr, module).await?;
    info!("trace-bridge listening on {}", local_addr);

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C signal, shutting down...");
        }
        _ = shutdown_rx.recv() => {
            info!("Received shutdown request, shutting down...");
        }
    }

    // Stop accepting connections and wait for in-flight requests to drain.
    let _ = handle.stop();
    handle.stopped().await;
    info!("Server stopped");

    Ok(())
}
