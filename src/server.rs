use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use alloy_eips::{BlockId, BlockNumberOrTag};
use alloy_network::AnyNetwork;
use alloy_primitives::TxHash;
use alloy_provider::DynProvider;
use alloy_rpc_types_eth::TransactionRequest;
use alloy_rpc_types_trace::geth::GethDebugTracingOptions;
use anyhow::Result;
use jsonrpsee::server::{RpcModule, Server, ServerHandle};
use jsonrpsee::types::ErrorObjectOwned;
use opentelemetry::KeyValue;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::info;

use crate::metrics::Metrics;
use crate::models::errors::ServeError;
use crate::tracer;

/// RPC method name for trace_call - traces a simulated call.
const TRACE_CALL: &str = "trace_call";
/// RPC method name for trace_transaction - traces one mined transaction.
const TRACE_TRANSACTION: &str = "trace_transaction";
/// RPC method name for trace_block - traces every transaction in a block.
const TRACE_BLOCK: &str = "trace_block";
/// RPC method name for admin_shutdown - asks the process to stop.
const ADMIN_SHUTDOWN: &str = "admin_shutdown";

/// Shared context for all RPC handlers.
pub struct RpcContext {
    /// Upstream provider the raw call trees are fetched from.
    pub provider: DynProvider<AnyNetwork>,
    /// callTracer options applied to every upstream request.
    pub trace_options: GethDebugTracingOptions,
    pub metrics: Option<Arc<Metrics>>,
    /// Process-wide shutdown signal; `admin_shutdown` fires it.
    pub shutdown: broadcast::Sender<()>,
}

fn rpc_err(err: ServeError) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(err.code(), err.to_string(), None::<()>)
}

fn to_response<T: serde::Serialize>(value: T) -> Result<Value, ErrorObjectOwned> {
    serde_json::to_value(value)
        .map_err(|e| rpc_err(ServeError::Internal(format!("serialization failed: {e}"))))
}

fn observe_served(ctx: &RpcContext, method: &'static str, start: Instant) {
    if let Some(metrics) = &ctx.metrics {
        metrics
            .requests_served
            .add(1, &[KeyValue::new("method", method)]);
        metrics.request_duration.record(
            start.elapsed().as_secs_f64(),
            &[KeyValue::new("method", method)],
        );
    }
}

/// Registers the trace_* methods plus the administrative shutdown method.
pub fn build_module(ctx: RpcContext) -> Result<RpcModule<RpcContext>> {
    let mut module = RpcModule::new(ctx);

    // trace_call - Converts the call tree of a simulated call.
    // Params: [txObject, blockReference]
    // Returns: Array of flat trace records
    module.register_async_method(TRACE_CALL, |params, ctx, _| async move {
        let start = Instant::now();
        let mut seq = params.sequence();
        let tx: TransactionRequest = seq.next()?;
        let block: BlockId = seq.next()?;

        let (traces, _output) = tracer::trace_call(
            &ctx.provider,
            &tx,
            block,
            &ctx.trace_options,
            ctx.metrics.as_deref(),
        )
        .await
        .map_err(|e| rpc_err(ServeError::Upstream(e)))?;

        observe_served(&ctx, TRACE_CALL, start);

        to_response(traces)
    })?;

    // trace_transaction - Converts the call tree of one mined transaction.
    // Params: [txHash]
    // Returns: Array of flat trace records
    module.register_async_method(TRACE_TRANSACTION, |params, ctx, _| async move {
        let start = Instant::now();
        let mut seq = params.sequence();
        let tx_hash: TxHash = seq.next()?;

        let (traces, _output) = tracer::trace_transaction(
            &ctx.provider,
            tx_hash,
            &ctx.trace_options,
            ctx.metrics.as_deref(),
        )
        .await
        .map_err(|e| rpc_err(ServeError::Upstream(e)))?;

        observe_served(&ctx, TRACE_TRANSACTION, start);

        to_response(traces)
    })?;

    // trace_block - Converts the call tree of every transaction in a block.
    // Params: [blockNumberOrTag]
    // Returns: Array of per-transaction arrays of flat trace records
    module.register_async_method(TRACE_BLOCK, |params, ctx, _| async move {
        let start = Instant::now();
        let mut seq = params.sequence();
        let block_number: BlockNumberOrTag = seq.next()?;

        let (traces, _outputs) = tracer::trace_block(
            &ctx.provider,
            block_number,
            &ctx.trace_options,
            ctx.metrics.as_deref(),
        )
        .await
        .map_err(|e| rpc_err(ServeError::Upstream(e)))?;

        observe_served(&ctx, TRACE_BLOCK, start);

        to_response(traces)
    })?;

    // admin_shutdown - Signals the process to stop and acknowledges.
    // Params: none
    // Returns: true
    module.register_async_method(ADMIN_SHUTDOWN, |_params, ctx, _| async move {
        info!("Shutdown requested over RPC");
        // A send error only means shutdown is already underway.
        let _ = ctx.shutdown.send(());
        Ok::<_, ErrorObjectOwned>(Value::Bool(true))
    })?;

    Ok(module)
}

/// Binds the RPC server and starts serving the module.
pub async fn start_server(
    addr: &str,
    module: RpcModule<RpcContext>,
) -> Result<(ServerHandle, SocketAddr)> {
    let server = Server::builder().build(addr).await?;
    let local_addr = server.local_addr()?;
    let handle = server.start(module);
    Ok((handle, local_addr))
}
