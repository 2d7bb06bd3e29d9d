pub mod classify;
pub mod convert;
pub mod filter;

use std::time::Instant;

use alloy_eips::{BlockId, BlockNumberOrTag};
use alloy_network::AnyNetwork;
use alloy_primitives::TxHash;
use alloy_provider::Provider;
use alloy_rpc_types_eth::TransactionRequest;
use alloy_rpc_types_trace::geth::{
    GethDebugBuiltInTracerType, GethDebugTracerConfig, GethDebugTracerType,
    GethDebugTracingOptions,
};
use anyhow::{Result, anyhow};
use opentelemetry::KeyValue;
use tracing::{debug, warn};

use crate::metrics::Metrics;
use crate::models::geth::{BlockTraceEntry, CallFrame};
use crate::models::parity::TransactionTrace;
use crate::utils::retry::{RetryConfig, retry};

pub use convert::flatten_call_tree;

/// Tracing options used for every upstream request: the built-in callTracer
/// with nested calls enabled.
pub fn call_tracer_options(timeout: &str) -> GethDebugTracingOptions {
    GethDebugTracingOptions {
        tracer: Some(GethDebugTracerType::BuiltInTracer(
            GethDebugBuiltInTracerType::CallTracer,
        )),
        tracer_config: GethDebugTracerConfig(serde_json::json!({"onlyTopCall": false})),
        timeout: Some(timeout.to_string()),
        ..Default::default()
    }
}

fn observe_upstream(metrics: Option<&Metrics>, method: &'static str, start: Instant, failed: bool) {
    if let Some(metrics) = metrics {
        metrics.rpc_latency.record(
            start.elapsed().as_secs_f64(),
            &[KeyValue::new("method", method)],
        );
        if failed {
            metrics
                .rpc_errors
                .add(1, &[KeyValue::new("method", method)]);
        }
    }
}

pub async fn debug_trace_call<P>(
    provider: &P,
    tx: &TransactionRequest,
    block: BlockId,
    trace_options: &GethDebugTracingOptions,
    metrics: Option<&Metrics>,
) -> Result<CallFrame>
where
    P: Provider<AnyNetwork>,
{
    let retry_config = RetryConfig::default();
    retry(
        || async {
            let start = Instant::now();

            if let Some(metrics) = metrics {
                metrics
                    .rpc_requests
                    .add(1, &[KeyValue::new("method", "debug_traceCall")]);
            }

            let result = provider
                .client()
                .request::<_, CallFrame>(
                    "debug_traceCall",
                    (tx.clone(), block, trace_options.clone()),
                )
                .await;

            observe_upstream(metrics, "debug_traceCall", start, result.is_err());

            result.map_err(|e| {
                warn!("Failed to trace call. Error details:\n{:#?}", e);
                anyhow!("RPC error: {}", e)
            })
        },
        &retry_config,
        "debug_traceCall",
    )
    .await
}

pub async fn debug_trace_transaction<P>(
    provider: &P,
    tx_hash: TxHash,
    trace_options: &GethDebugTracingOptions,
    metrics: Option<&Metrics>,
) -> Result<CallFrame>
where
    P: Provider<AnyNetwork>,
{
    let retry_config = RetryConfig::default();
    retry(
        || async {
            let start = Instant::now();

            if let Some(metrics) = metrics {
                metrics
                    .rpc_requests
                    .add(1, &[KeyValue::new("method", "debug_traceTransaction")]);
            }

            let result = provider
                .client()
                .request::<_, CallFrame>(
                    "debug_traceTransaction",
                    (tx_hash, trace_options.clone()),
                )
                .await;

            observe_upstream(metrics, "debug_traceTransaction", start, result.is_err());

            result.map_err(|e| {
                warn!(
                    "Failed to trace transaction {}. Error details:\n{:#?}",
                    tx_hash, e
                );
                anyhow!("RPC error: {}", e)
            })
        },
        &retry_config,
        "debug_traceTransaction",
    )
    .await
}

pub async fn debug_trace_block_by_number<P>(
    provider: &P,
    block_number: BlockNumberOrTag,
    trace_options: &GethDebugTracingOptions,
    metrics: Option<&Metrics>,
) -> Result<Vec<BlockTraceEntry>>
where
    P: Provider<AnyNetwork>,
{
    let retry_config = RetryConfig::default();
    retry(
        || async {
            let start = Instant::now();

            if let Some(metrics) = metrics {
                metrics
                    .rpc_requests
                    .add(1, &[KeyValue::new("method", "debug_traceBlockByNumber")]);
            }

            let result = provider
                .client()
                .request::<_, Vec<BlockTraceEntry>>(
                    "debug_traceBlockByNumber",
                    (block_number, trace_options.clone()),
                )
                .await;

            observe_upstream(metrics, "debug_traceBlockByNumber", start, result.is_err());

            result.map_err(|e| {
                warn!(
                    "Failed to trace block {}. Error details:\n{:#?}",
                    block_number, e
                );
                anyhow!("RPC error: {}", e)
            })
        },
        &retry_config,
        "debug_traceBlockByNumber",
    )
    .await
}

fn record_emitted(metrics: Option<&Metrics>, traces: &[TransactionTrace]) {
    if let Some(metrics) = metrics {
        metrics.trace_records.add(traces.len() as u64, &[]);
    }
}

/// Raw output of the root call, defaulted the way the single-tree request
/// shapes report it when the tracer returned nothing.
fn root_output(frame: &CallFrame) -> String {
    if frame.output.is_empty() {
        "0x".to_string()
    } else {
        frame.output.clone()
    }
}

/// Traces a simulated call against the given block and converts the
/// resulting tree. Returns the flat records plus the root call's output.
pub async fn trace_call<P>(
    provider: &P,
    tx: &TransactionRequest,
    block: BlockId,
    trace_options: &GethDebugTracingOptions,
    metrics: Option<&Metrics>,
) -> Result<(Vec<TransactionTrace>, String)>
where
    P: Provider<AnyNetwork>,
{
    let frame = debug_trace_call(provider, tx, block, trace_options, metrics).await?;
    let output = root_output(&frame);
    let traces = convert::flatten_call_tree(frame);
    debug!("Converted call trace into {} records", traces.len());
    record_emitted(metrics, &traces);
    Ok((traces, output))
}

/// Traces one mined transaction and converts the resulting tree.
pub async fn trace_transaction<P>(
    provider: &P,
    tx_hash: TxHash,
    trace_options: &GethDebugTracingOptions,
    metrics: Option<&Metrics>,
) -> Result<(Vec<TransactionTrace>, String)>
where
    P: Provider<AnyNetwork>,
{
    let frame = debug_trace_transaction(provider, tx_hash, trace_options, metrics).await?;
    let output = root_output(&frame);
    let traces = convert::flatten_call_tree(frame);
    debug!(
        "Converted trace for transaction {} into {} records",
        tx_hash,
        traces.len()
    );
    record_emitted(metrics, &traces);
    Ok((traces, output))
}

/// Traces every transaction in a block and converts each tree
/// independently. Returns one record list and one raw output string per
/// transaction, in block order.
pub async fn trace_block<P>(
    provider: &P,
    block_number: BlockNumberOrTag,
    trace_options: &GethDebugTracingOptions,
    metrics: Option<&Metrics>,
) -> Result<(Vec<Vec<TransactionTrace>>, Vec<String>)>
where
    P: Provider<AnyNetwork>,
{
    let entries =
        debug_trace_block_by_number(provider, block_number, trace_options, metrics).await?;

    let mut block_traces = Vec::with_capacity(entries.len());
    let mut outputs = Vec::with_capacity(entries.len());
    for entry in entries {
        if !entry.error.is_empty() {
            // The entry still carries a (possibly empty) frame; convert what
            // is there instead of failing the whole block.
            warn!(
                "Failed to trace transaction {}: {}",
                entry.tx_hash, entry.error
            );
        }
        outputs.push(entry.result.output.clone());
        let traces = convert::flatten_call_tree(entry.result);
        record_emitted(metrics, &traces);
        block_traces.push(traces);
    }
    debug!(
        "Converted {} transaction traces for block {}",
        block_traces.len(),
        block_number
    );
    Ok((block_traces, outputs))
}
