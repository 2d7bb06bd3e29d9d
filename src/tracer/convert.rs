use crate::models::geth::CallFrame;
use crate::models::parity::{ActionResult, TraceAction, TransactionTrace};

use super::classify::{CallKind, TraceVariant, classify};
use super::filter::filter_precompile_calls;

/// Fills in the fields the callTracer omits when a call moved no value, used
/// no gas, or returned nothing. Classification and rendering treat the
/// result identically to explicitly-reported zeros.
fn apply_defaults(frame: &mut CallFrame) {
    if frame.gas_used.is_empty() {
        frame.gas_used = "0x0".to_string();
    }
    if frame.output.is_empty() {
        frame.output = "0x".to_string();
    }
    if frame.value.is_empty() {
        frame.value = "0x0".to_string();
    }
}

/// Renders one (defaulted) call frame into its flat record.
///
/// `root_type` is the lower-cased type of the tree's root call, fixed when
/// the walk starts. Several variants render it as the record type in place
/// of the frame's own type; that is part of the wire format this mirrors,
/// not a bug to fix here.
fn build_trace(
    frame: &CallFrame,
    subtraces: usize,
    trace_address: Vec<usize>,
    root_type: &str,
) -> TransactionTrace {
    let variant = classify(&frame.error, CallKind::parse(&frame.typ));
    let call_type = frame.typ.to_lowercase();

    match variant {
        TraceVariant::Plain => TransactionTrace {
            action: TraceAction {
                call_type,
                from: frame.from.clone(),
                gas: frame.gas.clone(),
                input: frame.input.clone(),
                to: frame.to.clone(),
                value: frame.value.clone(),
                ..Default::default()
            },
            result: Some(ActionResult {
                gas_used: frame.gas_used.clone(),
                output: frame.output.clone(),
                ..Default::default()
            }),
            subtraces,
            trace_address,
            typ: root_type.to_string(),
            ..Default::default()
        },

        TraceVariant::Revert => TransactionTrace {
            action: TraceAction {
                call_type: call_type.clone(),
                from: frame.from.clone(),
                gas: frame.gas.clone(),
                input: frame.input.clone(),
                init: frame.input.clone(),
                to: frame.to.clone(),
                value: frame.value.clone(),
                ..Default::default()
            },
            error: "Reverted".to_string(),
            subtraces,
            trace_address,
            typ: call_type,
            ..Default::default()
        },

        TraceVariant::Create => TransactionTrace {
            action: TraceAction {
                from: frame.from.clone(),
                gas: frame.gas.clone(),
                init: frame.input.clone(),
                value: frame.value.clone(),
                ..Default::default()
            },
            result: Some(ActionResult {
                address: frame.to.clone(),
                code: frame.output.clone(),
                gas_used: frame.gas_used.clone(),
                ..Default::default()
            }),
            subtraces,
            trace_address,
            typ: "create".to_string(),
            ..Default::default()
        },

        TraceVariant::OutOfGas => TransactionTrace {
            action: TraceAction {
                call_type,
                from: frame.from.clone(),
                to: frame.to.clone(),
                gas: frame.gas.clone(),
                init: frame.input.clone(),
                input: frame.input.clone(),
                value: frame.value.clone(),
                ..Default::default()
            },
            error: "Out of gas".to_string(),
            subtraces,
            trace_address,
            typ: root_type.to_string(),
            ..Default::default()
        },

        TraceVariant::Suicide => TransactionTrace {
            action: TraceAction {
                address: frame.from.clone(),
                balance: frame.value.clone(),
                refund_address: frame.to.clone(),
                ..Default::default()
            },
            // Present but empty on the wire.
            result: Some(ActionResult::default()),
            subtraces,
            trace_address,
            typ: "suicide".to_string(),
            ..Default::default()
        },

        TraceVariant::StackUnderflow => TransactionTrace {
            action: TraceAction {
                call_type,
                from: frame.from.clone(),
                gas: frame.gas.clone(),
                input: frame.input.clone(),
                to: frame.to.clone(),
                value: frame.value.clone(),
                ..Default::default()
            },
            // Misspelling is part of the established wire format.
            error: "Stack undeflow".to_string(),
            subtraces,
            trace_address,
            typ: root_type.to_string(),
            ..Default::default()
        },

        TraceVariant::BadInstruction => TransactionTrace {
            action: TraceAction {
                call_type,
                from: frame.from.clone(),
                gas: frame.gas.clone(),
                input: frame.input.clone(),
                to: frame.to.clone(),
                value: frame.value.clone(),
                ..Default::default()
            },
            error: "Bad instruction".to_string(),
            subtraces,
            trace_address,
            typ: root_type.to_string(),
            ..Default::default()
        },

        TraceVariant::BadJumpDestination => TransactionTrace {
            action: TraceAction {
                call_type,
                from: frame.from.clone(),
                gas: frame.gas.clone(),
                input: frame.input.clone(),
                to: frame.to.clone(),
                value: frame.value.clone(),
                ..Default::default()
            },
            error: "Bad jump destination".to_string(),
            subtraces,
            trace_address,
            typ: root_type.to_string(),
            ..Default::default()
        },

        TraceVariant::Call => TransactionTrace {
            action: TraceAction {
                call_type,
                from: frame.from.clone(),
                gas: frame.gas.clone(),
                input: frame.input.clone(),
                to: frame.to.clone(),
                value: frame.value.clone(),
                ..Default::default()
            },
            result: Some(ActionResult {
                output: frame.output.clone(),
                gas_used: frame.gas_used.clone(),
                ..Default::default()
            }),
            subtraces,
            trace_address,
            typ: "call".to_string(),
            ..Default::default()
        },
    }
}

/// Recursively flattens a call frame and its surviving children into flat
/// records, depth-first, parent before children.
fn walk(mut frame: CallFrame, trace_address: Vec<usize>, root_type: &str) -> Vec<TransactionTrace> {
    apply_defaults(&mut frame);

    // Filtering happens before the delegatecall value rewrite below, so a
    // valueless delegatecall into a precompile stays dropped.
    let children = filter_precompile_calls(std::mem::take(&mut frame.calls));

    let mut traces = Vec::with_capacity(children.len() + 1);
    traces.push(build_trace(
        &frame,
        children.len(),
        trace_address.clone(),
        root_type,
    ));

    for (i, mut child) in children.into_iter().enumerate() {
        // A delegated call runs in the caller's context and moves no value
        // of its own; the record inherits the caller's value.
        if child.typ == "DELEGATECALL" {
            child.value = frame.value.clone();
        }
        let mut child_address = trace_address.clone();
        child_address.push(i);
        traces.extend(walk(child, child_address, root_type));
    }

    traces
}

/// Converts one fetched call tree into its flat, ordered record list.
///
/// The record type stamped on several variants is fixed from the root
/// frame's lower-cased call type for the whole tree.
pub fn flatten_call_tree(frame: CallFrame) -> Vec<TransactionTrace> {
    let root_type = frame.typ.to_lowercase();
    walk(frame, Vec::new(), &root_type)
}
