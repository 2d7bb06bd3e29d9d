use serde::{Deserialize, Serialize};

/// A single call frame as reported by geth's built-in `callTracer`.
///
/// Scalar fields are carried as the raw hex strings geth returns. Fields the
/// tracer leaves out deserialize to the empty string, and the conversion
/// layer distinguishes "not reported" from an explicit `"0x0"`, so nothing
/// is parsed or normalized here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CallFrame {
    #[serde(rename = "type")]
    pub typ: String,
    pub from: String,
    pub to: String,
    pub value: String,
    pub gas: String,
    pub gas_used: String,
    pub input: String,
    pub output: String,
    pub error: String,
    pub calls: Vec<CallFrame>,
}

/// One entry of a `debug_traceBlockByNumber` response: the call tree for a
/// single transaction, or an error string when tracing that transaction
/// failed on the node. An errored entry carries an empty `result` frame.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockTraceEntry {
    pub tx_hash: String,
    pub result: CallFrame,
    pub error: String,
}
