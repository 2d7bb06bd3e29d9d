use serde::{Deserialize, Serialize};

/// The `action` object of a flat trace record.
///
/// Which fields are populated depends on the record variant; empty fields
/// stay off the wire entirely rather than serializing as `""`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TraceAction {
    #[serde(skip_serializing_if = "str::is_empty")]
    pub call_type: String,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub from: String,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub address: String,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub balance: String,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub gas: String,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub init: String,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub input: String,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub to: String,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub refund_address: String,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub value: String,
}

/// The `result` object attached to successful record variants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionResult {
    #[serde(skip_serializing_if = "str::is_empty")]
    pub address: String,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub code: String,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub gas_used: String,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub output: String,
}

/// One flat trace record in the Parity/OpenEthereum wire schema.
///
/// `result` is `None` for failed-call variants (an `error` string takes its
/// place) and `Some` with all fields empty for self-destructs, which emit a
/// present-but-empty `"result": {}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransactionTrace {
    pub action: TraceAction,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ActionResult>,
    pub subtraces: usize,
    pub trace_address: Vec<usize>,
    #[serde(rename = "type")]
    pub typ: String,
}
