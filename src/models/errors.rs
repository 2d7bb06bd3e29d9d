use thiserror::Error;

/// Errors surfaced to JSON-RPC callers.
///
/// Execution-level errors inside a fetched call tree never appear here;
/// they are classified into the records themselves. Only failures to obtain
/// or render a trace at all reach the caller as errors.
#[derive(Error, Debug)]
pub enum ServeError {
    #[error("{0:#}")]
    Upstream(#[from] anyhow::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServeError {
    /// JSON-RPC error code for this failure.
    pub fn code(&self) -> i32 {
        match self {
            ServeError::Upstream(_) => -32000,
            ServeError::Internal(_) => -32603,
        }
    }
}
