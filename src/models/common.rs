use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TracerConfig {
    /// Timeout handed to the upstream callTracer, e.g. "10s".
    #[serde(default = "default_trace_timeout")]
    pub timeout: String,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            timeout: default_trace_timeout(),
        }
    }
}

fn default_trace_timeout() -> String {
    "10s".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub rpc_url: String,
    pub server: ServerConfig,
    #[serde(default)]
    pub tracer: TracerConfig,
    pub metrics: MetricsConfig,
}
