pub mod retry;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::models::common::Config;

/// Loads the service config from a YAML file next to the manifest, with a
/// `TRACE_BRIDGE__`-prefixed environment overlay on top.
pub fn load_config<P: AsRef<Path>>(file_name: P) -> Result<Config> {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let config_path = Path::new(manifest_dir).join(file_name);
    info!("Config path: {}", config_path.to_string_lossy());

    let settings = config::Config::builder()
        .add_source(config::File::from(config_path))
        .add_source(config::Environment::with_prefix("TRACE_BRIDGE").separator("__"))
        .build()
        .context("failed to read config file")?;

    settings
        .try_deserialize()
        .context("failed to parse config")
}
