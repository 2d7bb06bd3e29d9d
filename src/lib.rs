pub mod metrics;
pub mod models;
pub mod server;
pub mod tracer;
pub mod utils;
