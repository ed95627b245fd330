pub mod tracing_setup;

pub use tracing_setup::{TracingConfig, TracingGuard, log_api_request};
