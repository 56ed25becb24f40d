//! Tracing/logging setup shared by the API binary and tests.

pub mod tracing;

pub use tracing::{init, init_with_format, LogFormat};
