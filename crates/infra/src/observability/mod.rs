//! Observability bootstrap
//!
//! Structured logging through `tracing`. Nothing here is required for the
//! library to work; binaries call [`logging::init`] once at startup.

pub mod logging;

pub use logging::{error_label, init, log_operation};
