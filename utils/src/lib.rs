//! Shared utilities for the SEEDS API binaries.

pub mod logging;

pub use logging::{init_logging, LogFormat, UnknownLogFormat};
