//! This crate contains the code required to observe what the binaries in this
//! workspace are doing. That is the initialization logic for logging and the
//! panic hook that routes panics through the logger.
pub mod config;
pub mod tracing;

pub use config::Config;
