//! Shared foundation for the netprobe backend.
//!
//! Provides the configuration model and the centralized error type used by
//! the serving crate.

pub mod config;
pub mod error;

pub use config::AppConfig;
pub use error::{NetProbeError, Result};
