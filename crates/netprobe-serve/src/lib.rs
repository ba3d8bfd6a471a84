//! netprobe-serve — HTTP backend for the chat relay and speed-test probes.

pub mod api;
pub mod metrics;
pub mod relay;
pub mod server;
pub mod stream;
