//! HTTP API for query analysis
//!
//! Exposes the analyze operation and a health check over HTTP. The caller
//! is assumed to be authorized upstream; this layer only validates the
//! query string itself.

pub mod server;

pub use server::{ApiServer, ApiServerConfig};
