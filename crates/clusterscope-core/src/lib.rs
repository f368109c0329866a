//! clusterscope-core: shared library for the clusterscope service.
//!
//! Provides:
//! - `access`: request scope resolution and the restricted-volume gate
//! - `collector`: SSH polling of the cluster head node and snapshot assembly
//! - `config`: node inventory and credential loading
//! - `model`: wire-format records and the assembled snapshot

pub mod access;
pub mod collector;
pub mod config;
pub mod model;

/// Version string reported by the CLI and in startup logs.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
