//! Shared application state for request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;

use clusterscope_core::collector::SshConnector;

/// Server-wide configuration shared across requests.
///
/// Only the inventory path is held here; the inventory itself and the
/// credential are re-read per request, so an edit takes effect without a
/// restart and a broken setup surfaces on the request that hits it.
pub(crate) struct AppConfig {
    pub(crate) nodes_file: PathBuf,
    pub(crate) connector: SshConnector,
}

pub(crate) type AppState = State<Arc<AppConfig>>;
