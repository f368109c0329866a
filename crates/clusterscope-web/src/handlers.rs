//! HTTP request handlers: health and the cluster-state endpoint.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, warn};

use clusterscope_core::access::Scope;
use clusterscope_core::collector::Collector;
use clusterscope_core::config::ClusterConfig;
use clusterscope_core::model::Snapshot;

use crate::state::AppState;

// ============================================================
// Health
// ============================================================

pub(crate) async fn handle_health() -> &'static str {
    "ok"
}

// ============================================================
// Cluster state
// ============================================================

#[derive(Deserialize)]
pub(crate) struct ClusterStateQuery {
    /// Per-user storage scope to scan: "home", "windows", or unset for scratch.
    volume: Option<String>,
}

/// Serves one freshly collected cluster snapshot.
///
/// A restricted scope is a 403 before any remote work. A setup failure
/// (inventory or credential) is a 500. Source-level poll failures never
/// reach here; they surface as fallback rows inside a 200 body.
pub(crate) async fn handle_cluster_state(
    State(app): AppState,
    Query(query): Query<ClusterStateQuery>,
) -> Result<Json<Snapshot>, (StatusCode, Json<Value>)> {
    let scope = Scope::from_volume_param(query.volume.as_deref());

    let config = match ClusterConfig::load(&app.nodes_file) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "cluster state: setup failed");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to load cluster configuration",
                    "details": e.to_string(),
                })),
            ));
        }
    };

    let collector = Collector::new(app.connector, config);
    match collector.collect_snapshot(scope).await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            warn!(error = %e, "cluster state: scope rejected");
            Err((
                StatusCode::FORBIDDEN,
                Json(json!({ "error": e.to_string() })),
            ))
        }
    }
}
