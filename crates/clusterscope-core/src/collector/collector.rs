//! Top-level collector: one snapshot per call.

use chrono::{SecondsFormat, Utc};
use tracing::{info, warn};

use crate::access::{AccessError, Scope};
use crate::collector::traits::Connector;
use crate::collector::{queue, user_usage, volume};
use crate::config::ClusterConfig;
use crate::model::{QueueRecord, Snapshot, VolumeRecord};

/// Gathers one cluster snapshot over a [`Connector`].
///
/// The three sources run concurrently and fail independently: a source
/// that returns nothing is replaced by a tagged fallback row so the
/// snapshot shape stays stable for consumers.
pub struct Collector<C: Connector> {
    connector: C,
    config: ClusterConfig,
}

impl<C: Connector> Collector<C> {
    pub fn new(connector: C, config: ClusterConfig) -> Self {
        Self { connector, config }
    }

    /// Polls all sources and assembles a timestamped snapshot.
    ///
    /// The scope is resolved before any connection is opened; a restricted
    /// scope is rejected without touching the cluster. The timestamp is
    /// taken after the last source finishes.
    pub async fn collect_snapshot(&self, scope: Scope) -> Result<Snapshot, AccessError> {
        let scan_dir = scope.resolve()?;
        let dirs = [scan_dir.to_string()];

        let (mut slurm_queue_info, mut storage, user_storage) = tokio::join!(
            queue::poll_queue(&self.connector, &self.config),
            volume::poll_volumes(&self.connector, &self.config),
            user_usage::poll_user_usage(&self.connector, &self.config, &dirs),
        );

        if slurm_queue_info.is_empty() {
            warn!("queue source unavailable, substituting fallback row");
            slurm_queue_info.push(QueueRecord::fallback_row());
        }
        if storage.is_empty() {
            warn!("volume source unavailable, substituting fallback row");
            storage.push(VolumeRecord::fallback_row());
        }

        let last_updated_timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        info!(
            partitions = slurm_queue_info.len(),
            volumes = storage.len(),
            users = user_storage.len(),
            "snapshot assembled"
        );

        Ok(Snapshot {
            last_updated_timestamp,
            storage,
            slurm_queue_info,
            user_storage,
        })
    }
}
