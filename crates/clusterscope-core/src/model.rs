//! Wire-format records assembled into a cluster snapshot.
//!
//! Field names match the JSON the dashboard consumes, so the structs
//! serialize without rename attributes. All records are built fresh per
//! request; nothing here is cached or persisted.

use serde::{Deserialize, Serialize};

/// One scheduler partition's resource state.
///
/// CPU and GPU counts are `Option` because the scheduler listing can omit
/// or mangle individual columns; `None` means "unknown", not zero. The
/// partition listing carries no job counts, so the job fields are always
/// zero in this version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueRecord {
    pub partition: String,
    pub cpu_free: Option<i64>,
    pub cpu_allocated: Option<i64>,
    pub mem_free_gb: i64,
    pub mem_allocated_gb: i64,
    /// Always `None`: the partition listing cannot express free GPUs.
    pub gpu_free: Option<i64>,
    pub gpu_allocated: Option<i64>,
    pub interactive_jobs_running: i64,
    pub interactive_jobs_pending: i64,
    pub batch_jobs_running: i64,
    pub batch_jobs_pending: i64,
    /// True only for the synthetic row substituted when the source
    /// produced no usable data.
    pub fallback: bool,
}

impl QueueRecord {
    /// Synthetic row substituted when the queue source yields nothing.
    ///
    /// Zeroed metrics with the fallback flag set; the display name keeps
    /// the `(Fallback)` marker the dashboard already renders.
    pub fn fallback_row() -> Self {
        Self {
            partition: "cpu (Fallback)".to_string(),
            cpu_free: Some(0),
            cpu_allocated: Some(0),
            mem_free_gb: 0,
            mem_allocated_gb: 0,
            gpu_free: None,
            gpu_allocated: None,
            interactive_jobs_running: 0,
            interactive_jobs_pending: 0,
            batch_jobs_running: 0,
            batch_jobs_pending: 0,
            fallback: true,
        }
    }
}

/// One mounted shared filesystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeRecord {
    pub mount_point: String,
    pub used_tib: f64,
    pub total_tib: f64,
    /// 0–100, as reported by the disk-usage listing.
    pub usage_percent: f64,
    /// True only for the synthetic row substituted when the source
    /// produced no usable data.
    pub fallback: bool,
}

impl VolumeRecord {
    /// Synthetic row substituted when the volume source yields nothing.
    pub fn fallback_row() -> Self {
        Self {
            mount_point: "CEPH:/home (Fallback)".to_string(),
            used_tib: 0.0,
            total_tib: 0.0,
            usage_percent: 0.0,
            fallback: true,
        }
    }
}

/// One user's consumption within one scanned directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUsageRecord {
    pub username: String,
    pub used_storage_space_gb: f64,
    pub total_files: i64,
    /// Directory the scan ran against; consumers filter on this.
    pub mount_point: String,
}

/// The assembled result of one poll cycle.
///
/// After fallback substitution the queue and volume lists are never
/// empty; an empty `user_storage` list is a legitimate "no files" result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// RFC 3339 timestamp captured after all three sources finished.
    pub last_updated_timestamp: String,
    pub storage: Vec<VolumeRecord>,
    pub slurm_queue_info: Vec<QueueRecord>,
    pub user_storage: Vec<UserUsageRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_fallback_row_is_tagged() {
        let row = QueueRecord::fallback_row();
        assert!(row.fallback);
        assert_eq!(row.partition, "cpu (Fallback)");
        assert_eq!(row.cpu_free, Some(0));
        assert_eq!(row.gpu_free, None);
        assert_eq!(row.gpu_allocated, None);
    }

    #[test]
    fn volume_fallback_row_is_tagged() {
        let row = VolumeRecord::fallback_row();
        assert!(row.fallback);
        assert_eq!(row.used_tib, 0.0);
        assert_eq!(row.total_tib, 0.0);
    }

    #[test]
    fn snapshot_serializes_wire_field_names() {
        let snapshot = Snapshot {
            last_updated_timestamp: "2026-01-01T00:00:00.000Z".to_string(),
            storage: vec![VolumeRecord::fallback_row()],
            slurm_queue_info: vec![QueueRecord::fallback_row()],
            user_storage: Vec::new(),
        };

        let value = serde_json::to_value(&snapshot).unwrap();
        assert!(value.get("last_updated_timestamp").is_some());
        assert!(value.get("storage").is_some());
        assert!(value.get("slurm_queue_info").is_some());
        assert!(value.get("user_storage").is_some());

        // Unknown GPU counts serialize as JSON null, not zero.
        assert!(value["slurm_queue_info"][0]["gpu_free"].is_null());
        assert!(value["slurm_queue_info"][0]["fallback"].as_bool().unwrap());
    }
}
