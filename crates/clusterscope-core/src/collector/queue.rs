//! Scheduler queue source: the partition listing over SSH.
//!
//! `sinfo` prints one line per partition with a fixed column order:
//! partition name, total CPUs, allocated CPUs, idle CPUs, total memory in
//! MB, and an optional generic-resource column that may carry a GPU count
//! as `gpu:<n>`. The listing reports no job counts and no free-GPU figure,
//! so those fields stay zero and `None` respectively.

use tracing::{debug, warn};

use crate::collector::traits::{Connector, RemoteSession};
use crate::config::ClusterConfig;
use crate::model::QueueRecord;

/// Partition listing. `--noheader` keeps the output one row per partition
/// with the column contract the parser relies on.
pub const QUEUE_CMD: &str = r#"sinfo -o "%.12P %.5C %.5a %.5I %.10m %.6G" --noheader"#;

/// Polls the partition listing and parses it.
///
/// Every failure path degrades to an empty list; the caller substitutes a
/// fallback row.
pub async fn poll_queue<C: Connector>(connector: &C, config: &ClusterConfig) -> Vec<QueueRecord> {
    let session = match connector.connect(&config.head_node, &config.private_key).await {
        Ok(session) => session,
        Err(e) => {
            warn!(host = %config.head_node.host, error = %e, "queue poll: connect failed");
            return Vec::new();
        }
    };

    let result = session.run(QUEUE_CMD).await;
    session.close().await;

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            warn!(error = %e, "queue poll: command failed");
            return Vec::new();
        }
    };
    if !output.success() {
        warn!(exit_code = output.exit_code, stderr = %output.stderr.trim(), "queue poll: non-zero exit");
        return Vec::new();
    }
    if output.stdout.trim().is_empty() {
        warn!("queue poll: empty output");
        return Vec::new();
    }

    let records = parse_queue_output(&output.stdout);
    debug!(partitions = records.len(), "queue poll complete");
    records
}

/// Parses the partition listing into queue records.
///
/// Lines with fewer than five columns are dropped; a CPU column that fails
/// to parse degrades to `None` instead of dropping the row, and an
/// unparseable memory column counts as zero. Memory figures are derived
/// from the CPU allocation ratio since the listing reports only totals.
pub fn parse_queue_output(raw: &str) -> Vec<QueueRecord> {
    let mut records = Vec::new();

    for line in raw.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            continue;
        }

        let partition = fields[0].to_string();
        let total_cpus = leading_int(fields[1]);
        let alloc_cpus = leading_int(fields[2]);
        let idle_cpus = leading_int(fields[3]);
        let total_mem_mb = leading_int(fields[4]).unwrap_or(0) as f64;

        let alloc_ratio = match (alloc_cpus, total_cpus) {
            (Some(alloc), Some(total)) if total > 0 => alloc as f64 / total as f64,
            _ => 0.0,
        };
        let total_mem_gb = total_mem_mb / 1024.0;
        let mem_allocated_gb = (total_mem_gb * alloc_ratio).round() as i64;
        let mem_free_gb = (total_mem_gb - mem_allocated_gb as f64).round() as i64;

        let gpu_allocated = fields.get(5).and_then(|gres| {
            if gres.contains("gpu:") {
                gres.rsplit(':').next().and_then(leading_int)
            } else {
                None
            }
        });

        records.push(QueueRecord {
            partition,
            cpu_free: idle_cpus,
            cpu_allocated: alloc_cpus,
            mem_free_gb,
            mem_allocated_gb,
            gpu_free: None,
            gpu_allocated,
            interactive_jobs_running: 0,
            interactive_jobs_pending: 0,
            batch_jobs_running: 0,
            batch_jobs_pending: 0,
            fallback: false,
        });
    }

    records
}

/// Integer prefix of a column, tolerating trailing markers such as the
/// `+` the scheduler appends to expandable values.
fn leading_int(field: &str) -> Option<i64> {
    let end = field
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(field.len());
    if end == 0 {
        return None;
    }
    field[..end].parse().ok()
}
