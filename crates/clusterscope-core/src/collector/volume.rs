//! Shared filesystem source: the disk-usage listing over SSH.
//!
//! `df -hT` output is pre-filtered on the remote side to the filesystem
//! types of interest. Each surviving line ends in the usage percentage
//! (sixth column) and the mount point (last column); sizes carry a
//! single-letter magnitude suffix.

use tracing::{debug, warn};

use crate::collector::traits::{Connector, RemoteSession};
use crate::config::ClusterConfig;
use crate::model::VolumeRecord;

/// Disk-usage listing, filtered to the shared cluster filesystems.
pub const VOLUME_CMD: &str = "df -hT | grep -E 'ceph|nfs|/scratch'";

/// Polls the disk-usage listing and parses it.
///
/// Every failure path degrades to an empty list; the caller substitutes a
/// fallback row.
pub async fn poll_volumes<C: Connector>(
    connector: &C,
    config: &ClusterConfig,
) -> Vec<VolumeRecord> {
    let session = match connector.connect(&config.head_node, &config.private_key).await {
        Ok(session) => session,
        Err(e) => {
            warn!(host = %config.head_node.host, error = %e, "volume poll: connect failed");
            return Vec::new();
        }
    };

    let result = session.run(VOLUME_CMD).await;
    session.close().await;

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            warn!(error = %e, "volume poll: command failed");
            return Vec::new();
        }
    };
    if !output.success() {
        // grep exits 1 when nothing matches; the fallback row covers it.
        warn!(exit_code = output.exit_code, "volume poll: non-zero exit");
        return Vec::new();
    }
    if output.stdout.trim().is_empty() {
        warn!("volume poll: empty output");
        return Vec::new();
    }

    let records = parse_volume_output(&output.stdout);
    debug!(volumes = records.len(), "volume poll complete");
    records
}

/// Parses the filtered disk-usage listing into volume records.
///
/// Lines with fewer than seven columns are dropped.
pub fn parse_volume_output(raw: &str) -> Vec<VolumeRecord> {
    let mut records = Vec::new();

    for line in raw.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 7 {
            continue;
        }

        let mount_point = fields[fields.len() - 1].to_string();
        let total_tib = size_to_tib(fields[2]);
        let used_tib = size_to_tib(fields[3]);
        let usage_percent = fields[5].trim_end_matches('%').parse().unwrap_or(0.0);

        records.push(VolumeRecord {
            mount_point,
            used_tib,
            total_tib,
            usage_percent,
            fallback: false,
        });
    }

    records
}

/// Converts a `df -h` size such as `3.5T` or `512G` to tebibytes.
///
/// Suffix matching is case-insensitive; an unknown or missing suffix
/// yields zero rather than an error.
pub fn size_to_tib(field: &str) -> f64 {
    let trimmed = field.trim();
    let Some(last) = trimmed.chars().last() else {
        return 0.0;
    };
    let value: f64 = match trimmed[..trimmed.len() - last.len_utf8()].parse() {
        Ok(v) => v,
        Err(_) => return 0.0,
    };
    match last.to_ascii_uppercase() {
        'T' => value,
        'G' => value / 1024.0,
        'M' => value / (1024.0 * 1024.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockConnector, sample_config};

    #[test]
    fn parses_scratch_volume() {
        let raw = "storage01:/export   nfs4   100T   87T   13T  87% /scratch\n";
        let records = parse_volume_output(raw);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.mount_point, "/scratch");
        assert_eq!(record.usage_percent, 87.0);
        assert_eq!(record.total_tib, 100.0);
        assert_eq!(record.used_tib, 87.0);
        assert!(!record.fallback);
    }

    #[test]
    fn short_lines_are_dropped() {
        let raw = "broken line here\nceph-fuse  ceph  512T  307T  205T  60% /ceph\n";
        let records = parse_volume_output(raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mount_point, "/ceph");
    }

    #[test]
    fn terabyte_and_gibibyte_sizes_agree() {
        assert_eq!(size_to_tib("2T"), size_to_tib("2048G"));
        assert_eq!(size_to_tib("1T"), size_to_tib("1048576M"));
        assert_eq!(size_to_tib("1G"), size_to_tib("1024M"));
    }

    #[test]
    fn suffix_matching_is_case_insensitive() {
        assert_eq!(size_to_tib("2t"), 2.0);
        assert_eq!(size_to_tib("512g"), 0.5);
    }

    #[test]
    fn unknown_suffix_counts_as_zero() {
        assert_eq!(size_to_tib("3.5P"), 0.0);
        assert_eq!(size_to_tib("100"), 0.0);
        assert_eq!(size_to_tib(""), 0.0);
        assert_eq!(size_to_tib("T"), 0.0);
    }

    #[test]
    fn unparseable_percentage_counts_as_zero() {
        let raw = "dev  nfs  10T  1T  9T  n/a  /data\n";
        let records = parse_volume_output(raw);
        assert_eq!(records[0].usage_percent, 0.0);
    }

    #[tokio::test]
    async fn connect_failure_degrades_to_empty() {
        let connector = MockConnector::new().refuse_connections();
        let records = poll_volumes(&connector, &sample_config()).await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn empty_listing_degrades_to_empty() {
        let connector = MockConnector::new().respond_ok("df -hT", "");
        let records = poll_volumes(&connector, &sample_config()).await;
        assert!(records.is_empty());
        assert_eq!(connector.close_count(), 1);
    }

    #[tokio::test]
    async fn healthy_poll_parses_volumes() {
        let connector = MockConnector::typical_cluster();
        let records = poll_volumes(&connector, &sample_config()).await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].mount_point, "/scratch");
        assert_eq!(records[1].usage_percent, 87.0);
    }
}
