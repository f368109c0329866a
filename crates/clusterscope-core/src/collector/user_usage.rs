//! Per-user storage source: a generated shell scan over SSH.
//!
//! There is no standing accounting service for per-user disk usage, so the
//! poller ships a small shell script that walks the top-level directories
//! of a scanned filesystem and prints one JSON object per user. The script
//! is regenerated per directory; the directory path is the only
//! interpolated value and is shell-quoted.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::collector::traits::{Connector, RemoteSession};
use crate::config::ClusterConfig;
use crate::model::UserUsageRecord;

/// One entry of the remote scan output, before unit conversion.
#[derive(Debug, Deserialize)]
struct RawUsageEntry {
    username: String,
    used: String,
    files: i64,
}

/// Builds the remote scan script for one directory.
///
/// Each immediate subdirectory is treated as one user's space. `du` and
/// `find` errors are discarded on the remote side so that an unreadable
/// entry degrades to an empty size rather than breaking the JSON framing.
pub fn scan_script(dir: &str) -> String {
    let quoted = shell_words::quote(dir);
    format!(
        r#"echo "["; first=1; for d in {quoted}/*; do [ -d "$d" ] || continue; user=$(basename "$d"); used=$(du -sh "$d" 2>/dev/null | cut -f1); file_count=$(find "$d" -type f 2>/dev/null | wc -l); [ $first -eq 0 ] && echo ","; first=0; echo "{{ \"username\": \"$user\", \"used\": \"$used\", \"files\": $file_count }}"; done; echo "]""#
    )
}

/// Runs the scan script for each directory and collects the results.
///
/// Directories fail independently: a command error or malformed output is
/// logged and skipped while the remaining directories still contribute.
pub async fn poll_user_usage<C: Connector>(
    connector: &C,
    config: &ClusterConfig,
    dirs: &[String],
) -> Vec<UserUsageRecord> {
    if dirs.is_empty() {
        return Vec::new();
    }

    let session = match connector.connect(&config.head_node, &config.private_key).await {
        Ok(session) => session,
        Err(e) => {
            warn!(host = %config.head_node.host, error = %e, "user scan: connect failed");
            return Vec::new();
        }
    };

    let mut records = Vec::new();
    for dir in dirs {
        let output = match session.run(&scan_script(dir)).await {
            Ok(output) => output,
            Err(e) => {
                warn!(mount = %dir, error = %e, "user scan: command failed");
                continue;
            }
        };
        if !output.success() {
            warn!(mount = %dir, exit_code = output.exit_code, "user scan: non-zero exit");
            continue;
        }
        match parse_usage_output(&output.stdout, dir) {
            Ok(mut parsed) => {
                debug!(mount = %dir, users = parsed.len(), "user scan complete");
                records.append(&mut parsed);
            }
            Err(e) => {
                warn!(mount = %dir, error = %e, "user scan: malformed output");
            }
        }
    }
    session.close().await;

    records
}

/// Parses the scan output and tags every record with the scanned mount.
pub fn parse_usage_output(
    raw: &str,
    mount_point: &str,
) -> Result<Vec<UserUsageRecord>, serde_json::Error> {
    let entries: Vec<RawUsageEntry> = serde_json::from_str(raw)?;
    Ok(entries
        .into_iter()
        .map(|entry| UserUsageRecord {
            username: entry.username,
            used_storage_space_gb: size_to_gb(&entry.used),
            total_files: entry.files.max(0),
            mount_point: mount_point.to_string(),
        })
        .collect())
}

/// Converts a `du -sh` size such as `1.5T` or `512M` to gibibytes.
///
/// Suffix matching is case-insensitive; an unknown or missing suffix
/// yields zero rather than an error.
pub fn size_to_gb(field: &str) -> f64 {
    let trimmed = field.trim();
    let Some(last) = trimmed.chars().last() else {
        return 0.0;
    };
    let value: f64 = match trimmed[..trimmed.len() - last.len_utf8()].parse() {
        Ok(v) => v,
        Err(_) => return 0.0,
    };
    match last.to_ascii_uppercase() {
        'T' => value * 1024.0,
        'G' => value,
        'M' => value / 1024.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockConnector, sample_config};

    #[test]
    fn script_interpolates_quoted_directory() {
        let script = scan_script("/scratch");
        assert!(script.contains("for d in /scratch/*"));
        assert!(script.starts_with(r#"echo "[""#));
        assert!(script.ends_with(r#"echo "]""#));
    }

    #[test]
    fn script_quotes_awkward_paths() {
        let script = scan_script("/mnt/my data");
        assert!(script.contains("for d in '/mnt/my data'/*"));
    }

    #[test]
    fn sizes_convert_to_gibibytes() {
        assert_eq!(size_to_gb("1T"), 1024.0);
        assert_eq!(size_to_gb("2.5G"), 2.5);
        assert_eq!(size_to_gb("512M"), 0.5);
        assert_eq!(size_to_gb("1t"), 1024.0);
    }

    #[test]
    fn unknown_sizes_count_as_zero() {
        assert_eq!(size_to_gb("16K"), 0.0);
        assert_eq!(size_to_gb("0"), 0.0);
        assert_eq!(size_to_gb(""), 0.0);
    }

    #[test]
    fn parse_tags_records_with_mount() {
        let raw = r#"[ { "username": "alice", "used": "1.5T", "files": 10 } ]"#;
        let records = parse_usage_output(raw, "/scratch").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].username, "alice");
        assert_eq!(records[0].used_storage_space_gb, 1536.0);
        assert_eq!(records[0].total_files, 10);
        assert_eq!(records[0].mount_point, "/scratch");
    }

    #[test]
    fn negative_file_counts_clamp_to_zero() {
        let raw = r#"[ { "username": "bob", "used": "1G", "files": -3 } ]"#;
        let records = parse_usage_output(raw, "/scratch").unwrap();
        assert_eq!(records[0].total_files, 0);
    }

    #[test]
    fn malformed_output_is_an_error() {
        assert!(parse_usage_output("du: cannot access", "/scratch").is_err());
        assert!(parse_usage_output("", "/scratch").is_err());
    }

    #[tokio::test]
    async fn directories_fail_independently() {
        let connector = MockConnector::new()
            .respond_ok(
                "/scratch/*",
                r#"[ { "username": "alice", "used": "1G", "files": 5 } ]"#,
            )
            .respond_ok("/data/*", "du: cannot access '/data'");
        let dirs = ["/scratch".to_string(), "/data".to_string()];

        let records = poll_user_usage(&connector, &sample_config(), &dirs).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].username, "alice");
        assert_eq!(records[0].mount_point, "/scratch");
        // One session serves every directory and is closed once.
        assert_eq!(connector.close_count(), 1);
    }

    #[tokio::test]
    async fn connect_failure_degrades_to_empty() {
        let connector = MockConnector::new().refuse_connections();
        let dirs = ["/scratch".to_string()];
        let records = poll_user_usage(&connector, &sample_config(), &dirs).await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn no_directories_means_no_session() {
        let connector = MockConnector::new();
        let records = poll_user_usage(&connector, &sample_config(), &[]).await;
        assert!(records.is_empty());
        assert_eq!(connector.connect_count(), 0);
    }
}
