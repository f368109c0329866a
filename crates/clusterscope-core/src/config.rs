//! Node inventory and credential loading.
//!
//! The head-node inventory lives in a small YAML file; the SSH private key
//! arrives through the environment with literal `\n` escapes, the way
//! container secret injection usually delivers multi-line values. Both are
//! loaded fresh per request; there is no process-wide configuration state.

use std::path::Path;

use serde::Deserialize;

/// Environment variable holding the PEM private key, newline-escaped.
pub const SSH_KEY_ENV: &str = "SSH_PRIVATE_KEY";

/// Error type for configuration and credential loading.
///
/// Any of these is fatal for the whole request, unlike per-source poll
/// failures which degrade to fallback rows.
#[derive(Debug)]
pub enum SetupError {
    /// Environment variable not set or empty.
    EnvNotSet(String),
    /// Node inventory could not be read.
    NodesFileUnreadable(String),
    /// Node inventory did not parse as the expected YAML shape.
    InvalidNodesFile(String),
    /// Node inventory parsed but lists no nodes.
    NoNodes,
}

impl std::fmt::Display for SetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::EnvNotSet(var) => write!(f, "cluster config: {} not set", var),
            SetupError::NodesFileUnreadable(msg) => {
                write!(f, "cluster config: cannot read node inventory: {}", msg)
            }
            SetupError::InvalidNodesFile(msg) => {
                write!(f, "cluster config: invalid node inventory: {}", msg)
            }
            SetupError::NoNodes => write!(f, "cluster config: node inventory is empty"),
        }
    }
}

impl std::error::Error for SetupError {}

/// Identity of one reachable cluster node. Read-only input to a session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeTarget {
    pub name: String,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
}

fn default_port() -> u16 {
    22
}

#[derive(Debug, Deserialize)]
struct NodesFile {
    nodes: Vec<NodeTarget>,
}

/// Everything one poll cycle needs to reach the head node.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    pub head_node: NodeTarget,
    /// Unescaped PEM private key. Handed to the session layer, never
    /// logged.
    pub private_key: String,
}

impl ClusterConfig {
    /// Loads the head node from a YAML inventory file and the private key
    /// from the environment.
    ///
    /// The first inventory entry is the designated head node.
    pub fn load(nodes_path: &Path) -> Result<Self, SetupError> {
        let raw = std::fs::read_to_string(nodes_path).map_err(|e| {
            SetupError::NodesFileUnreadable(format!("{}: {}", nodes_path.display(), e))
        })?;
        let nodes = parse_nodes(&raw)?;
        let head_node = nodes.into_iter().next().ok_or(SetupError::NoNodes)?;

        let raw_key = std::env::var(SSH_KEY_ENV)
            .map_err(|_| SetupError::EnvNotSet(SSH_KEY_ENV.to_string()))?;
        if raw_key.trim().is_empty() {
            return Err(SetupError::EnvNotSet(SSH_KEY_ENV.to_string()));
        }

        Ok(Self {
            head_node,
            private_key: unescape_private_key(&raw_key),
        })
    }
}

/// Parses the inventory YAML into node targets.
pub fn parse_nodes(content: &str) -> Result<Vec<NodeTarget>, SetupError> {
    let parsed: NodesFile =
        serde_yaml::from_str(content).map_err(|e| SetupError::InvalidNodesFile(e.to_string()))?;
    Ok(parsed.nodes)
}

/// Restores real newlines in an environment-supplied PEM key.
pub fn unescape_private_key(raw: &str) -> String {
    raw.replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
nodes:
  - name: head
    host: head.cluster.example.edu
    port: 22
    user: svc-telemetry
  - name: backup
    host: backup.cluster.example.edu
    user: svc-telemetry
"#;

    #[test]
    fn parses_inventory() {
        let nodes = parse_nodes(SAMPLE).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].name, "head");
        assert_eq!(nodes[0].host, "head.cluster.example.edu");
        assert_eq!(nodes[0].port, 22);
        assert_eq!(nodes[0].user, "svc-telemetry");
    }

    #[test]
    fn port_defaults_to_22() {
        let nodes = parse_nodes(SAMPLE).unwrap();
        assert_eq!(nodes[1].port, 22);
    }

    #[test]
    fn rejects_malformed_inventory() {
        let err = parse_nodes("nodes: 12").unwrap_err();
        assert!(matches!(err, SetupError::InvalidNodesFile(_)));
    }

    #[test]
    fn empty_inventory_parses_to_no_nodes() {
        let nodes = parse_nodes("nodes: []").unwrap();
        assert!(nodes.is_empty());
    }

    #[test]
    fn unescapes_key_newlines() {
        let raw = "-----BEGIN KEY-----\\nAAAA\\n-----END KEY-----";
        let key = unescape_private_key(raw);
        assert_eq!(key.lines().count(), 3);
        assert!(!key.contains("\\n"));
    }

    #[test]
    fn unescape_leaves_plain_keys_alone() {
        let raw = "-----BEGIN KEY-----\nAAAA\n-----END KEY-----";
        assert_eq!(unescape_private_key(raw), raw);
    }

    #[test]
    fn load_reports_unreadable_inventory() {
        let err = ClusterConfig::load(Path::new("/nonexistent/nodes.yaml")).unwrap_err();
        assert!(matches!(err, SetupError::NodesFileUnreadable(_)));
    }
}
