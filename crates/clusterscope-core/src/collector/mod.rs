//! Cluster telemetry collector.
//!
//! This module gathers scheduler, filesystem, and per-user storage state
//! from a cluster head node over SSH, with support for mocking so the
//! pollers can be tested without a cluster.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                         Collector                          │
//! │  ┌────────────┐  ┌──────────────┐  ┌───────────────────┐   │
//! │  │   queue    │  │    volume    │  │    user_usage     │   │
//! │  │  (sinfo)   │  │   (df -hT)   │  │   (scan script)   │   │
//! │  └─────┬──────┘  └──────┬───────┘  └─────────┬─────────┘   │
//! │        └────────────────┼────────────────────┘             │
//! │                  ┌──────▼──────┐                           │
//! │                  │  Connector  │ (trait)                   │
//! │                  └──────┬──────┘                           │
//! └─────────────────────────┼──────────────────────────────────┘
//!                           │
//!               ┌───────────┴────────────┐
//!        ┌──────▼──────┐          ┌──────▼────────┐
//!        │SshConnector │          │ MockConnector │
//!        │(production) │          │   (testing)   │
//!        └─────────────┘          └───────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production
//!
//! ```ignore
//! use std::path::Path;
//!
//! use clusterscope_core::access::Scope;
//! use clusterscope_core::collector::{Collector, SshConnector};
//! use clusterscope_core::config::ClusterConfig;
//!
//! let config = ClusterConfig::load(Path::new("config/nodes.yaml"))?;
//! let collector = Collector::new(SshConnector::default(), config);
//! let snapshot = collector.collect_snapshot(Scope::Scratch).await?;
//! ```
//!
//! ## Testing (with MockConnector)
//!
//! ```
//! use clusterscope_core::access::Scope;
//! use clusterscope_core::collector::{Collector, MockConnector, mock};
//!
//! let collector = Collector::new(MockConnector::typical_cluster(), mock::sample_config());
//! let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let snapshot = runtime.block_on(collector.collect_snapshot(Scope::Scratch)).unwrap();
//! assert!(!snapshot.slurm_queue_info.is_empty());
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod mock;
pub mod queue;
pub mod session;
pub mod traits;
pub mod user_usage;
pub mod volume;

// Re-exports for the public API
#[allow(unused_imports)]
pub use collector::Collector;
#[allow(unused_imports)]
pub use mock::MockConnector;
#[allow(unused_imports)]
pub use session::SshConnector;
#[allow(unused_imports)]
pub use traits::{CommandOutput, Connector, RemoteSession, SessionError};
