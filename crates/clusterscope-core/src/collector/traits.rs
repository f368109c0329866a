//! Abstractions over remote command execution to enable testing and mocking.
//!
//! The `Connector` and `RemoteSession` traits let the pollers run against
//! the real SSH transport in production or an in-memory mock in tests and
//! local development.

use std::time::Duration;

use crate::config::NodeTarget;

/// Captured result of one remote command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub exit_code: u32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// True when the command exited zero.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Error type for session establishment and remote execution.
#[derive(Debug)]
pub enum SessionError {
    /// Session could not be established.
    Connection(String),
    /// Command failed in transit.
    Command(String),
    /// Connect or command exceeded its deadline.
    Timeout { phase: &'static str, after: Duration },
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Connection(msg) => write!(f, "connection failed: {}", msg),
            SessionError::Command(msg) => write!(f, "command failed: {}", msg),
            SessionError::Timeout { phase, after } => {
                write!(f, "{} timed out after {:?}", phase, after)
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Opens authenticated sessions to a remote host.
///
/// Each poller opens its own session: the three pollers run concurrently
/// and a shared channel would serialize them.
#[allow(async_fn_in_trait)]
pub trait Connector: Send + Sync {
    /// Session type handed to the pollers.
    type Session: RemoteSession;

    /// Opens a session to `target`, authenticating with the supplied
    /// private key. The credential is borrowed for the handshake only.
    async fn connect(
        &self,
        target: &NodeTarget,
        private_key: &str,
    ) -> Result<Self::Session, SessionError>;
}

/// One authenticated session, executing commands one at a time.
#[allow(async_fn_in_trait)]
pub trait RemoteSession: Send {
    /// Runs one command and captures its exit status and output.
    async fn run(&self, command: &str) -> Result<CommandOutput, SessionError>;

    /// Tears the session down. Idempotent; must be called on every exit
    /// path so a live connection is never leaked.
    async fn close(&self);
}
