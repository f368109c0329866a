//! SSH transport to the cluster head node.
//!
//! Wraps `async-ssh2-tokio` behind the `Connector`/`RemoteSession` seam.
//! Both the handshake and each command run under a deadline; a command
//! that overruns surfaces as a `SessionError::Timeout` and the session is
//! torn down by the owning poller.

use std::time::Duration;

use async_ssh2_tokio::client::{AuthMethod, Client, ServerCheckMethod};
use tracing::debug;

use crate::collector::traits::{CommandOutput, Connector, RemoteSession, SessionError};
use crate::config::NodeTarget;

/// Connect deadline when none is configured.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Per-command deadline when none is configured.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Opens real SSH sessions, one per poller.
#[derive(Debug, Clone, Copy)]
pub struct SshConnector {
    connect_timeout: Duration,
    command_timeout: Duration,
}

impl SshConnector {
    pub fn new(connect_timeout: Duration, command_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            command_timeout,
        }
    }
}

impl Default for SshConnector {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT, DEFAULT_COMMAND_TIMEOUT)
    }
}

impl Connector for SshConnector {
    type Session = SshSession;

    async fn connect(
        &self,
        target: &NodeTarget,
        private_key: &str,
    ) -> Result<SshSession, SessionError> {
        let auth = AuthMethod::with_key(private_key, None);
        let connect = Client::connect(
            (target.host.as_str(), target.port),
            target.user.as_str(),
            auth,
            ServerCheckMethod::NoCheck,
        );

        let client = tokio::time::timeout(self.connect_timeout, connect)
            .await
            .map_err(|_| SessionError::Timeout {
                phase: "connect",
                after: self.connect_timeout,
            })?
            .map_err(|e| SessionError::Connection(first_line(e.to_string())))?;

        debug!(host = %target.host, port = target.port, user = %target.user, "session established");

        Ok(SshSession {
            client,
            command_timeout: self.command_timeout,
        })
    }
}

/// One live SSH connection. Commands run sequentially on it.
pub struct SshSession {
    client: Client,
    command_timeout: Duration,
}

impl RemoteSession for SshSession {
    async fn run(&self, command: &str) -> Result<CommandOutput, SessionError> {
        let result = tokio::time::timeout(self.command_timeout, self.client.execute(command))
            .await
            .map_err(|_| SessionError::Timeout {
                phase: "command",
                after: self.command_timeout,
            })?
            .map_err(|e| SessionError::Command(first_line(e.to_string())))?;

        Ok(CommandOutput {
            exit_code: result.exit_status,
            stdout: result.stdout,
            stderr: result.stderr,
        })
    }

    async fn close(&self) {
        // A half-open transport fails disconnect; there is nothing left to tear down.
        if let Err(e) = self.client.disconnect().await {
            debug!(error = %e, "disconnect failed");
        }
    }
}

/// Flattens library errors to a single line for logs and error variants.
fn first_line(msg: String) -> String {
    match msg.split_once('\n') {
        Some((first, _)) => first.to_string(),
        None => msg,
    }
}
