use std::path::Path;

use async_trait::async_trait;

use crate::error::ShellError;
use crate::models::credential::Credential;
use crate::models::host::Host;

/// Result of a single file transfer that did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    Completed,
    /// The remote path did not exist when the transfer was attempted.
    Missing,
}

/// Opens authenticated sessions to remote hosts.
#[async_trait]
pub trait RemoteShell: Send + Sync {
    async fn connect(
        &self,
        host: &Host,
        credential: &Credential,
    ) -> Result<Box<dyn RemoteSession>, ShellError>;
}

/// An open channel to one host.
#[async_trait]
pub trait RemoteSession: Send {
    /// Runs `command` and returns its standard output.
    async fn run(&mut self, command: &str) -> Result<String, ShellError>;

    /// Copies `remote_path` to `local_path`.
    async fn transfer_file(
        &mut self,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<Transfer, ShellError>;
}
