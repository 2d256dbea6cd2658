use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::models::host::Host;

/// Result of downloading one remote file. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadOutcome {
    pub host: Host,
    pub remote_path: String,
    pub local_path: PathBuf,
    pub status: DownloadStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum DownloadStatus {
    Downloaded,
    Failed(FailureReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FailureReason {
    /// The file disappeared between listing and transfer.
    Missing,
    Connect(String),
    Transfer(String),
    Cancelled,
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        self.status == DownloadStatus::Downloaded
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match &self.status {
            DownloadStatus::Downloaded => None,
            DownloadStatus::Failed(reason) => Some(reason),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Missing => f.write_str("file does not exist"),
            FailureReason::Connect(msg) => write!(f, "no session for transfer: {msg}"),
            FailureReason::Transfer(msg) => write!(f, "transfer failed: {msg}"),
            FailureReason::Cancelled => f.write_str("cancelled"),
        }
    }
}
