use serde::Serialize;

use crate::models::host::Host;
use crate::models::outcome::DownloadOutcome;

/// Terminal state of one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum HostStatus {
    /// Failed the liveness probe.
    Skipped(String),
    /// Session or listing command failed; no files were attempted.
    ListingFailed(String),
    /// Listing succeeded; individual outcomes may still contain failures.
    Collected,
    /// The run was cancelled before this host finished.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostReport {
    pub host: Host,
    pub status: HostStatus,
    pub files_listed: usize,
    pub outcomes: Vec<DownloadOutcome>,
}

impl HostReport {
    pub fn new(host: Host, status: HostStatus) -> Self {
        Self {
            host,
            status,
            files_listed: 0,
            outcomes: Vec::new(),
        }
    }

    pub fn downloaded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionReport {
    pub hosts: Vec<HostReport>,
    pub elapsed_secs: f64,
}

impl CollectionReport {
    pub fn outcomes(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.hosts.iter().flat_map(|h| h.outcomes.iter())
    }

    pub fn downloaded(&self) -> usize {
        self.outcomes().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes().filter(|o| !o.is_success()).count()
    }

    pub fn skipped_hosts(&self) -> usize {
        self.hosts
            .iter()
            .filter(|h| matches!(h.status, HostStatus::Skipped(_)))
            .count()
    }

    pub fn host(&self, address: &str) -> Option<&HostReport> {
        self.hosts.iter().find(|h| h.host.address() == address)
    }
}
