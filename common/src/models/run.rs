use std::path::PathBuf;

use crate::models::host::Host;

/// Scope of one collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRun {
    /// Deduplicated, sorted, non-empty. See `logsweep_core::resolver`.
    pub hosts: Vec<Host>,
    pub remote_dir: String,
    pub prefixes: Vec<String>,
    pub destination: PathBuf,
}
