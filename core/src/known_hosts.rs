//! # Known-Hosts Sanitizer
//!
//! Test fleets are redeployed often and come back under the same address with a new
//! host key. A stale `known_hosts` record then makes every session fail host-key
//! verification, so the record is removed before each host is contacted.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use logsweep_common::error::TrustStoreError;
use logsweep_common::models::host::Host;
use logsweep_common::trust::TrustStore;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

pub struct Sanitizer {
    store: Arc<dyn TrustStore>,
}

impl Sanitizer {
    pub fn new(store: Arc<dyn TrustStore>) -> Self {
        Self { store }
    }

    /// Removes every trust record for `host`. Returns the number of removed records.
    pub async fn sanitize(&self, host: &Host) -> Result<usize, TrustStoreError> {
        let removed: usize = self.store.remove(host.address()).await?;
        if removed > 0 {
            debug!("Removed {removed} known-hosts record(s) for {host}");
        }
        Ok(removed)
    }
}

/// An OpenSSH `known_hosts` file.
///
/// Hashed entries (`|1|...`) cannot be matched without the salt and are left alone.
/// Removals from concurrent hosts are serialized; the lock is held across the
/// read and the rename.
pub struct KnownHostsFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl KnownHostsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `~/.ssh/known_hosts`, when a home directory is known.
    pub fn user_default() -> Option<Self> {
        let home = std::env::var_os("HOME")?;
        Some(Self::new(Path::new(&home).join(".ssh").join("known_hosts")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> TrustStoreError {
        TrustStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl TrustStore for KnownHostsFile {
    async fn remove(&self, address: &str) -> Result<usize, TrustStoreError> {
        let _guard = self.lock.lock().await;

        let contents: String = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(self.io_error(e)),
        };

        let (kept, removed) = strip_host(&contents, address);
        if removed == 0 {
            return Ok(0);
        }

        let tmp: PathBuf = self.path.with_extension("logsweep-tmp");
        fs::write(&tmp, kept).await.map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).await.map_err(|e| self.io_error(e))?;
        Ok(removed)
    }
}

/// Returns `contents` without the records naming `address`, and how many were removed.
pub fn strip_host(contents: &str, address: &str) -> (String, usize) {
    let mut kept = String::with_capacity(contents.len());
    let mut removed: usize = 0;

    for line in contents.split_inclusive('\n') {
        if names_host(line, address) {
            removed += 1;
        } else {
            kept.push_str(line);
        }
    }
    (kept, removed)
}

fn names_host(line: &str, address: &str) -> bool {
    let line = line.trim_start();
    if line.is_empty() || line.starts_with('#') {
        return false;
    }

    let mut fields = line.split_whitespace();
    let patterns = match fields.next() {
        Some(marker) if marker.starts_with('@') => fields.next(),
        first => first,
    };

    patterns
        .map(|list| list.split(',').any(|pattern| pattern_is(pattern, address)))
        .unwrap_or(false)
}

fn pattern_is(pattern: &str, address: &str) -> bool {
    if pattern == address {
        return true;
    }
    // "[host]:port" form used for non-default ports
    pattern
        .strip_prefix('[')
        .and_then(|rest| rest.split_once("]:"))
        .is_some_and(|(host, _port)| host == address)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
