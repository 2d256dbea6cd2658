//! # Collection Orchestrator
//!
//! Drives every host through the pipeline:
//!
//! ```text
//! Discovered -> LivenessChecked -> Skipped
//!                               -> Listing -> Listed -> Downloading(*) -> Done
//! ```
//!
//! There is no retry state. A failure at any stage ends the host (with whatever
//! was already downloaded) and the collector moves on. The only error returned to
//! the caller is an unusable destination directory, detected before any host work.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use futures::stream::{self, StreamExt};
use logsweep_common::config::Timeouts;
use logsweep_common::error::CollectError;
use logsweep_common::liveness::LivenessProbe;
use logsweep_common::models::credential::Credential;
use logsweep_common::models::host::Host;
use logsweep_common::models::log_file::RemoteLogFile;
use logsweep_common::models::outcome::{DownloadOutcome, DownloadStatus, FailureReason};
use logsweep_common::models::report::{CollectionReport, HostReport, HostStatus};
use logsweep_common::models::run::CollectionRun;
use logsweep_common::shell::RemoteShell;
use logsweep_common::trust::TrustStore;
use tempfile::NamedTempFile;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};

use crate::downloader::Downloader;
use crate::known_hosts::Sanitizer;
use crate::lister::Lister;

type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

pub struct Collector {
    probe: Arc<dyn LivenessProbe>,
    sanitizer: Sanitizer,
    lister: Lister,
    downloader: Downloader,
    credential: Credential,
    timeouts: Timeouts,
    parallelism: usize,
    on_host_done: Option<ProgressCallback>,
}

impl Collector {
    pub fn new(
        shell: Arc<dyn RemoteShell>,
        probe: Arc<dyn LivenessProbe>,
        trust_store: Arc<dyn TrustStore>,
        credential: Credential,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            probe,
            sanitizer: Sanitizer::new(trust_store),
            lister: Lister::new(shell.clone(), timeouts),
            downloader: Downloader::new(shell, timeouts),
            credential,
            timeouts,
            parallelism: 1,
            on_host_done: None,
        }
    }

    /// Number of hosts processed concurrently. Values below one mean sequential.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Called with `(finished, total)` each time a host reaches a terminal state.
    pub fn on_host_done<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.on_host_done = Some(Arc::new(callback));
        self
    }

    /// Collects from every host of `run`. Per-host reports keep the order of `run.hosts`.
    ///
    /// Cancelling `cancel` stops new hosts and files from starting; hosts that never
    /// started are reported as [`HostStatus::Cancelled`].
    pub async fn collect(
        &self,
        run: &CollectionRun,
        cancel: &CancellationToken,
    ) -> Result<CollectionReport, CollectError> {
        prepare_destination(&run.destination).await?;

        let start_time: Instant = Instant::now();
        let total: usize = run.hosts.len();
        let finished = AtomicUsize::new(0);
        let finished = &finished;

        let hosts: Vec<HostReport> = stream::iter(run.hosts.iter())
            .map(|host| async move {
                let report: HostReport = self
                    .collect_host(host, run, cancel)
                    .instrument(info_span!("host", %host))
                    .await;
                let done: usize = finished.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(callback) = &self.on_host_done {
                    callback(done, total);
                }
                report
            })
            .buffered(self.parallelism)
            .collect()
            .await;

        let report = CollectionReport {
            hosts,
            elapsed_secs: start_time.elapsed().as_secs_f64(),
        };
        info!(
            "Collected {} file(s), {} failed, {} host(s) skipped",
            report.downloaded(),
            report.failed(),
            report.skipped_hosts()
        );
        Ok(report)
    }

    async fn collect_host(
        &self,
        host: &Host,
        run: &CollectionRun,
        cancel: &CancellationToken,
    ) -> HostReport {
        if cancel.is_cancelled() {
            return HostReport::new(host.clone(), HostStatus::Cancelled);
        }

        if !self.is_up(host).await {
            warn!("{host} is down and its logs cannot be retrieved.");
            return HostReport::new(host.clone(), HostStatus::Skipped("host unreachable".into()));
        }

        if let Err(e) = self.sanitizer.sanitize(host).await {
            warn!("Could not clear known-hosts entries for {host}: {e}");
        }

        let files: Vec<RemoteLogFile> = match self
            .lister
            .list(host, &self.credential, &run.remote_dir, &run.prefixes)
            .await
        {
            Ok(files) => files,
            Err(e) => {
                error!("Failed to list {} on {host}: {e}", run.remote_dir);
                return HostReport::new(host.clone(), HostStatus::ListingFailed(e.to_string()));
            }
        };

        let mut report = HostReport::new(host.clone(), HostStatus::Collected);
        report.files_listed = files.len();

        for file in &files {
            if cancel.is_cancelled() {
                report.status = HostStatus::Cancelled;
                break;
            }

            let outcome: DownloadOutcome = tokio::select! {
                outcome = self.downloader.download(
                    host,
                    &self.credential,
                    &run.remote_dir,
                    file,
                    &run.destination,
                ) => outcome,
                _ = cancel.cancelled() => {
                    self.downloader
                        .abandoned(host, &run.remote_dir, file, &run.destination)
                        .await
                }
            };

            let cancelled: bool =
                outcome.status == DownloadStatus::Failed(FailureReason::Cancelled);
            report.outcomes.push(outcome);
            if cancelled {
                report.status = HostStatus::Cancelled;
                break;
            }
        }

        info!(
            "{host}: {}/{} file(s) downloaded",
            report.downloaded(),
            report.files_listed
        );
        report
    }

    async fn is_up(&self, host: &Host) -> bool {
        timeout(self.timeouts.probe, self.probe.is_up(host))
            .await
            .unwrap_or(false)
    }
}

async fn prepare_destination(path: &Path) -> Result<(), CollectError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| CollectError::Destination {
            path: path.to_path_buf(),
            source,
        })?;

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|source| CollectError::Destination {
            path: path.to_path_buf(),
            source,
        })?;
    if !metadata.is_dir() {
        return Err(CollectError::NotWritable(path.to_path_buf()));
    }

    // Permission bits alone do not say whether this process may write here.
    let dir: PathBuf = path.to_path_buf();
    let writable: bool = tokio::task::spawn_blocking(move || NamedTempFile::new_in(&dir).is_ok())
        .await
        .unwrap_or(false);
    if !writable {
        return Err(CollectError::NotWritable(path.to_path_buf()));
    }
    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
