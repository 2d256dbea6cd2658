use std::path::{Path, PathBuf};
use std::sync::Arc;

use logsweep_common::config::Timeouts;
use logsweep_common::models::credential::Credential;
use logsweep_common::models::host::Host;
use logsweep_common::models::log_file::RemoteLogFile;
use logsweep_common::models::outcome::{DownloadOutcome, DownloadStatus, FailureReason};
use logsweep_common::shell::{RemoteSession, RemoteShell, Transfer};
use tracing::{debug, info, warn};

use crate::deadline::within;

/// Copies single remote files into a flat local directory.
///
/// Every failure is reported in the returned [`DownloadOutcome`]; nothing here
/// aborts sibling downloads.
pub struct Downloader {
    shell: Arc<dyn RemoteShell>,
    timeouts: Timeouts,
}

impl Downloader {
    pub fn new(shell: Arc<dyn RemoteShell>, timeouts: Timeouts) -> Self {
        Self { shell, timeouts }
    }

    pub async fn download(
        &self,
        host: &Host,
        credential: &Credential,
        remote_dir: &str,
        file: &RemoteLogFile,
        local_dir: &Path,
    ) -> DownloadOutcome {
        let remote_path: String = file.remote_path(remote_dir);
        let local_path: PathBuf = local_path(host, file, local_dir);

        info!(
            "Downloading {remote_path} from {host} to {} ...",
            local_path.display()
        );
        let status: DownloadStatus = self
            .transfer(host, credential, &remote_path, &local_path)
            .await;

        match &status {
            DownloadStatus::Downloaded => debug!("Saved {}", local_path.display()),
            DownloadStatus::Failed(FailureReason::Missing) => {
                warn!("File {remote_path} does not exist on {host}")
            }
            DownloadStatus::Failed(reason) => {
                warn!("Failed to retrieve {remote_path} from {host}: {reason}")
            }
        }

        DownloadOutcome {
            host: host.clone(),
            remote_path,
            local_path,
            status,
        }
    }

    /// Outcome for a transfer abandoned by cancellation. Removes whatever was written.
    pub async fn abandoned(
        &self,
        host: &Host,
        remote_dir: &str,
        file: &RemoteLogFile,
        local_dir: &Path,
    ) -> DownloadOutcome {
        let local_path: PathBuf = local_path(host, file, local_dir);
        discard_partial(&local_path).await;
        DownloadOutcome {
            host: host.clone(),
            remote_path: file.remote_path(remote_dir),
            local_path,
            status: DownloadStatus::Failed(FailureReason::Cancelled),
        }
    }

    async fn transfer(
        &self,
        host: &Host,
        credential: &Credential,
        remote_path: &str,
        local_path: &Path,
    ) -> DownloadStatus {
        let mut session: Box<dyn RemoteSession> = match within(
            "connect",
            self.timeouts.connect,
            self.shell.connect(host, credential),
        )
        .await
        {
            Ok(session) => session,
            Err(e) => return DownloadStatus::Failed(FailureReason::Connect(e.to_string())),
        };

        let transfer = within(
            remote_path,
            self.timeouts.transfer,
            session.transfer_file(remote_path, local_path),
        )
        .await;

        match transfer {
            Ok(Transfer::Completed) => DownloadStatus::Downloaded,
            Ok(Transfer::Missing) => {
                discard_partial(local_path).await;
                DownloadStatus::Failed(FailureReason::Missing)
            }
            Err(e) => {
                discard_partial(local_path).await;
                DownloadStatus::Failed(FailureReason::Transfer(e.to_string()))
            }
        }
    }
}

/// Where `file` from `host` lands inside `local_dir`.
pub fn local_path(host: &Host, file: &RemoteLogFile, local_dir: &Path) -> PathBuf {
    local_dir.join(collision_safe_name(host, &file.name))
}

/// Inserts the host address before the extension: `hostd.log` from `10.0.0.5`
/// becomes `hostd-10.0.0.5.log`. Names without an extension get the address appended.
pub fn collision_safe_name(host: &Host, name: &str) -> String {
    let path = Path::new(name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => format!(
            "{}-{}.{}",
            stem.to_string_lossy(),
            host.address(),
            ext.to_string_lossy()
        ),
        _ => format!("{name}-{}", host.address()),
    }
}

async fn discard_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed partial file {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove partial file {}: {e}", path.display()),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
