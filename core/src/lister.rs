use std::sync::Arc;

use logsweep_common::config::Timeouts;
use logsweep_common::error::ShellError;
use logsweep_common::models::credential::Credential;
use logsweep_common::models::host::Host;
use logsweep_common::models::log_file::RemoteLogFile;
use logsweep_common::shell::{RemoteSession, RemoteShell};
use tracing::info;

use crate::deadline::within;
use crate::ssh::quote;

/// Lists a remote log directory and keeps the files matching the configured prefixes.
pub struct Lister {
    shell: Arc<dyn RemoteShell>,
    timeouts: Timeouts,
}

impl Lister {
    pub fn new(shell: Arc<dyn RemoteShell>, timeouts: Timeouts) -> Self {
        Self { shell, timeouts }
    }

    /// Runs one `ls` against `directory`. Any error abandons the listing for this host.
    pub async fn list(
        &self,
        host: &Host,
        credential: &Credential,
        directory: &str,
        prefixes: &[String],
    ) -> Result<Vec<RemoteLogFile>, ShellError> {
        let mut session: Box<dyn RemoteSession> = within(
            "connect",
            self.timeouts.connect,
            self.shell.connect(host, credential),
        )
        .await?;

        let command: String = format!("ls {}", quote(directory));
        let output: String = within(&command, self.timeouts.command, session.run(&command)).await?;

        let files: Vec<RemoteLogFile> = filter_by_prefix(parse_listing(&output), prefixes);
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        info!("Log files on {host}: {names:?}");
        Ok(files)
    }
}

/// Splits raw `ls` output on any run of whitespace.
///
/// There is no quoting: a filename containing whitespace comes back as several names.
pub fn parse_listing(raw: &str) -> Vec<&str> {
    raw.split_whitespace().collect()
}

/// Keeps the names starting with one of `prefixes`, tagged with the first prefix that matched.
pub fn filter_by_prefix<'a, I>(names: I, prefixes: &[String]) -> Vec<RemoteLogFile>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter_map(|name| {
            prefixes
                .iter()
                .find(|prefix| name.starts_with(prefix.as_str()))
                .map(|prefix| RemoteLogFile::new(name, prefix.as_str()))
        })
        .collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
