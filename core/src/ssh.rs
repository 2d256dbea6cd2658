//! # OpenSSH Remote Shell
//!
//! [`RemoteShell`] backed by the system `ssh` and `scp` binaries. Password credentials
//! are handed to `sshpass -e` through the environment, never on the command line;
//! without a password the session runs in `BatchMode` and relies on keys or an agent.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use logsweep_common::error::ShellError;
use logsweep_common::models::credential::Credential;
use logsweep_common::models::host::Host;
use logsweep_common::shell::{RemoteSession, RemoteShell, Transfer};
use tokio::process::Command;
use tracing::debug;

/// Exit status `ssh` uses for its own (connection/authentication) failures.
const SSH_CONNECTION_FAILURE: i32 = 255;

pub struct OpenSsh {
    port: u16,
    connect_timeout: Duration,
    known_hosts: Option<PathBuf>,
}

impl OpenSsh {
    pub fn new(port: u16, connect_timeout: Duration) -> Self {
        Self {
            port,
            connect_timeout,
            known_hosts: None,
        }
    }

    /// Uses `path` instead of the user's `~/.ssh/known_hosts`.
    pub fn with_known_hosts(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts = Some(path.into());
        self
    }
}

#[async_trait]
impl RemoteShell for OpenSsh {
    async fn connect(
        &self,
        host: &Host,
        credential: &Credential,
    ) -> Result<Box<dyn RemoteSession>, ShellError> {
        let mut session = OpenSshSession {
            host: host.clone(),
            credential: credential.clone(),
            options: ssh_options(self.connect_timeout, self.known_hosts.as_deref(), credential),
            port: self.port,
        };

        // `ssh` has no persistent handle; a no-op command proves the login works.
        session.run("true").await.map_err(|e| match e {
            ShellError::Command { stderr, .. } => ShellError::Connect {
                host: host.to_string(),
                reason: stderr,
            },
            other => other,
        })?;
        debug!("Session to {}@{host} established", credential.username);
        Ok(Box::new(session))
    }
}

struct OpenSshSession {
    host: Host,
    credential: Credential,
    options: Vec<String>,
    port: u16,
}

impl OpenSshSession {
    fn command(&self, program: &str) -> Command {
        let mut command = match self.credential.secret() {
            Some(secret) => {
                let mut command = Command::new("sshpass");
                command.arg("-e").arg(program).env("SSHPASS", secret);
                command
            }
            None => Command::new(program),
        };
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    async fn execute(&self, mut command: Command, display: &str) -> Result<Output, ShellError> {
        let output: Output = command.output().await?;
        if output.status.success() {
            return Ok(output);
        }

        let stderr: String = String::from_utf8_lossy(&output.stderr).trim().to_string();
        match output.status.code() {
            Some(SSH_CONNECTION_FAILURE) => Err(ShellError::Connect {
                host: self.host.to_string(),
                reason: stderr,
            }),
            status => Err(ShellError::Command {
                command: display.to_string(),
                status,
                stderr,
            }),
        }
    }
}

#[async_trait]
impl RemoteSession for OpenSshSession {
    async fn run(&mut self, remote_command: &str) -> Result<String, ShellError> {
        let mut command = self.command("ssh");
        command
            .arg("-p")
            .arg(self.port.to_string())
            .args(&self.options)
            .arg(ssh_target(&self.credential.username, &self.host))
            .arg(remote_command);

        let output: Output = self.execute(command, remote_command).await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn transfer_file(
        &mut self,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<Transfer, ShellError> {
        let probe: String = format!("test -f {}", quote(remote_path));
        match self.run(&probe).await {
            Ok(_) => {}
            Err(ShellError::Command {
                status: Some(1), ..
            }) => return Ok(Transfer::Missing),
            Err(e) => return Err(e),
        }

        let mut command = self.command("scp");
        command
            .arg("-q")
            .arg("-P")
            .arg(self.port.to_string())
            .args(&self.options)
            .arg(scp_source(&self.credential.username, &self.host, remote_path))
            .arg(local_path);

        self.execute(command, &format!("scp {remote_path}")).await?;
        Ok(Transfer::Completed)
    }
}

fn ssh_options(
    connect_timeout: Duration,
    known_hosts: Option<&Path>,
    credential: &Credential,
) -> Vec<String> {
    let mut options: Vec<String> = vec![
        format!("ConnectTimeout={}", connect_timeout.as_secs().max(1)),
        "StrictHostKeyChecking=accept-new".to_string(),
        "LogLevel=ERROR".to_string(),
    ];
    if credential.secret().is_some() {
        options.push("PubkeyAuthentication=no".to_string());
        options.push("NumberOfPasswordPrompts=1".to_string());
    } else {
        options.push("BatchMode=yes".to_string());
    }
    if let Some(path) = known_hosts {
        options.push(format!("UserKnownHostsFile={}", path.display()));
    }

    options
        .into_iter()
        .flat_map(|option| ["-o".to_string(), option])
        .collect()
}

fn ssh_target(username: &str, host: &Host) -> String {
    format!("{username}@{}", host.address())
}

fn scp_source(username: &str, host: &Host, remote_path: &str) -> String {
    let address: &str = host.address();
    if address.contains(':') {
        format!("{username}@[{address}]:{remote_path}")
    } else {
        format!("{username}@{address}:{remote_path}")
    }
}

/// Single-quotes `raw` for a POSIX shell.
pub fn quote(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', r"'\''"))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
