use std::path::PathBuf;
use std::time::Duration;

use crate::models::credential::Credential;
use crate::models::host::Host;
use crate::models::run::CollectionRun;

pub const DEFAULT_LOG_DIR: &str = "/var/log";
pub const DEFAULT_DESTINATION: &str = "./reports/log";
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_SSH_PORT: u16 = 22;
pub const DEFAULT_PREFIXES: &[&str] = &["photon-controller-agent", "hostd", "vmk"];

pub struct Config {
    /// The host that is always collected from, even when the inventory is unavailable.
    pub primary_host: String,
    pub credential: Credential,
    pub remote_dir: String,
    pub destination: PathBuf,
    pub prefixes: Vec<String>,
    pub ssh_port: u16,
    /// Overrides the user's `~/.ssh/known_hosts`.
    pub known_hosts: Option<PathBuf>,
    pub inventory: Option<InventoryConfig>,
    pub timeouts: Timeouts,
    /// Number of hosts processed at once. `1` keeps a single session open at a time.
    pub parallelism: usize,
    /// Where to write the JSON run report, if anywhere.
    pub report: Option<PathBuf>,
    pub quiet: u8,
    pub no_banner: bool,
}

#[derive(Debug, Clone)]
pub struct InventoryConfig {
    pub endpoint: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub probe: Duration,
    pub connect: Duration,
    pub command: Duration,
    pub transfer: Duration,
    pub inventory: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            probe: Duration::from_secs(3),
            connect: Duration::from_secs(10),
            command: Duration::from_secs(30),
            transfer: Duration::from_secs(300),
            inventory: Duration::from_secs(15),
        }
    }
}

impl Config {
    pub fn new(primary_host: impl Into<String>, credential: Credential) -> Self {
        Self {
            primary_host: primary_host.into(),
            credential,
            remote_dir: DEFAULT_LOG_DIR.to_string(),
            destination: PathBuf::from(DEFAULT_DESTINATION),
            prefixes: DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect(),
            ssh_port: DEFAULT_SSH_PORT,
            known_hosts: None,
            inventory: None,
            timeouts: Timeouts::default(),
            parallelism: 1,
            report: None,
            quiet: 0,
            no_banner: false,
        }
    }

    /// Binds the resolved hosts to the paths and prefixes of this configuration.
    pub fn collection_run(&self, hosts: Vec<Host>) -> CollectionRun {
        CollectionRun {
            hosts,
            remote_dir: self.remote_dir.clone(),
            prefixes: self.prefixes.clone(),
            destination: self.destination.clone(),
        }
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
