pub mod collect;
pub mod hosts;

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use logsweep_common::config::{
    Config, DEFAULT_DESTINATION, DEFAULT_LOG_DIR, DEFAULT_SSH_PORT, DEFAULT_USER, InventoryConfig,
    Timeouts,
};
use logsweep_common::models::credential::Credential;

#[derive(Parser)]
#[command(name = "logsweep")]
#[command(about = "Collects log files from a fleet of hosts over SSH.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Less output (-q hides progress details, -qq only prints errors)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Do not print the banner
    #[arg(long, global = true)]
    pub no_banner: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download matching log files from every reachable host
    #[command(alias = "c")]
    Collect(CollectArgs),
    /// Show the host set a collection would visit and which hosts answer
    #[command(alias = "h")]
    Hosts(TargetArgs),
}

/// Where the host set comes from.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Primary host, always part of the host set
    #[arg(long, env = "LOGSWEEP_HOST")]
    pub host: String,

    /// Management service base URL queried for additional hosts
    #[arg(long, env = "LOGSWEEP_INVENTORY_URL")]
    pub inventory_url: Option<String>,

    /// Bearer token for the management service
    #[arg(long, env = "LOGSWEEP_INVENTORY_TOKEN", hide_env_values = true)]
    pub inventory_token: Option<String>,

    /// SSH port, also used by the liveness probe
    #[arg(long, default_value_t = DEFAULT_SSH_PORT)]
    pub ssh_port: u16,

    /// Seconds to wait for the liveness probe
    #[arg(long, default_value_t = 3)]
    pub probe_timeout: u64,
}

#[derive(Args, Debug)]
pub struct CollectArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Remote login name
    #[arg(short, long, default_value = DEFAULT_USER)]
    pub user: String,

    /// Remote password; key authentication is used when absent
    #[arg(long, env = "LOGSWEEP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Remote directory to list
    #[arg(long, default_value = DEFAULT_LOG_DIR)]
    pub log_dir: String,

    /// Local directory receiving the renamed files
    #[arg(short, long, default_value = DEFAULT_DESTINATION)]
    pub dest: PathBuf,

    /// Filename prefix to collect (repeatable)
    #[arg(short, long = "prefix")]
    pub prefixes: Vec<String>,

    /// known_hosts file to sanitize and use (default: ~/.ssh/known_hosts)
    #[arg(long)]
    pub known_hosts: Option<PathBuf>,

    /// Seconds to wait for a session to open
    #[arg(long, default_value_t = 10)]
    pub connect_timeout: u64,

    /// Seconds to wait for the listing command
    #[arg(long, default_value_t = 30)]
    pub command_timeout: u64,

    /// Seconds to wait for a single file transfer
    #[arg(long, default_value_t = 300)]
    pub transfer_timeout: u64,

    /// Number of hosts collected at once
    #[arg(short = 'j', long, default_value_t = 1)]
    pub parallel: usize,

    /// Write a JSON report of every host and file to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl TargetArgs {
    /// Library defaults with the probe deadline taken from the command line.
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            probe: Duration::from_secs(self.probe_timeout),
            ..Timeouts::default()
        }
    }

    pub fn inventory(&self) -> Option<InventoryConfig> {
        self.inventory_url.as_ref().map(|endpoint| InventoryConfig {
            endpoint: endpoint.clone(),
            token: self.inventory_token.clone(),
        })
    }
}

impl CollectArgs {
    pub fn into_config(self, quiet: u8, no_banner: bool) -> Config {
        let mut cfg = Config::new(
            self.target.host.clone(),
            Credential::new(self.user, self.password),
        );

        cfg.remote_dir = self.log_dir;
        cfg.destination = self.dest;
        if !self.prefixes.is_empty() {
            cfg.prefixes = self.prefixes;
        }
        cfg.ssh_port = self.target.ssh_port;
        cfg.known_hosts = self.known_hosts;
        cfg.inventory = self.target.inventory();
        cfg.timeouts = Timeouts {
            connect: Duration::from_secs(self.connect_timeout),
            command: Duration::from_secs(self.command_timeout),
            transfer: Duration::from_secs(self.transfer_timeout),
            ..self.target.timeouts()
        };
        cfg.parallelism = self.parallel.max(1);
        cfg.report = self.report;
        cfg.quiet = quiet;
        cfg.no_banner = no_banner;
        cfg
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
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
