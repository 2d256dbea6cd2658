use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use colored::*;
use logsweep_common::config::Config;
use logsweep_common::inventory::Inventory;
use logsweep_common::models::host::Host;
use logsweep_common::models::report::CollectionReport;
use logsweep_common::trust::TrustStore;
use logsweep_core::collector::Collector;
use logsweep_core::inventory::HttpInventory;
use logsweep_core::known_hosts::KnownHostsFile;
use logsweep_core::liveness::TcpProbe;
use logsweep_core::resolver;
use logsweep_core::ssh::OpenSsh;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::lsprint;
use crate::terminal::{colors, format, print, spinner};

/// 128 + SIGINT, as shells report it.
const INTERRUPTED_EXIT_CODE: i32 = 130;

pub async fn collect(cfg: &Config) -> anyhow::Result<()> {
    print_settings(cfg);

    let inventory: Option<HttpInventory> = build_inventory(cfg);
    let hosts: Vec<Host> = resolver::resolve(
        &cfg.primary_host,
        inventory.as_ref().map(|i| i as &dyn Inventory),
    )
    .await;

    if hosts.is_empty() {
        print::no_hosts();
        return Ok(());
    }

    let known_hosts: PathBuf = known_hosts_path(cfg)?;
    let trust_store: Arc<dyn TrustStore> = Arc::new(KnownHostsFile::new(&known_hosts));
    let shell = OpenSsh::new(cfg.ssh_port, cfg.timeouts.connect).with_known_hosts(&known_hosts);
    let probe = TcpProbe::new(cfg.ssh_port, cfg.timeouts.probe);

    let collector = Collector::new(
        Arc::new(shell),
        Arc::new(probe),
        trust_store,
        cfg.credential.clone(),
        cfg.timeouts,
    )
    .with_parallelism(cfg.parallelism)
    .on_host_done(spinner::report_host_done);

    let cancel: CancellationToken = cancel_on_interrupt();
    let run = cfg.collection_run(hosts);

    spinner::start_collection_spinner(run.hosts.len());
    let result = collector.collect(&run, &cancel).await;
    spinner::finish();
    let report: CollectionReport = result?;

    collection_ends(&report, cfg);

    if let Some(path) = &cfg.report {
        write_report(path, &report)?;
    }
    Ok(())
}

fn build_inventory(cfg: &Config) -> Option<HttpInventory> {
    let inventory_cfg = cfg.inventory.as_ref()?;
    match HttpInventory::new(inventory_cfg, cfg.timeouts.inventory) {
        Ok(inventory) => Some(inventory),
        Err(e) => {
            warn!("Ignoring inventory: {e}");
            None
        }
    }
}

fn known_hosts_path(cfg: &Config) -> anyhow::Result<PathBuf> {
    if let Some(path) = &cfg.known_hosts {
        return Ok(path.clone());
    }
    KnownHostsFile::user_default()
        .map(|store| store.path().to_path_buf())
        .context("cannot locate ~/.ssh/known_hosts, pass --known-hosts")
}

/// Cancels the run on the first Ctrl-C; the transfer in flight is abandoned and
/// cleaned up. A second Ctrl-C exits immediately.
fn cancel_on_interrupt() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        let interrupted = || async { tokio::signal::ctrl_c().await.is_ok() };
        if second_interrupt(interrupted, &trigger).await {
            spinner::finish();
            error!("Interrupted twice, exiting");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
    cancel
}

/// Waits for an interrupt, cancels, then waits for another one.
/// Returns `true` when the second interrupt arrives.
async fn second_interrupt<F, Fut>(mut interrupted: F, cancel: &CancellationToken) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    if !interrupted().await {
        return false;
    }
    warn!("Interrupted, stopping after the current step (Ctrl-C again to quit)");
    cancel.cancel();
    interrupted().await
}

fn write_report(path: &Path, report: &CollectionReport) -> anyhow::Result<()> {
    let json: String = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("writing report to {}", path.display()))?;
    print::note(&format!("Report written to {}", path.display()));
    Ok(())
}

fn print_settings(cfg: &Config) {
    if cfg.quiet > 0 {
        return;
    }
    let mut settings: Vec<(&str, String)> = vec![("Primary host", cfg.primary_host.clone())];
    if let Some(inventory) = &cfg.inventory {
        settings.push(("Inventory", inventory.endpoint.clone()));
    }
    settings.push(("Log dir", cfg.remote_dir.clone()));
    settings.push(("Prefixes", cfg.prefixes.join(", ")));
    settings.push(("Destination", cfg.destination.display().to_string()));
    settings.push(("Parallel", cfg.parallelism.to_string()));
    print::settings(&settings);
}

fn collection_ends(report: &CollectionReport, cfg: &Config) {
    if cfg.quiet < 2 {
        print::stage("log collection", cfg.quiet);
        for (idx, host) in report.hosts.iter().enumerate() {
            print::host_tree(idx, &host.host, &format::host_details(host));
            if idx + 1 != report.hosts.len() {
                lsprint!();
            }
        }
    }
    print_summary(report, cfg);
}

fn print_summary(report: &CollectionReport, cfg: &Config) {
    let downloaded: ColoredString = format!("{} files", report.downloaded()).bold().green();
    let failed: ColoredString = format!("{} failed", report.failed()).bold().red();
    let total_time: ColoredString = format!("{:.2}s", report.elapsed_secs).bold().yellow();
    let output: String = format!(
        "{}",
        format!("Collection Complete: {downloaded}, {failed} in {total_time}")
            .color(colors::TEXT_DEFAULT)
    );

    match cfg.quiet {
        0 => print::closing_line(&output),
        _ => print::print(&output),
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
