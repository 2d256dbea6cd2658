use colored::*;
use logsweep_common::config::Timeouts;
use logsweep_common::inventory::Inventory;
use logsweep_common::liveness::LivenessProbe;
use logsweep_common::models::host::Host;
use logsweep_core::inventory::HttpInventory;
use logsweep_core::liveness::TcpProbe;
use logsweep_core::resolver;
use tracing::warn;

use crate::commands::TargetArgs;
use crate::terminal::{colors, print};

/// Resolves the host set and probes each host once, without opening any session.
pub async fn hosts(args: &TargetArgs, quiet: u8) -> anyhow::Result<()> {
    let timeouts: Timeouts = args.timeouts();
    let inventory: Option<HttpInventory> = args.inventory().and_then(|cfg| {
        HttpInventory::new(&cfg, timeouts.inventory)
            .map_err(|e| warn!("Ignoring inventory: {e}"))
            .ok()
    });

    let hosts: Vec<Host> =
        resolver::resolve(&args.host, inventory.as_ref().map(|i| i as &dyn Inventory)).await;
    if hosts.is_empty() {
        print::no_hosts();
        return Ok(());
    }

    let probe = TcpProbe::new(args.ssh_port, timeouts.probe);
    let mut reachable: usize = 0;

    print::stage("host set", quiet);
    for (idx, host) in hosts.iter().enumerate() {
        let up: bool = probe.is_up(host).await;
        if up {
            reachable += 1;
        }
        let state: ColoredString = if up {
            "reachable".color(colors::SUCCESS)
        } else {
            "down".color(colors::FAILURE)
        };
        print::host_tree(idx, host, &[(String::from("SSH"), state)]);
    }

    print::closing_line(&format!(
        "{} of {} hosts reachable",
        reachable.to_string().bold().green(),
        hosts.len()
    ));
    Ok(())
}
