use std::collections::BTreeSet;

use logsweep_common::inventory::Inventory;
use logsweep_common::models::host::Host;
use tracing::{debug, info, warn};

/// Builds the host set for a run from the primary host and, when available, the inventory.
///
/// An inventory failure is logged and the run continues with the hosts already known.
pub async fn resolve(primary: &str, inventory: Option<&dyn Inventory>) -> Vec<Host> {
    let mut addresses: Vec<Option<String>> = vec![Some(primary.to_string())];

    if let Some(inventory) = inventory {
        match inventory.hosts().await {
            Ok(records) => {
                debug!("Inventory returned {} host record(s)", records.len());
                addresses.extend(records.into_iter().map(|record| record.address));
            }
            Err(e) => warn!("Failed to list hosts from inventory: {e}"),
        }
    }

    let hosts: Vec<Host> = resolve_addresses(addresses);
    let listed: Vec<&str> = hosts.iter().map(Host::address).collect();
    info!("Downloading logs from {listed:?}");
    hosts
}

/// Drops missing and blank addresses, trims, deduplicates and sorts lexicographically.
pub fn resolve_addresses<I, S>(addresses: I) -> Vec<Host>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    addresses
        .into_iter()
        .flatten()
        .filter_map(|address| Host::parse(address.as_ref()))
        .collect::<BTreeSet<Host>>()
        .into_iter()
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
