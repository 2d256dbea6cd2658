#![cfg(test)]
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use logsweep_common::error::CollectError;
use logsweep_common::liveness::LivenessProbe;
use logsweep_common::models::outcome::FailureReason;
use logsweep_common::models::report::{CollectionReport, HostStatus};
use logsweep_common::models::run::CollectionRun;
use logsweep_core::collector::Collector;
use logsweep_common::trust::TrustStore;
use logsweep_core::resolver;
use tokio_util::sync::CancellationToken;

use crate::support::{
    BrokenTrustStore, FailingInventory, FileScript, FixedInventory, HostScript, MemoryTrustStore,
    ScriptedProbe, ScriptedShell, StalledProbe, credential, hosts, prefixes, timeouts,
};

fn collector(shell: &ScriptedShell, probe: Arc<ScriptedProbe>, trust: Arc<MemoryTrustStore>) -> Collector {
    collector_with(shell, probe, trust)
}

fn collector_with(
    shell: &ScriptedShell,
    probe: Arc<dyn LivenessProbe>,
    trust: Arc<dyn TrustStore>,
) -> Collector {
    Collector::new(Arc::new(shell.clone()), probe, trust, credential(), timeouts())
}

fn run(addresses: &[&str], destination: &Path) -> CollectionRun {
    CollectionRun {
        hosts: hosts(addresses),
        remote_dir: "/var/log".to_string(),
        prefixes: prefixes(&["hostd", "vmk"]),
        destination: destination.to_path_buf(),
    }
}

fn local_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn fleet_host(address: &str) -> (&str, HostScript) {
    (
        address,
        HostScript::listing("hostd.log vmk.log")
            .content("hostd.log", &format!("hostd of {address}"))
            .content("vmk.log", &format!("vmk of {address}")),
    )
}

/*************************************************************
                    End-to-end scenario
**************************************************************/

#[tokio::test]
async fn collects_prefixed_logs_from_primary_host() {
    let dest = tempfile::tempdir().unwrap();
    let shell = ScriptedShell::new(vec![(
        "10.0.0.5",
        HostScript::listing("hostd.log vmk.0.log other.log")
            .content("hostd.log", "hostd")
            .content("vmk.0.log", "vmk")
            .content("other.log", "other"),
    )]);

    let resolved = resolver::resolve("10.0.0.5", None).await;
    let mut collection_run = run(&[], dest.path());
    collection_run.hosts = resolved;

    let report = collector(&shell, Arc::new(ScriptedProbe::all_up()), Arc::default())
        .collect(&collection_run, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        local_files(dest.path()),
        vec!["hostd-10.0.0.5.log", "vmk.0-10.0.0.5.log"]
    );
    assert_eq!(report.downloaded(), 2);
    assert_eq!(report.failed(), 0);

    let host = report.host("10.0.0.5").unwrap();
    assert_eq!(host.status, HostStatus::Collected);
    assert_eq!(host.files_listed, 2);
    assert!(host.outcomes.iter().all(|o| o.is_success()));
    assert_eq!(host.outcomes[0].remote_path, "/var/log/hostd.log");
    assert!(!shell.journal().iter().any(|e| e.contains("other.log")));
}

#[tokio::test]
async fn listing_precedes_downloads_for_each_host() {
    let dest = tempfile::tempdir().unwrap();
    let shell = ScriptedShell::new(vec![fleet_host("esx-a")]);

    collector(&shell, Arc::new(ScriptedProbe::all_up()), Arc::default())
        .collect(&run(&["esx-a"], dest.path()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        shell.events_for("esx-a"),
        vec![
            "connect",
            "run ls '/var/log'",
            "connect",
            "transfer /var/log/hostd.log",
            "connect",
            "transfer /var/log/vmk.log",
        ]
    );
}

/*************************************************************
                         Isolation
**************************************************************/

fn assert_collected(report: &CollectionReport, address: &str) {
    let host = report.host(address).unwrap();
    assert_eq!(host.status, HostStatus::Collected, "{address}");
    assert_eq!(host.downloaded(), 2, "{address}");
}

#[tokio::test]
async fn unreachable_host_is_skipped_without_contact() {
    let dest = tempfile::tempdir().unwrap();
    let shell = ScriptedShell::new(vec![fleet_host("A"), fleet_host("B"), fleet_host("C")]);
    let probe = Arc::new(ScriptedProbe::down(&["B"]));

    let report = collector(&shell, probe.clone(), Arc::default())
        .collect(&run(&["A", "B", "C"], dest.path()), &CancellationToken::new())
        .await
        .unwrap();

    assert_collected(&report, "A");
    assert_collected(&report, "C");
    assert!(matches!(report.host("B").unwrap().status, HostStatus::Skipped(_)));
    assert!(shell.events_for("B").is_empty());
    assert_eq!(probe.probed(), vec!["A", "B", "C"]);
    assert_eq!(report.skipped_hosts(), 1);
}

#[tokio::test]
async fn listing_failure_only_affects_that_host() {
    let dest = tempfile::tempdir().unwrap();
    let shell = ScriptedShell::new(vec![
        fleet_host("A"),
        ("B", HostScript::listing_fails("ls: cannot access '/var/log': Permission denied")),
        fleet_host("C"),
    ]);

    let report = collector(&shell, Arc::new(ScriptedProbe::all_up()), Arc::default())
        .collect(&run(&["A", "B", "C"], dest.path()), &CancellationToken::new())
        .await
        .unwrap();

    assert_collected(&report, "A");
    assert_collected(&report, "C");
    let b = report.host("B").unwrap();
    assert!(matches!(&b.status, HostStatus::ListingFailed(reason) if reason.contains("Permission denied")));
    assert!(b.outcomes.is_empty());
    assert_eq!(report.downloaded(), 4);
}

#[tokio::test]
async fn refused_session_only_affects_that_host() {
    let dest = tempfile::tempdir().unwrap();
    let shell = ScriptedShell::new(vec![fleet_host("A"), ("B", HostScript::refusing()), fleet_host("C")]);

    let report = collector(&shell, Arc::new(ScriptedProbe::all_up()), Arc::default())
        .collect(&run(&["A", "B", "C"], dest.path()), &CancellationToken::new())
        .await
        .unwrap();

    assert_collected(&report, "A");
    assert_collected(&report, "C");
    assert!(matches!(report.host("B").unwrap().status, HostStatus::ListingFailed(_)));
    assert_eq!(shell.events_for("B"), vec!["connect"]);
}

#[tokio::test]
async fn parallel_collection_keeps_order_and_isolation() {
    let dest = tempfile::tempdir().unwrap();
    let shell = ScriptedShell::new(vec![
        fleet_host("A"),
        ("B", HostScript::refusing()),
        fleet_host("C"),
        fleet_host("D"),
    ]);

    let report = collector(&shell, Arc::new(ScriptedProbe::down(&["D"])), Arc::default())
        .with_parallelism(3)
        .collect(&run(&["A", "B", "C", "D"], dest.path()), &CancellationToken::new())
        .await
        .unwrap();

    let order: Vec<&str> = report.hosts.iter().map(|h| h.host.address()).collect();
    assert_eq!(order, vec!["A", "B", "C", "D"]);
    assert_collected(&report, "A");
    assert_collected(&report, "C");
    assert_eq!(local_files(dest.path()).len(), 4);
}

/*************************************************************
                     Per-file failures
**************************************************************/

#[tokio::test]
async fn vanished_file_is_a_soft_failure() {
    let dest = tempfile::tempdir().unwrap();
    let shell = ScriptedShell::new(vec![(
        "esx-a",
        HostScript::listing("hostd.log vmk.log")
            .file("hostd.log", FileScript::Missing)
            .content("vmk.log", "vmk"),
    )]);

    let report = collector(&shell, Arc::new(ScriptedProbe::all_up()), Arc::default())
        .collect(&run(&["esx-a"], dest.path()), &CancellationToken::new())
        .await
        .unwrap();

    let host = report.host("esx-a").unwrap();
    assert_eq!(host.status, HostStatus::Collected);
    assert_eq!(host.outcomes[0].failure(), Some(&FailureReason::Missing));
    assert!(host.outcomes[1].is_success());
    assert_eq!(local_files(dest.path()), vec!["vmk-esx-a.log"]);
}

#[tokio::test]
async fn broken_transfer_leaves_no_partial_file() {
    let dest = tempfile::tempdir().unwrap();
    let shell = ScriptedShell::new(vec![
        (
            "esx-a",
            HostScript::listing("hostd.log vmk.log")
                .file("hostd.log", FileScript::Broken("Connection reset by peer".into()))
                .content("vmk.log", "vmk"),
        ),
        fleet_host("esx-b"),
    ]);

    let report = collector(&shell, Arc::new(ScriptedProbe::all_up()), Arc::default())
        .collect(&run(&["esx-a", "esx-b"], dest.path()), &CancellationToken::new())
        .await
        .unwrap();

    let host = report.host("esx-a").unwrap();
    assert!(matches!(
        host.outcomes[0].failure(),
        Some(FailureReason::Transfer(msg)) if msg.contains("Connection reset")
    ));
    assert!(!dest.path().join("hostd-esx-a.log").exists());
    assert!(dest.path().join("vmk-esx-a.log").exists());
    assert_collected(&report, "esx-b");
    assert_eq!(report.failed(), 1);
}

#[tokio::test]
async fn same_name_from_two_hosts_coexists() {
    let dest = tempfile::tempdir().unwrap();
    let shell = ScriptedShell::new(vec![
        ("10.0.0.5", HostScript::listing("hostd.log").content("hostd.log", "five")),
        ("10.0.0.6", HostScript::listing("hostd.log").content("hostd.log", "six")),
    ]);

    collector(&shell, Arc::new(ScriptedProbe::all_up()), Arc::default())
        .collect(&run(&["10.0.0.5", "10.0.0.6"], dest.path()), &CancellationToken::new())
        .await
        .unwrap();

    let five = std::fs::read_to_string(dest.path().join("hostd-10.0.0.5.log")).unwrap();
    let six = std::fs::read_to_string(dest.path().join("hostd-10.0.0.6.log")).unwrap();
    assert_eq!(five, "five");
    assert_eq!(six, "six");
}

/*************************************************************
              Inventory, trust store, preconditions
**************************************************************/

#[tokio::test]
async fn inventory_failure_still_collects_primary() {
    let dest = tempfile::tempdir().unwrap();
    let shell = ScriptedShell::new(vec![fleet_host("10.0.0.5")]);

    let resolved = resolver::resolve("10.0.0.5", Some(&FailingInventory)).await;
    let mut collection_run = run(&[], dest.path());
    collection_run.hosts = resolved;

    let report = collector(&shell, Arc::new(ScriptedProbe::all_up()), Arc::default())
        .collect(&collection_run, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.hosts.len(), 1);
    assert_collected(&report, "10.0.0.5");
}

#[tokio::test]
async fn inventory_hosts_are_collected_in_sorted_order() {
    let dest = tempfile::tempdir().unwrap();
    let shell = ScriptedShell::new(vec![fleet_host("esx-a"), fleet_host("esx-b"), fleet_host("10.0.0.5")]);
    let inventory = FixedInventory::of(&["esx-b", "", "esx-a", "esx-b", "10.0.0.5"]);

    let resolved = resolver::resolve("10.0.0.5", Some(&inventory)).await;
    let mut collection_run = run(&[], dest.path());
    collection_run.hosts = resolved;

    let probe = Arc::new(ScriptedProbe::all_up());
    let report = collector(&shell, probe.clone(), Arc::default())
        .collect(&collection_run, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(probe.probed(), vec!["10.0.0.5", "esx-a", "esx-b"]);
    assert_eq!(report.downloaded(), 6);
}

#[tokio::test]
async fn stale_host_keys_are_removed_for_live_hosts_only() {
    let dest = tempfile::tempdir().unwrap();
    let shell = ScriptedShell::new(vec![fleet_host("A"), fleet_host("B")]);
    let trust = Arc::new(MemoryTrustStore::with_records(&[
        ("A", "ssh-ed25519 AAAA1"),
        ("B", "ssh-ed25519 AAAA2"),
        ("Z", "ssh-ed25519 AAAA3"),
    ]));

    collector(&shell, Arc::new(ScriptedProbe::down(&["B"])), trust.clone())
        .collect(&run(&["A", "B"], dest.path()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(trust.addresses(), vec!["B", "Z"]);
}

#[tokio::test]
async fn unwritable_known_hosts_does_not_stop_collection() {
    let dest = tempfile::tempdir().unwrap();
    let shell = ScriptedShell::new(vec![fleet_host("A")]);
    let trust = Arc::new(BrokenTrustStore::default());

    let report = collector_with(&shell, Arc::new(ScriptedProbe::all_up()), trust.clone())
        .collect(&run(&["A"], dest.path()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(trust.attempts(), vec!["A"]);
    assert_collected(&report, "A");
    assert_eq!(shell.events_for("A")[1], "run ls '/var/log'");
    assert_eq!(local_files(dest.path()), vec!["hostd-A.log", "vmk-A.log"]);
}

#[tokio::test]
async fn stalled_liveness_check_is_bounded() {
    let dest = tempfile::tempdir().unwrap();
    let shell = ScriptedShell::new(vec![fleet_host("A"), fleet_host("B")]);
    let started = Instant::now();

    let probe = Arc::new(StalledProbe::on(&["A"]));
    let report = collector_with(&shell, probe, Arc::new(MemoryTrustStore::default()))
        .collect(&run(&["A", "B"], dest.path()), &CancellationToken::new())
        .await
        .unwrap();

    assert!(started.elapsed() < timeouts().probe * 5);
    assert!(matches!(report.hosts[0].status, HostStatus::Skipped(_)));
    assert!(shell.events_for("A").is_empty());
    assert_collected(&report, "B");
}

#[tokio::test]
async fn unusable_destination_fails_before_any_host() {
    let dir = tempfile::tempdir().unwrap();
    let occupied = dir.path().join("occupied");
    std::fs::write(&occupied, b"x").unwrap();

    let shell = ScriptedShell::new(vec![fleet_host("A")]);
    let probe = Arc::new(ScriptedProbe::all_up());

    let err = collector(&shell, probe.clone(), Arc::default())
        .collect(&run(&["A"], &occupied.join("log")), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CollectError::Destination { .. }));
    assert!(probe.probed().is_empty());
    assert!(shell.journal().is_empty());
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn unwritable_destination_fails_before_any_host() {
    let shell = ScriptedShell::new(vec![fleet_host("A")]);
    let probe = Arc::new(ScriptedProbe::all_up());

    // procfs refuses new regular files regardless of uid
    let err = collector(&shell, probe.clone(), Arc::default())
        .collect(&run(&["A"], Path::new("/proc")), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CollectError::NotWritable(_)));
    assert!(probe.probed().is_empty());
    assert!(shell.journal().is_empty());
}

/*************************************************************
                 Cancellation and progress
**************************************************************/

#[tokio::test]
async fn cancelled_run_starts_no_host() {
    let dest = tempfile::tempdir().unwrap();
    let shell = ScriptedShell::new(vec![fleet_host("A"), fleet_host("B")]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = collector(&shell, Arc::new(ScriptedProbe::all_up()), Arc::default())
        .collect(&run(&["A", "B"], dest.path()), &cancel)
        .await
        .unwrap();

    assert!(report.hosts.iter().all(|h| h.status == HostStatus::Cancelled));
    assert!(shell.journal().is_empty());
}

#[tokio::test]
async fn cancellation_abandons_in_flight_transfer() {
    let dest = tempfile::tempdir().unwrap();
    let shell = ScriptedShell::new(vec![
        (
            "A",
            HostScript::listing("hostd.log vmk.log")
                .file("hostd.log", FileScript::Hang)
                .content("vmk.log", "vmk"),
        ),
        fleet_host("B"),
    ]);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let report = collector(&shell, Arc::new(ScriptedProbe::all_up()), Arc::default())
        .collect(&run(&["A", "B"], dest.path()), &cancel)
        .await
        .unwrap();

    let a = report.host("A").unwrap();
    assert_eq!(a.status, HostStatus::Cancelled);
    assert_eq!(a.outcomes.len(), 1);
    assert_eq!(a.outcomes[0].failure(), Some(&FailureReason::Cancelled));
    assert_eq!(report.host("B").unwrap().status, HostStatus::Cancelled);
    assert!(local_files(dest.path()).is_empty());
}

#[tokio::test]
async fn progress_reports_every_host() {
    let dest = tempfile::tempdir().unwrap();
    let shell = ScriptedShell::new(vec![fleet_host("A"), fleet_host("C")]);
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();

    collector(&shell, Arc::new(ScriptedProbe::down(&["B"])), Arc::default())
        .on_host_done(move |done, total| {
            assert_eq!(total, 3);
            assert!(done <= total);
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .collect(&run(&["A", "B", "C"], dest.path()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
}
