//! # Collection Engine
//!
//! Pulls log files from every reachable host of a fleet into one local directory.
//!
//! The pipeline for each host is:
//!
//! 1. [`resolver`]: merge the primary host with the [`inventory`] into a sorted, unique host set.
//! 2. [`liveness`]: skip hosts that do not answer a bounded TCP probe.
//! 3. [`known_hosts`]: drop stale host keys so redeployed machines still authenticate.
//! 4. [`lister`]: list the remote log directory and keep files matching the prefixes.
//! 5. [`downloader`]: copy each file under a host-qualified local name.
//!
//! [`collector`] drives the pipeline. A failure in any step only ends the affected
//! file or host; the run itself fails only when the destination directory is unusable.
//!
//! The remote side is reached through [`ssh::OpenSsh`], or any other
//! [`RemoteShell`](logsweep_common::shell::RemoteShell) implementation.

pub mod collector;
mod deadline;
pub mod downloader;
pub mod inventory;
pub mod known_hosts;
pub mod lister;
pub mod liveness;
pub mod resolver;
pub mod ssh;
