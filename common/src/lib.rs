//! # Shared Types
//!
//! Everything the collection engine and its front ends agree on:
//!
//! * **[`models`]**: hosts, credentials, remote files and per-file/per-host results.
//! * **[`config`]**: the explicit configuration value threaded through every component.
//! * **[`error`]**: error types for each external boundary.
//! * **Ports**: [`inventory`], [`liveness`], [`shell`] and [`trust`] define the traits
//!   the engine depends on. Concrete implementations live in `logsweep-core`, fakes live
//!   in the integration test crate.

pub mod config;
pub mod error;
pub mod inventory;
pub mod liveness;
pub mod models;
pub mod shell;
pub mod trust;
