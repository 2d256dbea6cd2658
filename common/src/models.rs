//! # Collection Models
//!
//! * [`host::Host`]: a normalized remote address. The identity of every unit of work.
//! * [`credential::Credential`]: username and optional secret used for every session.
//! * [`log_file::RemoteLogFile`]: a listed file that matched one of the prefixes.
//! * [`outcome::DownloadOutcome`]: what happened to one file.
//! * [`report::HostReport`] / [`report::CollectionReport`]: what happened to each host and the run.
//! * [`run::CollectionRun`]: the scope of a single run.

pub mod credential;
pub mod host;
pub mod log_file;
pub mod outcome;
pub mod report;
pub mod run;
