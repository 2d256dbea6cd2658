use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures of the host inventory. Never fatal to a collection run.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("inventory unreachable: {0}")]
    Network(String),
    #[error("inventory did not answer within {0:?}")]
    Timeout(Duration),
    #[error("inventory rejected credentials (HTTP {0})")]
    Auth(u16),
    #[error("inventory error (HTTP {status}): {message}")]
    Service { status: u16, message: String },
    #[error("malformed inventory response: {0}")]
    Decode(String),
    #[error("invalid inventory configuration: {0}")]
    Config(String),
}

/// Failures of a remote-shell session or one of its commands.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("cannot open session to {host}: {reason}")]
    Connect { host: String, reason: String },
    #[error("`{command}` exited with {status:?}: {stderr}")]
    Command {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
    #[error("{what} timed out after {after:?}")]
    Timeout { what: String, after: Duration },
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum TrustStoreError {
    #[error("cannot update trust store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("trust store lock poisoned")]
    Poisoned,
}

/// Preconditions that abort a run before any host is touched.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("cannot create destination directory {path}: {source}")]
    Destination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("destination {0} is not a writable directory")]
    NotWritable(PathBuf),
}
