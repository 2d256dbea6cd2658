use std::future::Future;
use std::time::Duration;

use logsweep_common::error::ShellError;
use tokio::time::timeout;

/// Bounds a remote-shell operation so an unresponsive host cannot stall the run.
pub(crate) async fn within<T, F>(what: &str, after: Duration, fut: F) -> Result<T, ShellError>
where
    F: Future<Output = Result<T, ShellError>>,
{
    match timeout(after, fut).await {
        Ok(result) => result,
        Err(_elapsed) => Err(ShellError::Timeout {
            what: what.to_string(),
            after,
        }),
    }
}
