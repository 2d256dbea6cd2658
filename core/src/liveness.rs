use std::time::Duration;

use async_trait::async_trait;
use logsweep_common::liveness::LivenessProbe;
use logsweep_common::models::host::Host;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Treats a host as up when a TCP handshake on `port` completes within `timeout`.
///
/// Refused connections count as down: the host may be alive, but there is no
/// remote shell to collect from.
pub struct TcpProbe {
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }
}

#[async_trait]
impl LivenessProbe for TcpProbe {
    async fn is_up(&self, host: &Host) -> bool {
        match timeout(self.timeout, TcpStream::connect((host.address(), self.port))).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                debug!("{host}:{} refused probe: {e}", self.port);
                false
            }
            Err(_elapsed) => {
                debug!("{host}:{} did not answer within {:?}", self.port, self.timeout);
                false
            }
        }
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
