//! Server port probing and reclamation
//!
//! Before the server starts, its port must be free. A stale instance
//! from an earlier run is stopped with the platform's port-kill
//! command, then the port is probed again to confirm it was released.

use std::net::{TcpStream, ToSocketAddrs};
use std::process::Command;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{LaunchError, Result};

/// Timeout for a single TCP connect probe
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Outcome of [`ensure_port_free`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortStatus {
    /// The port was already free
    Free,

    /// The port was occupied and its owner was stopped
    Reclaimed,
}

/// Check whether something is listening on `host:port`
///
/// Probes by connecting and immediately closing. Resolution failures
/// count as "not in use" since the server could not be reached either.
pub fn port_in_use(host: &str, port: u16) -> bool {
    let Ok(addrs) = (host, port).to_socket_addrs() else {
        return false;
    };

    addrs
        .into_iter()
        .any(|addr| TcpStream::connect_timeout(&addr, PROBE_TIMEOUT).is_ok())
}

/// Build the platform's command for killing whatever owns a port
fn reclaim_command(port: u16) -> (&'static str, Vec<String>) {
    if cfg!(target_os = "macos") {
        (
            "sh",
            vec!["-c".to_string(), format!("lsof -ti:{} | xargs kill -9", port)],
        )
    } else {
        ("fuser", vec!["-k".to_string(), format!("{}/tcp", port)])
    }
}

/// Stop whatever process currently owns the port
///
/// The kill is blind: the owner is not identified first, matching the
/// assumption that the only thing on this port is a stale server.
fn reclaim_port(port: u16) -> std::io::Result<()> {
    let (program, args) = reclaim_command(port);
    let output = Command::new(program).args(&args).output()?;
    debug!("Port reclaim command exited with {}", output.status);
    Ok(())
}

/// Make sure `host:port` is free, reclaiming it if needed
///
/// A free port returns immediately. An occupied port triggers the
/// platform kill command, a settle delay, and a second probe; if the
/// port is still occupied after that, the launch cannot proceed.
pub async fn ensure_port_free(host: &str, port: u16, settle: Duration) -> Result<PortStatus> {
    if !port_in_use(host, port) {
        return Ok(PortStatus::Free);
    }

    warn!("Port {} is already in use, stopping the existing process", port);

    if let Err(e) = reclaim_port(port) {
        warn!("Port reclaim command failed to run: {}", e);
    }

    // Give the OS a moment to release the socket
    sleep(settle).await;

    if port_in_use(host, port) {
        return Err(LaunchError::PortUnavailable { port });
    }

    Ok(PortStatus::Reclaimed)
}
