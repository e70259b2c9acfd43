//! Server process supervision
//!
//! Manages the server process lifecycle from spawn to termination:
//! startup confirmation after a grace period, the one-shot browser
//! notification, blocking on the child, and idempotent teardown.

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::path::Path;
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::config::LaunchConfig;
use crate::error::{LaunchError, Result};
use crate::server::browser::UrlOpener;
use crate::server::state::ServerState;

/// Outcome of a [`ServerSupervisor::shutdown`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The server exited within the graceful shutdown window
    Graceful(ExitStatus),

    /// The server ignored SIGTERM and was force-killed
    Forced,

    /// The server had already exited before teardown began
    AlreadyExited(ExitStatus),

    /// There was no server process to tear down
    NotRunning,
}

/// Supervises a single server process
///
/// The supervisor owns the child process handle. Teardown can be
/// invoked any number of times from any state; only the first call
/// with a live child does any work.
#[derive(Debug)]
pub struct ServerSupervisor {
    /// Handle to the running server, until it is reaped
    child: Option<Child>,

    /// PID recorded at spawn time, for signalling and diagnostics
    pid: Option<u32>,

    /// Where the process is in its lifecycle
    state: ServerState,

    /// How long to wait before declaring startup successful
    grace_period: Duration,

    /// How long to wait for SIGTERM to work before SIGKILL
    shutdown_timeout: Duration,

    /// Pause between startup confirmation and the browser opening
    browser_delay: Duration,

    /// Whether the browser notification has already fired
    browser_notified: bool,
}

impl ServerSupervisor {
    /// Spawn the server process in `app_root`
    ///
    /// The child runs `<runtime> <server_args..>` with the configured
    /// port exported as `PORT`, inheriting the launcher's stdio so
    /// server logs land on the user's console. The handle is armed
    /// with kill-on-drop so the server cannot outlive a launcher that
    /// dies without running teardown.
    pub fn spawn(config: &LaunchConfig, app_root: &Path) -> Result<Self> {
        let mut cmd = Command::new(&config.runtime);
        cmd.args(&config.server_args)
            .current_dir(app_root)
            .env("PORT", config.port.to_string())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| LaunchError::SpawnFailed {
            reason: format!(
                "failed to run `{} {}`: {}",
                config.runtime,
                config.server_args.join(" "),
                e
            ),
        })?;

        let pid = child.id();
        info!("Spawned server process with PID {:?}", pid);

        Ok(Self {
            child: Some(child),
            pid,
            state: ServerState::Spawning,
            grace_period: config.grace_period(),
            shutdown_timeout: config.shutdown_timeout(),
            browser_delay: config.browser_delay(),
            browser_notified: false,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> ServerState {
        self.state
    }

    /// PID recorded when the process was spawned
    pub fn id(&self) -> Option<u32> {
        self.pid
    }

    /// Wait out the grace period and confirm the server survived it
    ///
    /// A child that is still alive after the grace period is considered
    /// started. One that already exited almost certainly crashed during
    /// boot, so its exit status is turned into an error.
    pub async fn confirm_started(&mut self) -> Result<()> {
        sleep(self.grace_period).await;

        let Some(child) = self.child.as_mut() else {
            return Err(LaunchError::StartupFailed {
                status: "process handle already gone".to_string(),
            });
        };

        match child.try_wait()? {
            Some(status) => {
                // try_wait reaped the child, the handle is useless now
                self.child = None;
                self.state = ServerState::Exited;
                warn!("Server process exited during the grace period: {}", status);
                Err(LaunchError::StartupFailed {
                    status: status.to_string(),
                })
            }
            None => {
                self.state = ServerState::Running;
                debug!("Server survived the {:?} grace period", self.grace_period);
                Ok(())
            }
        }
    }

    /// Open the player URL once the server is confirmed running
    ///
    /// Waits the configured delay so the server has a beat to finish
    /// binding, then hands the URL to the opener. Fires at most once
    /// per supervisor and never before startup confirmation; failures
    /// are logged and swallowed, since the user can still open the URL
    /// by hand. Returns whether an attempt was made.
    pub async fn notify_browser(&mut self, opener: &dyn UrlOpener, url: &str) -> bool {
        if self.state != ServerState::Running || self.browser_notified {
            return false;
        }
        self.browser_notified = true;

        sleep(self.browser_delay).await;

        match opener.open_url(url) {
            Ok(()) => debug!("Opened {} in the default browser", url),
            Err(e) => warn!("Could not open {} in a browser: {}", url, e),
        }

        true
    }

    /// Block until the server exits on its own
    pub async fn wait(&mut self) -> Result<ExitStatus> {
        let Some(child) = self.child.as_mut() else {
            return Err(LaunchError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "server process is not running",
            )));
        };

        let status = child.wait().await?;
        self.child = None;
        self.state = ServerState::Exited;
        info!("Server process exited with {}", status);

        Ok(status)
    }

    /// Tear the server down: SIGTERM, bounded wait, then SIGKILL
    ///
    /// Safe to call repeatedly and from any state. A child that
    /// already exited is reaped without being signalled. SIGKILL is
    /// only sent when the graceful window elapses, and the child is
    /// always reaped before this returns.
    pub async fn shutdown(&mut self) -> ShutdownOutcome {
        let Some(mut child) = self.child.take() else {
            return ShutdownOutcome::NotRunning;
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                self.state = ServerState::Exited;
                debug!("Server already exited with {}, nothing to tear down", status);
                return ShutdownOutcome::AlreadyExited(status);
            }
            Ok(None) => {}
            Err(e) => warn!("Could not poll the server process: {}", e),
        }

        if let Some(raw) = child.id() {
            let pid = Pid::from_raw(raw as i32);
            info!("Sending SIGTERM to server process {}", pid);
            match kill(pid, Signal::SIGTERM) {
                Ok(()) => {}
                // Died between the poll above and the signal
                Err(Errno::ESRCH) => debug!("Server process {} is already gone", pid),
                Err(e) => warn!("Failed to send SIGTERM: {}", e),
            }
        }

        match timeout(self.shutdown_timeout, child.wait()).await {
            Ok(Ok(status)) => {
                self.state = ServerState::Terminated;
                info!("Server terminated gracefully with {}", status);
                ShutdownOutcome::Graceful(status)
            }
            Ok(Err(e)) => {
                warn!("Waiting on the server process failed: {}", e);
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill the server process: {}", e);
                }
                self.state = ServerState::Terminated;
                ShutdownOutcome::Forced
            }
            Err(_) => {
                warn!(
                    "Server did not exit within {:?}, sending SIGKILL",
                    self.shutdown_timeout
                );
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill the server process: {}", e);
                }
                self.state = ServerState::Terminated;
                ShutdownOutcome::Forced
            }
        }
    }
}

/// Build the interrupt listener, armed as soon as this is called
///
/// Resolves on Ctrl+C (SIGINT) or SIGTERM, so the caller can run
/// teardown no matter how the launcher is asked to stop. The handlers
/// are installed here rather than on first poll; a signal arriving
/// while the server is still being spawned is latched, not lost.
#[cfg(unix)]
pub fn shutdown_signal() -> impl std::future::Future<Output = ()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt =
        signal(SignalKind::interrupt()).expect("failed to install the SIGINT handler");
    let mut terminate =
        signal(SignalKind::terminate()).expect("failed to install the SIGTERM handler");

    async move {
        tokio::select! {
            _ = interrupt.recv() => {},
            _ = terminate.recv() => {},
        }
    }
}

/// Build the interrupt listener, armed on first poll
#[cfg(not(unix))]
pub fn shutdown_signal() -> impl std::future::Future<Output = ()> {
    async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install the Ctrl+C handler");
    }
}
