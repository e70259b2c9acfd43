//! The launch command
//!
//! Runs the whole lifecycle in order: prerequisite check, dependency
//! install, port reclamation, server spawn, startup confirmation,
//! browser handoff, and teardown once the user or the server is done.

use colored::Colorize;
use std::process::ExitStatus;
use tracing::debug;
use vaultup_core::config::toml_config::load_or_default;
use vaultup_core::config::LaunchConfig;
use vaultup_core::error::LaunchError;
use vaultup_core::server::browser::UrlOpener;
use vaultup_core::server::deps::{self, DependencyStatus};
use vaultup_core::server::port::{self, PortStatus};
use vaultup_core::server::runtime;
use vaultup_core::server::{self, ServerSupervisor, ShutdownOutcome};

const NODE_INSTALL_HINT: &str = "Please install Node.js from https://nodejs.org/";

/// How the supervised phase of a launch ended
enum LaunchOutcome {
    /// The server exited by itself
    ServerExited(ExitStatus),

    /// The user interrupted the launcher
    Interrupted,
}

/// Run the launch command
pub async fn run_launch() -> Result<(), LaunchError> {
    print_banner();

    let config = load_or_default()?;
    let app_root = config.resolve_app_root()?;
    debug!("Launching from app root {}", app_root.display());

    // The server cannot run without its runtime, so check that first
    match runtime::check_runtime(&config.runtime) {
        Ok(info) => println!(
            "{} {} found: {}",
            ok_tag(),
            runtime_display(&config.runtime),
            info.version
        ),
        Err(e) => {
            if config.runtime == "node" {
                println!("{}", NODE_INSTALL_HINT.yellow());
            }
            return Err(e);
        }
    }

    if let Some(manifest) = deps::read_manifest(&app_root) {
        if let Some(name) = manifest.name {
            match manifest.version {
                Some(version) => println!("{}", format!("Launching {} v{}", name, version).blue()),
                None => println!("{}", format!("Launching {}", name).blue()),
            }
        }
    }

    // Dependencies are best-effort: a failed install is the server's
    // problem to report, not a reason to refuse the launch
    if !deps::dependencies_present(&app_root) {
        println!("{}", "Installing dependencies...".yellow());
        match deps::ensure_dependencies(&app_root, &config.install_command) {
            DependencyStatus::Installed => println!("{} Dependencies installed", ok_tag()),
            DependencyStatus::InstallFailed => {
                println!(
                    "{} Dependency install failed, the server may not start",
                    warn_tag()
                )
            }
            DependencyStatus::Present => {}
        }
    }

    match port::ensure_port_free(&config.host, config.port, config.reclaim_delay()).await? {
        PortStatus::Free => {}
        PortStatus::Reclaimed => {
            println!("{} Port {} was already in use", warn_tag(), config.port);
            println!("{} Cleared port {}", ok_tag(), config.port);
        }
    }

    println!("{}", "Starting The Vault server...".blue());

    // Arm the signal listener before entering the supervised phase so
    // an interrupt at any point still reaches the teardown below
    let shutdown = server::shutdown_signal();
    tokio::pin!(shutdown);

    let mut supervisor = ServerSupervisor::spawn(&config, &app_root)?;
    let opener = server::opener_from_config(&config);

    let result = tokio::select! {
        launch = drive(&mut supervisor, &config, opener.as_ref()) => launch,
        _ = &mut shutdown => {
            println!();
            Ok(LaunchOutcome::Interrupted)
        }
    };

    // Teardown runs unconditionally; the supervisor makes it a no-op
    // when the server is already gone
    if supervisor.state().is_running() {
        println!("{}", "Shutting down vault server...".yellow());
    }
    match supervisor.shutdown().await {
        ShutdownOutcome::Graceful(_) | ShutdownOutcome::AlreadyExited(_) => {
            println!("{} Server stopped", ok_tag())
        }
        ShutdownOutcome::Forced => {
            println!("{} Server did not stop in time and was killed", warn_tag());
            println!("{} Server stopped", ok_tag());
        }
        ShutdownOutcome::NotRunning => {}
    }

    match result? {
        LaunchOutcome::ServerExited(status) => {
            println!("{} Server exited on its own ({})", warn_tag(), status);
            Ok(())
        }
        LaunchOutcome::Interrupted => Ok(()),
    }
}

/// The supervised phase: confirm startup, hand off to the browser,
/// then block until the server exits
async fn drive(
    supervisor: &mut ServerSupervisor,
    config: &LaunchConfig,
    opener: &dyn UrlOpener,
) -> Result<LaunchOutcome, LaunchError> {
    supervisor.confirm_started().await?;

    println!("{} Server is running!", ok_tag());
    let url = config.url();
    println!("{}", format!("The Vault is ready at: {}", url).blue());

    if config.open_browser {
        println!("{}", "Opening in browser...".yellow());
        supervisor.notify_browser(opener, &url).await;
    }

    println!();
    println!("{}", "=".repeat(50).green());
    println!("{}", "The Vault is now running!".yellow());
    println!("{}", "Press Ctrl+C to stop the server".blue());
    println!("{}", "=".repeat(50).green());
    println!();

    let status = supervisor.wait().await?;
    Ok(LaunchOutcome::ServerExited(status))
}

fn print_banner() {
    println!("{}", "=".repeat(50).blue());
    println!("{}", "THE VAULT - YouTube Music Player".yellow().bold());
    println!("{}", "=".repeat(50).blue());
    println!();
}

fn ok_tag() -> colored::ColoredString {
    "[OK]".green()
}

fn warn_tag() -> colored::ColoredString {
    "[WARN]".yellow()
}

fn runtime_display(runtime: &str) -> &str {
    if runtime == "node" {
        "Node.js"
    } else {
        runtime
    }
}
