//! Server dependency materialization
//!
//! Checks for an installed `node_modules` tree and runs the configured
//! install command when it is missing. Installation is best-effort: a
//! failed install is reported but never blocks the launch, since the
//! server itself is the authority on whether it can run.

use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Outcome of [`ensure_dependencies`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyStatus {
    /// Dependencies were already installed
    Present,

    /// The install command ran and succeeded
    Installed,

    /// The install command failed or could not be run
    InstallFailed,
}

/// Subset of the app's `package.json` the launcher cares about
#[derive(Debug, Clone, Deserialize)]
pub struct AppManifest {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// Check whether the app's dependencies are already installed
pub fn dependencies_present(app_root: &Path) -> bool {
    app_root.join("node_modules").is_dir()
}

/// Install the app's dependencies if they are missing
///
/// Runs `install_command` in `app_root` and blocks until it finishes.
/// Failures are logged and reported in the return value only.
pub fn ensure_dependencies(app_root: &Path, install_command: &[String]) -> DependencyStatus {
    if dependencies_present(app_root) {
        return DependencyStatus::Present;
    }

    let Some((program, args)) = install_command.split_first() else {
        warn!("Install command is empty, skipping dependency install");
        return DependencyStatus::InstallFailed;
    };

    debug!(
        "Installing dependencies with `{}` in {}",
        install_command.join(" "),
        app_root.display()
    );

    match Command::new(program).args(args).current_dir(app_root).status() {
        Ok(status) if status.success() => DependencyStatus::Installed,
        Ok(status) => {
            warn!("Dependency install exited with {}, continuing anyway", status);
            DependencyStatus::InstallFailed
        }
        Err(e) => {
            warn!("Could not run the dependency install command: {}", e);
            DependencyStatus::InstallFailed
        }
    }
}

/// Read the app's `package.json`, if there is a readable one
pub fn read_manifest(app_root: &Path) -> Option<AppManifest> {
    let raw = std::fs::read_to_string(app_root.join("package.json")).ok()?;

    match serde_json::from_str(&raw) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            debug!("Ignoring unreadable package.json: {}", e);
            None
        }
    }
}
