//! Server runtime prerequisite checks
//!
//! Verifies that the configured runtime (Node.js by default) is
//! installed before the launcher tries to start the server.

use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

use crate::error::{LaunchError, Result};

/// A resolved server runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInfo {
    /// Absolute path of the runtime executable
    pub path: PathBuf,

    /// First line of `<runtime> --version` output
    pub version: String,
}

/// Check that the runtime is installed and responds to `--version`
///
/// # Arguments
///
/// * `runtime` - Executable name to look up on PATH, e.g. `node`
///
/// # Returns
///
/// The resolved path and reported version, or an error describing
/// which part of the check failed
pub fn check_runtime(runtime: &str) -> Result<RuntimeInfo> {
    let path = which::which(runtime).map_err(|_| LaunchError::RuntimeMissing {
        runtime: runtime.to_string(),
    })?;

    debug!("Resolved {} to {}", runtime, path.display());

    let output = Command::new(&path).arg("--version").output().map_err(|e| {
        LaunchError::RuntimeCheckFailed {
            runtime: runtime.to_string(),
            reason: e.to_string(),
        }
    })?;

    if !output.status.success() {
        return Err(LaunchError::RuntimeCheckFailed {
            runtime: runtime.to_string(),
            reason: format!("`{} --version` exited with {}", runtime, output.status),
        });
    }

    let version = String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    Ok(RuntimeInfo { path, version })
}
