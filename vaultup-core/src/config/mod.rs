//! Launcher configuration
//!
//! The reference values here describe the stock app: port 8888, a Node.js
//! server started as `node server.js`, dependencies from `npm install`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::{ConfigError, LaunchError};

pub mod toml_config;

/// Launcher configuration structure
///
/// Contains everything the launcher needs to start and supervise the
/// server: where the app lives, how to run it, and how patient to be
/// during startup and shutdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// TCP port the server listens on (default: 8888)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Hostname used for port probing and the browser URL
    #[serde(default = "default_host")]
    pub host: String,

    /// Runtime executable that runs the server (default: node)
    #[serde(default = "default_runtime")]
    pub runtime: String,

    /// Arguments passed to the runtime; the first one is the server entry file
    #[serde(default = "default_server_args")]
    pub server_args: Vec<String>,

    /// Command that installs the server's dependencies
    #[serde(default = "default_install_command")]
    pub install_command: Vec<String>,

    /// Directory containing the server entry file; resolved relative to
    /// the launcher executable when unset
    #[serde(default)]
    pub app_root: Option<PathBuf>,

    /// How long to wait before checking that the server survived startup
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,

    /// How long to wait for a graceful shutdown before force-killing
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,

    /// Delay between startup confirmation and the browser opening
    #[serde(default = "default_browser_delay_ms")]
    pub browser_delay_ms: u64,

    /// How long to wait for the OS to release a reclaimed port
    #[serde(default = "default_reclaim_delay_ms")]
    pub reclaim_delay_ms: u64,

    /// Whether to open the player in a browser after startup
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,

    /// Browser command override; the URL is appended as the last argument
    #[serde(default)]
    pub browser_command: Option<Vec<String>>,
}

fn default_port() -> u16 {
    8888
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_runtime() -> String {
    "node".to_string()
}

fn default_server_args() -> Vec<String> {
    vec!["server.js".to_string()]
}

fn default_install_command() -> Vec<String> {
    vec!["npm".to_string(), "install".to_string()]
}

fn default_grace_period_ms() -> u64 {
    2000
}

fn default_shutdown_timeout_ms() -> u64 {
    5000
}

fn default_browser_delay_ms() -> u64 {
    1000
}

fn default_reclaim_delay_ms() -> u64 {
    1000
}

fn default_open_browser() -> bool {
    true
}

impl LaunchConfig {
    /// Reject values the launch sequence cannot work with
    pub fn validate(&self) -> Result<(), String> {
        // The host must look like a hostname or IP
        if self.host.is_empty() {
            return Err("Host cannot be empty".to_string());
        }

        if !self.host.chars().all(|c| c.is_alphanumeric() || c == '.' || c == '-') {
            return Err("Host contains invalid characters".to_string());
        }

        if self.port == 0 {
            return Err("Port must be nonzero".to_string());
        }

        // The host and port must combine into a well-formed URL
        if Url::parse(&self.url()).is_err() {
            return Err(format!("Invalid server URL: {}", self.url()));
        }

        // Validate the server command
        if self.runtime.is_empty() {
            return Err("Runtime cannot be empty".to_string());
        }

        if self.server_args.is_empty() {
            return Err("Server arguments cannot be empty".to_string());
        }

        if self.install_command.is_empty() {
            return Err("Install command cannot be empty".to_string());
        }

        // Validate timeouts
        if self.shutdown_timeout_ms == 0 {
            return Err("Shutdown timeout cannot be zero".to_string());
        }

        if let Some(command) = &self.browser_command {
            if command.is_empty() {
                return Err("Browser command cannot be empty".to_string());
            }
        }

        Ok(())
    }

    /// The URL the server will be reachable at
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Startup grace period as a [`Duration`]
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    /// Graceful shutdown window as a [`Duration`]
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Browser opening delay as a [`Duration`]
    pub fn browser_delay(&self) -> Duration {
        Duration::from_millis(self.browser_delay_ms)
    }

    /// Port reclamation settle delay as a [`Duration`]
    pub fn reclaim_delay(&self) -> Duration {
        Duration::from_millis(self.reclaim_delay_ms)
    }

    /// Resolve the directory the server runs from.
    ///
    /// An explicit `app_root` wins. Otherwise the server entry file is
    /// looked up next to the launcher executable, then one level up so
    /// the launcher can live in a `bin/` subdirectory of the app.
    pub fn resolve_app_root(&self) -> Result<PathBuf, LaunchError> {
        if let Some(root) = &self.app_root {
            return Ok(root.clone());
        }

        let exe = std::env::current_exe()?;
        let exe_dir = exe
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| ConfigError::Invalid {
                message: "Cannot determine the launcher's directory".to_string(),
            })?;

        if let Some(entry) = self.server_args.first() {
            if exe_dir.join(entry).exists() {
                return Ok(exe_dir);
            }
            if let Some(parent) = exe_dir.parent() {
                if parent.join(entry).exists() {
                    return Ok(parent.to_path_buf());
                }
            }
        }

        Ok(exe_dir)
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            runtime: default_runtime(),
            server_args: default_server_args(),
            install_command: default_install_command(),
            app_root: None,
            grace_period_ms: default_grace_period_ms(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            browser_delay_ms: default_browser_delay_ms(),
            reclaim_delay_ms: default_reclaim_delay_ms(),
            open_browser: default_open_browser(),
            browser_command: None,
        }
    }
}
