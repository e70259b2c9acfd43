//! Error types for the vaultup launcher
//!
//! Two layers: [`ConfigError`] covers everything that can go wrong with
//! the configuration file, [`LaunchError`] covers the launch itself.
//! The binary maps this taxonomy onto exit codes, so expected aborts
//! and real failures stay distinguishable.

use thiserror::Error;

/// Ways a launch can fail
#[derive(Error, Debug)]
pub enum LaunchError {
    /// The configured server runtime is not installed
    #[error("{runtime} runtime not found on PATH")]
    RuntimeMissing { runtime: String },

    /// The runtime exists but could not be probed
    #[error("failed to probe {runtime}: {reason}")]
    RuntimeCheckFailed { runtime: String, reason: String },

    /// The server port is occupied and could not be reclaimed
    #[error("port {port} is already in use and could not be cleared")]
    PortUnavailable { port: u16 },

    /// The server process could not be spawned
    #[error("failed to start the server: {reason}")]
    SpawnFailed { reason: String },

    /// The server process died before the startup grace period elapsed
    #[error("server exited during startup ({status})")]
    StartupFailed { status: String },

    /// The configuration file could not be used
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An OS-level operation failed for a reason the variants above
    /// do not cover
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Ways the configuration file can be unusable
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read the configuration file at {path}")]
    ReadFailed { path: String },

    #[error("could not write the configuration file at {path}")]
    WriteFailed { path: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },

    #[error("configuration I/O error: {message}")]
    Io { message: String },

    #[error("malformed TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("could not serialize the configuration: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Result alias used throughout the core
pub type Result<T> = std::result::Result<T, LaunchError>;
